use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque identifier of a catalog item (e.g. `skin-e1b2c3`).
///
/// Source documents are inconsistent about whether ids are strings or bare
/// integers; both forms normalize to the same string so `1` and `"1"` name the
/// same entity.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => ItemId(text),
            RawId::Number(number) => ItemId(number.to_string()),
        })
    }
}

/// Broad item kind used to decide what a case can drop.
///
/// Known variants drive composition; `Other` keeps whatever the source
/// declared so loose categories round-trip unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ItemKind {
    Weapon,
    Knife,
    Glove,
    Other(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Knife => "Knife",
            ItemKind::Glove => "Gloves",
            ItemKind::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "Weapon" => ItemKind::Weapon,
            "Knife" => ItemKind::Knife,
            "Gloves" | "Glove" => ItemKind::Glove,
            other => ItemKind::Other(other.to_string()),
        }
    }
}

impl Serialize for ItemKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

/// Crate type tag. Only `Case` crates are composed into pools.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CrateKind {
    Case,
    Other(String),
}

impl CrateKind {
    pub fn as_str(&self) -> &str {
        match self {
            CrateKind::Case => "Case",
            CrateKind::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "Case" => CrateKind::Case,
            other => CrateKind::Other(other.to_string()),
        }
    }
}

impl Serialize for CrateKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CrateKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

/// Reference to an item, either a bare id or an object carrying `id`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemRef(pub ItemId);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemRef {
    Bare(ItemId),
    Object { id: ItemId },
}

impl<'de> Deserialize<'de> for ItemRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawItemRef::deserialize(deserializer)? {
            RawItemRef::Bare(id) | RawItemRef::Object { id } => ItemRef(id),
        })
    }
}

/// Reference from a crate to a collection, resolved by collection name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CollectionRef(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCollectionRef {
    Bare(String),
    Object { name: String },
}

impl<'de> Deserialize<'de> for CollectionRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawCollectionRef::deserialize(deserializer)? {
            RawCollectionRef::Bare(name) | RawCollectionRef::Object { name } => {
                CollectionRef(name)
            }
        })
    }
}
