//! Deserializable representation of the source catalog documents.
//!
//! Every document is a JSON array of flat records. The types here mirror one
//! record each; cross-references between documents stay as plain ids/names
//! until the composer resolves them against an `ItemIndex`.

use crate::catalog::identity::{CollectionRef, CrateKind, ItemId, ItemKind, ItemRef};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemWire")]
/// One catalog item: a skin, knife, glove, agent, sticker, tool, ...
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ItemKind>,
    pub rarity: Option<Rarity>,
    pub category: Option<Descriptor>,
    pub weapon: Option<Descriptor>,
    pub description: Option<String>,
}

/// Item as written on the wire, where the kind may sit under `type`,
/// `kind`, or both. `type` wins when both are present.
#[derive(Deserialize)]
struct ItemWire {
    id: ItemId,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, rename = "type")]
    type_tag: Option<ItemKind>,
    #[serde(default, rename = "kind")]
    kind_tag: Option<ItemKind>,
    #[serde(default)]
    rarity: Option<Rarity>,
    #[serde(default)]
    category: Option<Descriptor>,
    #[serde(default)]
    weapon: Option<Descriptor>,
    #[serde(default)]
    description: Option<String>,
}

impl From<ItemWire> for Item {
    fn from(wire: ItemWire) -> Self {
        Item {
            id: wire.id,
            name: wire.name,
            image: wire.image,
            kind: wire.type_tag.or(wire.kind_tag),
            rarity: wire.rarity,
            category: wire.category,
            weapon: wire.weapon,
            description: wire.description,
        }
    }
}

impl Item {
    /// Only weapon skins enter a case pool through its collections.
    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, Some(ItemKind::Weapon))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Rarity tier plus the color the UI renders it with.
pub struct Rarity {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Named grouping such as a category ("Knives") or weapon family ("AK-47").
pub struct Descriptor {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// Collection as declared in `collections.json`, before resolution.
pub struct CollectionRecord {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub contains: Option<Vec<ItemRef>>,
}

impl CollectionRecord {
    /// Declared member references, or `None` when the record lists nothing.
    pub fn members(&self) -> Option<&[ItemRef]> {
        self.contains.as_deref().filter(|refs| !refs.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// Crate as declared in `crates.json`, before resolution.
pub struct CrateRecord {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<CrateKind>,
    #[serde(default)]
    pub collections: Option<Vec<CollectionRef>>,
    #[serde(default)]
    pub contains_rare: Option<Vec<ItemRef>>,
}

impl CrateRecord {
    /// Collections the crate draws from; absent or null reads as none.
    pub fn collection_refs(&self) -> &[CollectionRef] {
        self.collections.as_deref().unwrap_or_default()
    }

    /// Items declared directly on the crate; absent or null reads as none.
    pub fn rare_refs(&self) -> &[ItemRef] {
        self.contains_rare.as_deref().unwrap_or_default()
    }

    pub fn is_case(&self) -> bool {
        matches!(self.kind, Some(CrateKind::Case))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_parses_full_record() {
        let item: Item = serde_json::from_value(json!({
            "id": "skin-1",
            "name": "AK-47 | Redline",
            "image": "https://img/redline.png",
            "type": "Weapon",
            "rarity": {"id": "rarity_legendary", "name": "Classified", "color": "#d32ce6"},
            "category": {"id": "csgo_inventory_weapon_category_rifles", "name": "Rifles"},
            "weapon": {"id": "weapon_ak47", "name": "AK-47"},
            "description": null
        }))
        .unwrap();
        assert_eq!(item.id, ItemId::from("skin-1"));
        assert!(item.is_weapon());
        assert_eq!(item.rarity.as_ref().map(|r| r.name.as_str()), Some("Classified"));
        assert_eq!(item.weapon.as_ref().map(|w| w.name.as_str()), Some("AK-47"));
        assert!(item.description.is_none());
    }

    #[test]
    fn item_accepts_kind_alias_and_minimal_shape() {
        let item: Item = serde_json::from_value(json!({
            "id": 2,
            "name": "Karambit | Doppler",
            "kind": "Knife"
        }))
        .unwrap();
        assert_eq!(item.kind, Some(ItemKind::Knife));
        assert!(!item.is_weapon());
        assert!(item.image.is_none());
    }

    #[test]
    fn collection_members_treat_empty_as_absent() {
        let empty: CollectionRecord =
            serde_json::from_value(json!({"name": "Empty", "contains": []})).unwrap();
        assert!(empty.members().is_none());

        let missing: CollectionRecord = serde_json::from_value(json!({"name": "Bare"})).unwrap();
        assert!(missing.members().is_none());

        let full: CollectionRecord =
            serde_json::from_value(json!({"name": "Full", "contains": [1, {"id": 2}]})).unwrap();
        assert_eq!(full.members().map(<[ItemRef]>::len), Some(2));
    }

    #[test]
    fn crate_defaults_reference_lists() {
        let record: CrateRecord =
            serde_json::from_value(json!({"name": "Sticker Capsule", "type": "Sticker Capsule"}))
                .unwrap();
        assert!(!record.is_case());
        assert!(record.collection_refs().is_empty());
        assert!(record.rare_refs().is_empty());
    }

    #[test]
    fn crate_null_reference_lists_read_as_empty() {
        let record: CrateRecord = serde_json::from_value(json!({
            "name": "Operation Hydra Case",
            "type": "Case",
            "collections": null,
            "contains_rare": null
        }))
        .unwrap();
        assert!(record.is_case());
        assert!(record.collection_refs().is_empty());
        assert!(record.rare_refs().is_empty());
    }

    #[test]
    fn item_with_both_type_and_kind_prefers_type() {
        let item: Item = serde_json::from_value(json!({
            "id": 1,
            "name": "AK-47 | Redline",
            "type": "Weapon",
            "kind": "Knife"
        }))
        .unwrap();
        assert_eq!(item.kind, Some(ItemKind::Weapon));

        let same: Item = serde_json::from_value(json!({
            "id": 1,
            "name": "AK-47 | Redline",
            "type": "Weapon",
            "kind": "Weapon"
        }))
        .unwrap();
        assert!(same.is_weapon());
    }
}
