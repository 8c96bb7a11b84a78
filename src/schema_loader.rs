//! Record-shape validation against the bundled JSON Schemas.
//!
//! Each source record is checked against the schema for its shape before it
//! is decoded, so a malformed record surfaces with every violation listed
//! instead of the first serde error. `decode_all` treats a bad record as a
//! structural anomaly that aborts the load; `decode_lenient` drops it and
//! keeps going.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

const ITEM_SCHEMA: &str = include_str!("../schema/item.schema.json");
const COLLECTION_SCHEMA: &str = include_str!("../schema/collection.schema.json");
const CRATE_SCHEMA: &str = include_str!("../schema/crate.schema.json");

/// Which bundled schema a record is checked against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordShape {
    Item,
    Collection,
    Crate,
}

impl RecordShape {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordShape::Item => "item",
            RecordShape::Collection => "collection",
            RecordShape::Crate => "crate",
        }
    }
}

/// Compiled validators for every record shape.
pub struct RecordSchemas {
    item: JSONSchema,
    collection: JSONSchema,
    krate: JSONSchema,
}

impl RecordSchemas {
    /// Parse and compile the bundled schemas.
    pub fn load() -> Result<Self> {
        Ok(Self {
            item: compile(RecordShape::Item, ITEM_SCHEMA)?,
            collection: compile(RecordShape::Collection, COLLECTION_SCHEMA)?,
            krate: compile(RecordShape::Crate, CRATE_SCHEMA)?,
        })
    }

    fn schema(&self, shape: RecordShape) -> &JSONSchema {
        match shape {
            RecordShape::Item => &self.item,
            RecordShape::Collection => &self.collection,
            RecordShape::Crate => &self.krate,
        }
    }

    /// Validate one record, listing every violation on failure.
    pub fn validate(&self, shape: RecordShape, record: &Value) -> Result<()> {
        if let Err(errors) = self.schema(shape).validate(record) {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{} record failed schema validation:\n{}", shape.as_str(), details);
        }
        Ok(())
    }

    /// Validate then decode every record of a document.
    ///
    /// `source` only labels errors (e.g. `stickers`); the first bad record
    /// aborts with its position in the document.
    pub fn decode_all<T>(&self, shape: RecordShape, source: &str, records: &[Value]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                self.validate(shape, record)
                    .and_then(|()| {
                        T::deserialize(record)
                            .with_context(|| format!("decoding {} record", shape.as_str()))
                    })
                    .with_context(|| format!("{source} record {idx} is malformed"))
            })
            .collect()
    }

    /// Validate then decode, skipping records that fail either step.
    ///
    /// Used for documents nothing else resolves against; each skipped record
    /// is logged with its source and position.
    pub fn decode_lenient<T>(&self, shape: RecordShape, source: &str, records: &[Value]) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                let decoded = self.validate(shape, record).and_then(|()| {
                    T::deserialize(record)
                        .with_context(|| format!("decoding {} record", shape.as_str()))
                });
                match decoded {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(
                            source,
                            record = idx,
                            error = %format!("{err:#}"),
                            "skipping malformed record"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

fn compile(shape: RecordShape, raw: &str) -> Result<JSONSchema> {
    let schema: Value = serde_json::from_str(raw)
        .with_context(|| format!("parsing bundled {} schema", shape.as_str()))?;
    JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling bundled {} schema: {err}", shape.as_str()))
}
