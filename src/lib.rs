//! Catalog composer for skin/crate/collection data.
//!
//! The crate fetches a set of flat, independently published item catalogs and
//! cross-references them into a browsable model: collections resolved to
//! their member items, and cases resolved to the pool of items they can drop.
//! Public functions here form the load contract the binary and any other
//! consumer depend on: a concurrent fetch that never fails per source,
//! followed by a pure composition pass that either yields a complete
//! `Catalog` or fails as a whole.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub mod catalog;
pub mod schema_loader;
pub mod sources;
pub mod view;

pub use catalog::{
    Case, Catalog, CatalogStore, CatalogSummary, Collection, CollectionRecord, CrateRecord, Item,
    ItemId, ItemIndex, ItemKind, LooseCategory, Pool,
};
pub use schema_loader::{RecordSchemas, RecordShape};
pub use sources::{
    Fetched, FetchedSources, Fetcher, SourceKind, SourceLocation, SourceSet, SourceStatus,
};
pub use view::{LookupOutcome, SortOrder};

/// Fetch every source and compose a fresh catalog.
///
/// Unreachable or malformed documents only shrink the result. A base item,
/// collection or crate record that breaks its schema fails the whole load;
/// a bad loose-category record is skipped.
pub async fn load_catalog(sources: &SourceSet) -> Result<Catalog> {
    let fetcher = Fetcher::new(sources.timeout())?;
    let fetched = fetcher.fetch_all(sources).await;
    let degraded = fetched.fallbacks().count();
    if degraded > 0 {
        info!(degraded, "some sources fell back to empty lists");
    }
    compose_catalog(&fetched)
}

/// Compose a catalog from already-settled documents.
///
/// Runs the whole pipeline synchronously: decode, index, collections, cases.
/// Base items, collections and crates are decoded strictly; loose categories
/// are passed through and only drop their own malformed records.
pub fn compose_catalog(fetched: &FetchedSources) -> Result<Catalog> {
    let schemas = RecordSchemas::load()?;

    let items: Vec<Item> = decode(&schemas, fetched, SourceKind::BaseItems, RecordShape::Item)?;
    let index = ItemIndex::build(items);

    let collection_records: Vec<CollectionRecord> =
        decode(&schemas, fetched, SourceKind::Collections, RecordShape::Collection)?;
    let collections = catalog::compose_collections(&collection_records, &index);

    let crate_records: Vec<CrateRecord> =
        decode(&schemas, fetched, SourceKind::Crates, RecordShape::Crate)?;
    let cases = catalog::compose_cases(&crate_records, &collections, &index);

    let mut loose = BTreeMap::new();
    for kind in SourceKind::ALL {
        let Some(category) = kind.loose_category() else {
            continue;
        };
        let items: Vec<Item> =
            schemas.decode_lenient(RecordShape::Item, kind.as_str(), fetched.records(kind));
        loose.insert(category, items);
    }

    debug!(
        items = index.len(),
        collections = collections.len(),
        cases = cases.len(),
        "catalog composed"
    );
    Ok(Catalog::new(index, collections, cases, loose))
}

fn decode<T>(
    schemas: &RecordSchemas,
    fetched: &FetchedSources,
    kind: SourceKind,
    shape: RecordShape,
) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    schemas
        .decode_all(shape, kind.as_str(), fetched.records(kind))
        .with_context(|| format!("composing {} catalog", kind.as_str()))
}
