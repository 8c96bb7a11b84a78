//! The composed catalog and the store that publishes it.
//!
//! A `Catalog` is assembled once per load and never patched afterwards.
//! `CatalogStore` keeps the most recent successful load and swaps it out
//! wholesale, so readers only ever see a complete snapshot.

use crate::catalog::compose::{Case, Collection};
use crate::catalog::identity::ItemId;
use crate::catalog::index::ItemIndex;
use crate::catalog::model::Item;
use crate::sources::SourceSet;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Item lists passed through without cross-referencing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LooseCategory {
    Agents,
    Stickers,
    Graffiti,
    Patches,
    MusicKits,
    Tools,
    Keychains,
}

impl LooseCategory {
    pub const ALL: [LooseCategory; 7] = [
        LooseCategory::Agents,
        LooseCategory::Stickers,
        LooseCategory::Graffiti,
        LooseCategory::Patches,
        LooseCategory::MusicKits,
        LooseCategory::Tools,
        LooseCategory::Keychains,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LooseCategory::Agents => "agents",
            LooseCategory::Stickers => "stickers",
            LooseCategory::Graffiti => "graffiti",
            LooseCategory::Patches => "patches",
            LooseCategory::MusicKits => "music_kits",
            LooseCategory::Tools => "tools",
            LooseCategory::Keychains => "keychains",
        }
    }

    /// Accepts the snake_case name, with `-` or spaces in place of `_`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }
}

impl fmt::Display for LooseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully composed, read-only catalog of one load.
#[derive(Debug, Default)]
pub struct Catalog {
    index: ItemIndex,
    collections: BTreeMap<String, Collection>,
    cases: BTreeMap<String, Case>,
    loose: BTreeMap<LooseCategory, Vec<Item>>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
/// Entity counts, used for load logging and the CLI summary.
pub struct CatalogSummary {
    pub items: usize,
    pub collections: usize,
    pub cases: usize,
    pub loose_items: usize,
}

impl Catalog {
    pub fn new(
        index: ItemIndex,
        collections: BTreeMap<String, Collection>,
        cases: BTreeMap<String, Case>,
        loose: BTreeMap<LooseCategory, Vec<Item>>,
    ) -> Self {
        Self {
            index,
            collections,
            cases,
            loose,
        }
    }

    /// Fetch one collection by name; `None` is the "not found" answer.
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Fetch one case by name; `None` is the "not found" answer.
    pub fn case(&self, name: &str) -> Option<&Case> {
        self.cases.get(name)
    }

    /// Collections in name order.
    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    /// Cases in name order.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.cases.values()
    }

    /// Items of one loose category in source order.
    pub fn category(&self, category: LooseCategory) -> &[Item] {
        self.loose
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = (LooseCategory, &[Item])> {
        LooseCategory::ALL
            .into_iter()
            .map(|category| (category, self.category(category)))
    }

    pub fn item(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.index.get(id)
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            items: self.index.len(),
            collections: self.collections.len(),
            cases: self.cases.len(),
            loose_items: self.loose.values().map(Vec::len).sum(),
        }
    }
}

/// Holds the most recently published catalog.
#[derive(Default)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published catalog wholesale.
    pub fn publish(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(Arc::clone(&catalog));
        catalog
    }

    /// Current snapshot, or `None` before the first successful load.
    pub fn snapshot(&self) -> Option<Arc<Catalog>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Run a full load and publish it.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// returned to the caller.
    pub async fn reload(&self, sources: &SourceSet) -> Result<Arc<Catalog>> {
        let catalog = crate::load_catalog(sources).await?;
        let summary = catalog.summary();
        info!(
            items = summary.items,
            collections = summary.collections,
            cases = summary.cases,
            loose_items = summary.loose_items,
            "catalog published"
        );
        Ok(self.publish(catalog))
    }
}
