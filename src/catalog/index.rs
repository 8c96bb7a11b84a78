//! Identity index over the full item catalog.
//!
//! Every later resolution step looks items up here. Unlike a strict registry,
//! duplicate ids are not rejected: the last record carrying an id wins, which
//! matches how the source documents have always been consumed.

use crate::catalog::identity::ItemId;
use crate::catalog::model::Item;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
/// Mapping from item id to the shared item record.
pub struct ItemIndex {
    by_id: BTreeMap<ItemId, Arc<Item>>,
}

impl ItemIndex {
    /// Build the index from every item record, last write winning.
    pub fn build<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        let mut by_id = BTreeMap::new();
        for item in items {
            by_id.insert(item.id.clone(), Arc::new(item));
        }
        Self { by_id }
    }

    /// Resolve an item by id.
    ///
    /// Returns `None` for dangling references; composers drop those silently.
    pub fn get(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterates item ids in stable order.
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.by_id.keys()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
