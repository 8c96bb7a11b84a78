//! Resolves collection members and case pools through the identity index.
//!
//! Composition is pure: it reads decoded records plus an `ItemIndex` and
//! returns fresh maps. Dangling references are dropped, never reported as
//! errors.

use crate::catalog::identity::ItemId;
use crate::catalog::index::ItemIndex;
use crate::catalog::model::{CollectionRecord, CrateRecord, Item};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug, Serialize)]
/// Collection with its members resolved, in declaration order.
pub struct Collection {
    pub name: String,
    pub image: Option<String>,
    pub items: Vec<Arc<Item>>,
}

#[derive(Clone, Debug, Serialize)]
/// Case crate with the pool of items it can drop.
pub struct Case {
    pub name: String,
    pub image: Option<String>,
    pub pool: Pool,
}

#[derive(Clone, Debug, Default)]
/// Items unique by id. Reinserting an id already present is a no-op.
pub struct Pool {
    by_id: BTreeMap<ItemId, Arc<Item>>,
}

impl Pool {
    /// Insert an item; returns false when its id was already pooled.
    pub fn insert(&mut self, item: Arc<Item>) -> bool {
        if self.by_id.contains_key(&item.id) {
            return false;
        }
        self.by_id.insert(item.id.clone(), item);
        true
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.by_id.values()
    }

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

impl Serialize for Pool {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.by_id.values())
    }
}

/// Resolve every collection that declares members, keyed by name.
///
/// Records without members are skipped entirely. A later record with the same
/// name replaces an earlier one.
pub fn compose_collections(
    records: &[CollectionRecord],
    index: &ItemIndex,
) -> BTreeMap<String, Collection> {
    let mut collections = BTreeMap::new();
    for record in records {
        let Some(members) = record.members() else {
            continue;
        };
        let items: Vec<Arc<Item>> = members
            .iter()
            .filter_map(|reference| index.get(&reference.0).cloned())
            .collect();
        if items.len() < members.len() {
            debug!(
                collection = %record.name,
                dropped = members.len() - items.len(),
                "dropped dangling member references"
            );
        }
        collections.insert(
            record.name.clone(),
            Collection {
                name: record.name.clone(),
                image: record.image.clone(),
                items,
            },
        );
    }
    collections
}

/// Build the drop pool for every `Case` crate, keyed by crate name.
///
/// Weapons come in through referenced collections; knives and gloves only
/// through the crate's own rare list. Non-case crates are left out.
pub fn compose_cases(
    records: &[CrateRecord],
    collections: &BTreeMap<String, Collection>,
    index: &ItemIndex,
) -> BTreeMap<String, Case> {
    let mut cases = BTreeMap::new();
    for record in records.iter().filter(|record| record.is_case()) {
        let mut pool = Pool::default();

        for reference in record.collection_refs() {
            let Some(collection) = collections.get(&reference.0) else {
                debug!(case = %record.name, collection = %reference.0, "unknown collection reference");
                continue;
            };
            for item in collection.items.iter().filter(|item| item.is_weapon()) {
                pool.insert(Arc::clone(item));
            }
        }

        for reference in record.rare_refs() {
            if let Some(item) = index.get(&reference.0) {
                pool.insert(Arc::clone(item));
            }
        }

        cases.insert(
            record.name.clone(),
            Case {
                name: record.name.clone(),
                image: record.image.clone(),
                pool,
            },
        );
    }
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn items(values: Value) -> ItemIndex {
        let items: Vec<Item> = serde_json::from_value(values).unwrap();
        ItemIndex::build(items)
    }

    fn collections(values: Value) -> Vec<CollectionRecord> {
        serde_json::from_value(values).unwrap()
    }

    fn crates(values: Value) -> Vec<CrateRecord> {
        serde_json::from_value(values).unwrap()
    }

    fn breakout_index() -> ItemIndex {
        items(json!([
            {"id": 1, "name": "AK-47 | Redline", "kind": "Weapon"},
            {"id": 2, "name": "Karambit | Doppler", "kind": "Knife"}
        ]))
    }

    #[test]
    fn collection_keeps_declaration_order_and_drops_dangling() {
        let index = breakout_index();
        let composed = compose_collections(
            &collections(json!([{"name": "Mixed", "contains": [2, "ghost", 1]}])),
            &index,
        );
        let names: Vec<&str> = composed["Mixed"].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Karambit | Doppler", "AK-47 | Redline"]);
    }

    #[test]
    fn one_valid_and_one_unknown_member_resolves_to_one_item() {
        let index = breakout_index();
        let composed =
            compose_collections(&collections(json!([{"name": "C", "contains": [1, 99]}])), &index);
        assert_eq!(composed["C"].items.len(), 1);
    }

    #[test]
    fn collections_without_members_are_omitted() {
        let index = breakout_index();
        let composed = compose_collections(
            &collections(json!([
                {"name": "No Members"},
                {"name": "Empty Members", "contains": []},
                {"name": "All Dangling", "contains": ["ghost"]}
            ])),
            &index,
        );
        assert!(!composed.contains_key("No Members"));
        assert!(!composed.contains_key("Empty Members"));
        assert!(composed["All Dangling"].items.is_empty());
    }

    #[test]
    fn duplicate_collection_name_last_write_wins() {
        let index = breakout_index();
        let composed = compose_collections(
            &collections(json!([
                {"name": "Dup", "contains": [1]},
                {"name": "Dup", "contains": [2]}
            ])),
            &index,
        );
        assert_eq!(composed.len(), 1);
        assert_eq!(composed["Dup"].items[0].id, ItemId::from("2"));
    }

    #[test]
    fn breakout_case_pools_weapon_and_rare_knife_once() {
        let index = breakout_index();
        let composed_collections = compose_collections(
            &collections(json!([{"name": "The Breakout Collection", "contains": [1, 2]}])),
            &index,
        );
        assert_eq!(composed_collections["The Breakout Collection"].items.len(), 2);

        let cases = compose_cases(
            &crates(json!([{
                "name": "Operation Breakout Case",
                "type": "Case",
                "collections": ["The Breakout Collection"],
                "contains_rare": [2]
            }])),
            &composed_collections,
            &index,
        );
        let pool = &cases["Operation Breakout Case"].pool;
        let ids: Vec<&str> = pool.ids().map(ItemId::as_str).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn knife_only_enters_through_rare_list() {
        let index = breakout_index();
        let composed_collections = compose_collections(
            &collections(json!([{"name": "Mixed", "contains": [1, 2]}])),
            &index,
        );
        let cases = compose_cases(
            &crates(json!([{"name": "Plain Case", "type": "Case", "collections": ["Mixed"]}])),
            &composed_collections,
            &index,
        );
        let pool = &cases["Plain Case"].pool;
        assert!(pool.contains(&ItemId::from("1")));
        assert!(!pool.contains(&ItemId::from("2")));
    }

    #[test]
    fn weapon_reachable_twice_is_pooled_once() {
        let index = breakout_index();
        let composed_collections = compose_collections(
            &collections(json!([
                {"name": "A", "contains": [1]},
                {"name": "B", "contains": [1]}
            ])),
            &index,
        );
        let cases = compose_cases(
            &crates(json!([{
                "name": "Overlap Case",
                "type": "Case",
                "collections": ["A", {"name": "B"}],
                "contains_rare": [1]
            }])),
            &composed_collections,
            &index,
        );
        assert_eq!(cases["Overlap Case"].pool.len(), 1);
    }

    #[test]
    fn non_case_crates_are_absent_and_empty_cases_are_kept() {
        let index = breakout_index();
        let cases = compose_cases(
            &crates(json!([
                {"name": "Sticker Capsule", "type": "Sticker Capsule", "contains_rare": [1]},
                {"name": "Untyped", "contains_rare": [1]},
                {"name": "Empty Case", "type": "Case"},
                {"name": "Dangling Case", "type": "Case", "collections": ["Nowhere"], "contains_rare": ["ghost"]}
            ])),
            &BTreeMap::new(),
            &index,
        );
        assert!(!cases.contains_key("Sticker Capsule"));
        assert!(!cases.contains_key("Untyped"));
        assert!(cases["Empty Case"].pool.is_empty());
        assert!(cases["Dangling Case"].pool.is_empty());
    }

    #[test]
    fn pool_insert_is_idempotent_by_id() {
        let index = breakout_index();
        let item = index.get(&ItemId::from("1")).cloned().unwrap();
        let mut pool = Pool::default();
        assert!(pool.insert(Arc::clone(&item)));
        assert!(!pool.insert(item));
        assert_eq!(pool.len(), 1);

        let serialized = serde_json::to_value(&pool).unwrap();
        assert_eq!(serialized.as_array().map(Vec::len), Some(1));
    }
}
