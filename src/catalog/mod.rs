//! Item catalog model and composition.
//!
//! Raw documents decode into the record types in `model`; `ItemIndex` gives
//! id lookup over every item; `compose` resolves collection members and case
//! pools; `repository` holds the finished `Catalog` and publishes it.

pub mod compose;
pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use compose::{Case, Collection, Pool, compose_cases, compose_collections};
pub use identity::{CollectionRef, CrateKind, ItemId, ItemKind, ItemRef};
pub use index::ItemIndex;
pub use model::{CollectionRecord, CrateRecord, Descriptor, Item, Rarity};
pub use repository::{Catalog, CatalogStore, CatalogSummary, LooseCategory};
