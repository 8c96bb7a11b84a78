//! Browsing helpers layered on a composed catalog.
//!
//! Nothing here resolves references; these only narrow and order lists that
//! composition already produced. Items, collections and cases all browse the
//! same way through [`Named`].

use crate::catalog::{Case, Collection, Item};
use anyhow::{Result, bail};
use std::cmp::Ordering;

pub const NOT_FOUND_MESSAGE: &str = "requested collection or case could not be found";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    /// Keep the incoming order.
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortOrder::None),
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => bail!("unknown sort order '{other}' (expected asc|desc)"),
        }
    }
}

/// Anything listed and searched by its display name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Item {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Collection {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Case {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Keep entries whose name contains `query`, ignoring case.
///
/// A blank query keeps everything.
pub fn filter_by_name<'a, T, I>(entries: I, query: &str) -> Vec<&'a T>
where
    T: Named + ?Sized,
    I: IntoIterator<Item = &'a T>,
{
    let needle = query.trim().to_lowercase();
    entries
        .into_iter()
        .filter(|entry| needle.is_empty() || entry.name().to_lowercase().contains(&needle))
        .collect()
}

/// Order entries by name. `SortOrder::None` leaves them untouched.
pub fn sort_by_name<T: Named + ?Sized>(entries: &mut [&T], order: SortOrder) {
    let compare = |a: &&T, b: &&T| -> Ordering { a.name().cmp(b.name()) };
    match order {
        SortOrder::None => {}
        SortOrder::Ascending => entries.sort_by(compare),
        SortOrder::Descending => entries.sort_by(|a, b| compare(b, a)),
    }
}

/// Filter then sort, the order a browsing page applies them in.
pub fn browse<'a, T, I>(entries: I, query: &str, order: SortOrder) -> Vec<&'a T>
where
    T: Named + ?Sized,
    I: IntoIterator<Item = &'a T>,
{
    let mut selected = filter_by_name(entries, query);
    sort_by_name(&mut selected, order);
    selected
}

/// Result of looking up a collection or case by name.
#[derive(Debug, Eq, PartialEq)]
pub enum LookupOutcome<T> {
    Found(T),
    NotFound { name: String },
}

impl<T> LookupOutcome<T> {
    pub fn from_option(name: &str, found: Option<T>) -> Self {
        match found {
            Some(value) => LookupOutcome::Found(value),
            None => LookupOutcome::NotFound {
                name: name.to_string(),
            },
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}
