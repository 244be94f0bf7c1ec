//! Collection views for admin screens
//!
//! A [`CollectionView`] turns a resident collection and a [`ViewQuery`] into the visible
//! [`Page`]. The pipeline is search, filter, sort, paginate, each stage working on the
//! output of the previous one. Every pass is recomputed from scratch and never mutates
//! the records.

pub mod field;
pub mod page;
pub mod query;

pub use field::{FieldValue, Record};
pub use page::{clamp_page, total_pages, Page};
pub use query::{SortOrder, ViewQuery, ALL};

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Named condition over a record, evaluated at an instant.
pub type Predicate<R> = fn(&R, DateTime<Utc>) -> bool;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("unknown filter `{0}`")]
    UnknownFilter(String),
    #[error("filter `{filter}` has no option `{value}`")]
    UnknownFilterValue { filter: String, value: String },
    #[error("cannot sort by `{0}`")]
    UnknownSortKey(String),
    #[error("invalid value `{value}` for `{name}`")]
    InvalidParam { name: &'static str, value: String },
}

enum FilterRule<R> {
    /// Field text equals the selected value, ignoring case.
    Equals(&'static str),
    /// The selected value names one of these predicates.
    Named(Vec<(&'static str, Predicate<R>)>),
}

struct FilterDef<R> {
    name: &'static str,
    rule: FilterRule<R>,
}

/// Declarative description of one screen's columns.
pub struct FieldMap<R> {
    searchable: Vec<&'static str>,
    filters: Vec<FilterDef<R>>,
    sortable: Vec<&'static str>,
    stats: Vec<(&'static str, Predicate<R>)>,
}

impl<R> Default for FieldMap<R> {
    fn default() -> Self { Self { searchable: vec![], filters: vec![], sortable: vec![], stats: vec![] } }
}

impl<R> std::fmt::Debug for FieldMap<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMap")
            .field("searchable", &self.searchable)
            .field("filters", &self.filters.iter().map(|s| s.name).collect::<Vec<_>>())
            .field("sortable", &self.sortable)
            .field("stats", &self.stats.iter().map(|(n, _)| *n).collect::<Vec<_>>())
            .finish()
    }
}

impl<R: Record> FieldMap<R> {
    pub fn new() -> Self { Self::default() }

    pub fn search(mut self, fields: impl IntoIterator<Item = &'static str>) -> Self {
        self.searchable.extend(fields);
        self
    }

    /// Filter `name` keeps records whose `field` equals the selected value.
    pub fn filter_eq(mut self, name: &'static str, field: &'static str) -> Self {
        self.filters.push(FilterDef { name, rule: FilterRule::Equals(field) });
        self
    }

    /// Filter `name` selects one of the given predicates by option name.
    pub fn filter_named(mut self, name: &'static str, options: impl IntoIterator<Item = (&'static str, Predicate<R>)>) -> Self {
        self.filters.push(FilterDef { name, rule: FilterRule::Named(options.into_iter().collect()) });
        self
    }

    pub fn sort(mut self, fields: impl IntoIterator<Item = &'static str>) -> Self {
        self.sortable.extend(fields);
        self
    }

    pub fn stat(mut self, name: &'static str, predicate: Predicate<R>) -> Self {
        self.stats.push((name, predicate));
        self
    }
}

#[derive(Debug)]
pub struct CollectionView<R> {
    fields: FieldMap<R>,
}

impl<R: Record> CollectionView<R> {
    pub fn new(fields: FieldMap<R>) -> Self { Self { fields } }

    /// Runs the full pipeline and returns the requested page.
    ///
    /// `query.page` must be at least 1; a page past the end yields no items, and the
    /// caller resets it with [`clamp_page`].
    pub fn apply<'r>(&self, records: &'r [R], query: &ViewQuery, now: DateTime<Utc>) -> Result<Page<&'r R>, ViewError> {
        debug_assert!(query.page >= 1, "page numbers start at 1");
        let mut rows = self.filtered(records, query, now)?;
        let stats = self.stats(&rows, now);
        self.sort(&mut rows, query)?;

        let page_size = query.page_size.get();
        let total_items = rows.len();
        let total_pages = total_pages(total_items, page_size);
        let page = query.page.max(1);
        let items = rows.into_iter().skip((page - 1).saturating_mul(page_size)).take(page_size).collect();

        Ok(Page { items, page, page_size, total_items, total_pages, pages: page::page_strip(total_pages, page), stats })
    }

    /// Search and filter stages only, in collection order.
    pub fn filtered<'r>(&self, records: &'r [R], query: &ViewQuery, now: DateTime<Utc>) -> Result<Vec<&'r R>, ViewError> {
        let mut checks = Vec::new();
        for (name, value) in query.active_filters() {
            let def = self.fields.filters.iter().find(|f| f.name == name)
                .ok_or_else(|| ViewError::UnknownFilter(name.to_string()))?;
            checks.push(Check::new(def, value)?);
        }

        let needle = query.folded_search();
        Ok(records.iter()
            .filter(|r| needle.as_deref().map_or(true, |n| self.matches_search(*r, n)))
            .filter(|r| checks.iter().all(|c| c.keeps(*r, now)))
            .collect())
    }

    /// Counts for each configured stat over already filtered rows.
    pub fn stats(&self, rows: &[&R], now: DateTime<Utc>) -> BTreeMap<String, usize> {
        self.fields.stats.iter()
            .map(|(name, pred)| (name.to_string(), rows.iter().filter(|r| pred(**r, now)).count()))
            .collect()
    }

    fn matches_search(&self, record: &R, needle: &str) -> bool {
        self.fields.searchable.iter()
            .filter_map(|f| record.field(f))
            .any(|v| v.contains_folded(needle))
    }

    fn sort(&self, rows: &mut [&R], query: &ViewQuery) -> Result<(), ViewError> {
        let Some((key, order)) = query.ordering() else { return Ok(()) };
        if !self.fields.sortable.iter().any(|s| *s == key) { return Err(ViewError::UnknownSortKey(key.to_string())); }
        // sort_by is stable, so ties keep their filtered order.
        rows.sort_by(|a, b| {
            let ord = field::compare_optional(a.field(key).as_ref(), b.field(key).as_ref());
            if order == SortOrder::Desc { ord.reverse() } else { ord }
        });
        Ok(())
    }
}

enum Check<'q, R> {
    Equals { field: &'static str, value: &'q str },
    Predicate(Predicate<R>),
}

impl<'q, R: Record> Check<'q, R> {
    fn new(def: &FilterDef<R>, value: &'q str) -> Result<Self, ViewError> {
        match &def.rule {
            FilterRule::Equals(field) => Ok(Check::Equals { field: *field, value }),
            FilterRule::Named(options) => options.iter()
                .find(|(option, _)| option.eq_ignore_ascii_case(value))
                .map(|(_, pred)| Check::Predicate(*pred))
                .ok_or_else(|| ViewError::UnknownFilterValue { filter: def.name.to_string(), value: value.to_string() }),
        }
    }

    fn keeps(&self, record: &R, now: DateTime<Utc>) -> bool {
        match self {
            Check::Equals { field, value } => record.field(field)
                .is_some_and(|v| v.as_text().to_lowercase() == value.to_lowercase()),
            Check::Predicate(pred) => pred(record, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::num::NonZeroUsize;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq)]
    struct Item { id: u128, name: &'static str, kind: &'static str, v: i64 }

    impl Record for Item {
        fn id(&self) -> Uuid { Uuid::from_u128(self.id) }
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::text(self.name)),
                "kind" => Some(FieldValue::text(self.kind)),
                "v" => Some(FieldValue::Number(Decimal::from(self.v))),
                _ => None,
            }
        }
    }

    fn big(i: &Item, _: DateTime<Utc>) -> bool { i.v >= 5 }
    fn small(i: &Item, _: DateTime<Utc>) -> bool { i.v < 5 }

    fn view() -> CollectionView<Item> {
        CollectionView::new(
            FieldMap::new()
                .search(["name"])
                .filter_eq("kind", "kind")
                .filter_named("size", [("big", big as Predicate<Item>), ("small", small)])
                .sort(["v", "name"])
                .stat("big", big),
        )
    }

    fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() }
    fn size(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }
    fn item(id: u128, name: &'static str, kind: &'static str, v: i64) -> Item { Item { id, name, kind, v } }
    fn ids(page: &Page<&Item>) -> Vec<u128> { page.items.iter().map(|i| i.id).collect() }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![item(1, "a", "x", 5), item(2, "b", "x", 5), item(3, "c", "x", 3)];
        let q = ViewQuery::new(size(10)).sort_by("v", SortOrder::Asc);
        assert_eq!(ids(&view().apply(&records, &q, now()).unwrap()), vec![3, 1, 2]);
        let q = ViewQuery::new(size(10)).sort_by("v", SortOrder::Desc);
        assert_eq!(ids(&view().apply(&records, &q, now()).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn test_pagination() {
        let records: Vec<Item> = (0..25).map(|i| item(i, "n", "x", i as i64)).collect();
        let page = view().apply(&records, &ViewQuery::new(size(10)).page(3), now()).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);
        assert_eq!(ids(&page), (20..25).collect::<Vec<_>>());
        let past_end = view().apply(&records, &ViewQuery::new(size(10)).page(4), now()).unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(clamp_page(4, past_end.total_pages), 1);
        let far = view().apply(&records, &ViewQuery::new(size(10)).page(usize::MAX), now()).unwrap();
        assert!(far.items.is_empty());
        assert_eq!(far.total_pages, 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = vec![item(1, "Áo Dài", "x", 1), item(2, "Vest", "x", 1)];
        let page = view().apply(&records, &ViewQuery::new(size(10)).search("áo"), now()).unwrap();
        assert_eq!(ids(&page), vec![1]);
    }

    #[test]
    fn test_filters_compose_with_and() {
        let records = vec![item(1, "a", "x", 9), item(2, "b", "y", 9), item(3, "c", "x", 1)];
        let q = ViewQuery::new(size(10)).filter("kind", "X").filter("size", "big");
        assert_eq!(ids(&view().apply(&records, &q, now()).unwrap()), vec![1]);
        let q = ViewQuery::new(size(10)).filter("kind", "all").filter("size", "");
        assert_eq!(view().apply(&records, &q, now()).unwrap().total_items, 3);
    }

    #[test]
    fn test_stats_ignore_pagination() {
        let records: Vec<Item> = (0..12).map(|i| item(i, "n", if i % 2 == 0 { "x" } else { "y" }, i as i64)).collect();
        let page = view().apply(&records, &ViewQuery::new(size(2)).filter("kind", "x"), now()).unwrap();
        assert_eq!(page.items.len(), 2);
        // x items are 0,2,4,6,8,10; the big ones are 6,8,10
        assert_eq!(page.stats.get("big"), Some(&3));
    }

    #[test]
    fn test_idempotent() {
        let records = vec![item(1, "b", "x", 2), item(2, "a", "y", 2), item(3, "c", "x", 1)];
        let q = ViewQuery::new(size(2)).sort_by("name", SortOrder::Desc).search("");
        let first = serde_json::to_string(&view().apply(&records, &q, now()).unwrap().map(|i| i.name)).unwrap();
        let second = serde_json::to_string(&view().apply(&records, &q, now()).unwrap().map(|i| i.name)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_names_rejected() {
        let records = vec![item(1, "a", "x", 1)];
        let v = view();
        assert_eq!(v.apply(&records, &ViewQuery::new(size(1)).filter("colour", "red"), now()), Err(ViewError::UnknownFilter("colour".into())));
        assert!(matches!(v.apply(&records, &ViewQuery::new(size(1)).filter("size", "huge"), now()), Err(ViewError::UnknownFilterValue { .. })));
        assert_eq!(v.apply(&records, &ViewQuery::new(size(1)).sort_by("kind", SortOrder::Asc), now()), Err(ViewError::UnknownSortKey("kind".into())));
    }
}
