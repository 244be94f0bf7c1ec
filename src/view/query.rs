//! View query parameters

use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::str::FromStr;
use crate::view::ViewError;

/// Filter value meaning "no constraint".
pub const ALL: &str = "all";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
    #[default]
    None,
}

impl FromStr for SortOrder {
    type Err = ViewError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            "" | "none" => Ok(Self::None),
            other => Err(ViewError::InvalidParam { name: "order", value: other.to_string() }),
        }
    }
}

/// Search, filter, sort and page selection for one pass over a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewQuery {
    pub search: String,
    pub filters: BTreeMap<String, String>,
    pub sort_key: Option<String>,
    pub sort_order: SortOrder,
    pub page: usize,
    pub page_size: NonZeroUsize,
}

impl ViewQuery {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { search: String::new(), filters: BTreeMap::new(), sort_key: None, sort_order: SortOrder::None, page: 1, page_size }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self { self.search = term.into(); self }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort_key = Some(key.into());
        self.sort_order = order;
        self
    }

    pub fn page(mut self, page: usize) -> Self { self.page = page; self }

    /// Builds a query from flat request parameters. `search`, `sort`, `order`, `page`
    /// and `page_size` are reserved; every other parameter is a filter.
    pub fn from_params(mut params: BTreeMap<String, String>, default_page_size: NonZeroUsize) -> Result<Self, ViewError> {
        let mut query = Self::new(default_page_size);
        if let Some(search) = params.remove("search") { query.search = search; }
        if let Some(sort) = params.remove("sort") {
            let sort = sort.trim();
            if !sort.is_empty() && sort != "none" { query.sort_key = Some(sort.to_string()); }
        }
        if let Some(order) = params.remove("order") { query.sort_order = order.parse()?; }
        if let Some(page) = params.remove("page") { query.page = parse_number("page", &page)?; }
        if let Some(size) = params.remove("page_size") {
            query.page_size = NonZeroUsize::new(parse_number("page_size", &size)?)
                .ok_or(ViewError::InvalidParam { name: "page_size", value: size })?;
        }
        query.filters = params;
        Ok(query)
    }

    /// The search term lower-cased, or `None` when it is blank.
    pub fn folded_search(&self) -> Option<String> {
        let term = self.search.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    /// Filters that actually constrain the result.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .filter(|(_, v)| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
    }

    /// Sort key when both key and direction are set.
    pub fn ordering(&self) -> Option<(&str, SortOrder)> {
        match (&self.sort_key, self.sort_order) {
            (_, SortOrder::None) | (None, _) => None,
            (Some(key), order) if key != "none" => Some((key.as_str(), order)),
            _ => None,
        }
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<usize, ViewError> {
    value.trim().parse().map_err(|_| ViewError::InvalidParam { name, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

    #[test]
    fn test_from_params() {
        let params: BTreeMap<String, String> = [
            ("search", "áo"), ("sort", "price"), ("order", "desc"), ("page", "2"), ("status", "active"),
        ].into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let q = ViewQuery::from_params(params, size(10)).unwrap();
        assert_eq!(q.search, "áo");
        assert_eq!(q.ordering(), Some(("price", SortOrder::Desc)));
        assert_eq!(q.page, 2);
        assert_eq!(q.page_size, size(10));
        assert_eq!(q.filters.get("status").map(String::as_str), Some("active"));
    }

    #[test]
    fn test_bad_params_rejected() {
        let params = BTreeMap::from([("page_size".to_string(), "0".to_string())]);
        assert!(ViewQuery::from_params(params, size(10)).is_err());
        let params = BTreeMap::from([("order".to_string(), "sideways".to_string())]);
        assert!(ViewQuery::from_params(params, size(10)).is_err());
    }

    #[test]
    fn test_all_and_blank_are_inactive() {
        let q = ViewQuery::new(size(5)).filter("status", "all").filter("type", " ").filter("kind", "promo");
        assert_eq!(q.active_filters().collect::<Vec<_>>(), vec![("kind", "promo")]);
        assert_eq!(ViewQuery::new(size(5)).search("   ").folded_search(), None);
    }

    #[test]
    fn test_ordering_needs_key_and_direction() {
        assert_eq!(ViewQuery::new(size(5)).sort_by("name", SortOrder::None).ordering(), None);
        assert_eq!(ViewQuery::new(size(5)).sort_by("none", SortOrder::Asc).ordering(), None);
    }
}
