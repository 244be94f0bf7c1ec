//! Field access for listed records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use uuid::Uuid;

/// A record that can be listed on an admin screen.
///
/// Implementors expose their columns by name; the view never touches the record
/// otherwise.
pub trait Record {
    fn id(&self) -> Uuid;
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A single column value, typed by how it should be searched and ordered.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(Decimal),
    Date(DateTime<Utc>),
    Flag(bool),
}

impl<'a> FieldValue<'a> {
    pub fn text(s: &'a str) -> Self { FieldValue::Text(Cow::Borrowed(s)) }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Flag(_) => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Date(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }

    /// Textual form used by search and equality filters.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Number(n) => Cow::Owned(n.normalize().to_string()),
            FieldValue::Date(d) => Cow::Owned(d.to_rfc3339()),
            FieldValue::Flag(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }

    /// Case-insensitive substring test; `needle` must already be lower-cased.
    pub fn contains_folded(&self, needle: &str) -> bool {
        self.as_text().to_lowercase().contains(needle)
    }

    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => collation_key(a).cmp(&collation_key(b))
                .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
                .then_with(|| a.cmp(b)),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl From<Decimal> for FieldValue<'_> {
    fn from(n: Decimal) -> Self { FieldValue::Number(n) }
}

impl From<u32> for FieldValue<'_> {
    fn from(n: u32) -> Self { FieldValue::Number(Decimal::from(n)) }
}

impl From<DateTime<Utc>> for FieldValue<'_> {
    fn from(d: DateTime<Utc>) -> Self { FieldValue::Date(d) }
}

impl From<bool> for FieldValue<'_> {
    fn from(b: bool) -> Self { FieldValue::Flag(b) }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self { FieldValue::text(s) }
}

/// Primary sort key for text: decomposed, stripped of diacritics, lower-cased.
/// `đ` has no decomposition and folds to `d` explicitly.
pub fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'đ' { 'd' } else { c })
        .collect()
}

/// Orders optional values with missing ones first.
pub fn compare_optional(a: Option<&FieldValue<'_>>, b: Option<&FieldValue<'_>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
