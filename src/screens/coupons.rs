//! Coupons screen

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::view::{CollectionView, FieldMap, FieldValue, Predicate, Record};
use crate::Coupon;

pub const PATH: &str = "/api/admins/coupons";

impl Record for Coupon {
    fn id(&self) -> Uuid { self.id }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        Some(match name {
            "code" => FieldValue::text(&self.code),
            "description" => FieldValue::text(&self.description),
            "type" => FieldValue::text(self.discount_type.as_str()),
            "value" => self.discount_value.into(),
            "min_order_value" => self.min_order_value.into(),
            "used_count" => self.used_count.into(),
            "start_date" => self.start_date.into(),
            "end_date" => self.end_date.into(),
            _ => return None,
        })
    }
}

/// Enabled and not yet past its end date.
pub fn is_active(c: &Coupon, now: DateTime<Utc>) -> bool { c.is_active && c.end_date >= now }
pub fn is_expired(c: &Coupon, now: DateTime<Utc>) -> bool { c.end_date < now }
pub fn is_disabled(c: &Coupon, now: DateTime<Utc>) -> bool { !c.is_active && c.end_date >= now }
fn is_used_up(c: &Coupon, _: DateTime<Utc>) -> bool { c.usage_limit.is_some_and(|limit| c.used_count >= limit) }

pub fn view() -> CollectionView<Coupon> {
    CollectionView::new(
        FieldMap::new()
            .search(["code", "description"])
            .filter_named("status", [("active", is_active as Predicate<Coupon>), ("expired", is_expired), ("disabled", is_disabled)])
            .filter_eq("type", "type")
            .sort(["code", "value", "min_order_value", "used_count", "start_date", "end_date"])
            .stat("active", is_active)
            .stat("expired", is_expired)
            .stat("used_up", is_used_up),
    )
}
