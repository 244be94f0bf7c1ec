//! Customers screen

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::view::{CollectionView, FieldMap, FieldValue, Predicate, Record};
use crate::Customer;

pub const PATH: &str = "/api/admins/customers";

impl Record for Customer {
    fn id(&self) -> Uuid { self.id }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        Some(match name {
            "full_name" => FieldValue::text(&self.full_name),
            "email" => FieldValue::text(&self.email),
            "phone" => FieldValue::text(self.phone.as_deref()?),
            "is_disabled" => self.is_disabled.into(),
            "order_count" => self.order_count.into(),
            "total_spent" => self.total_spent.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }
}

fn enabled(c: &Customer, _: DateTime<Utc>) -> bool { !c.is_disabled }
fn disabled(c: &Customer, _: DateTime<Utc>) -> bool { c.is_disabled }

pub fn view() -> CollectionView<Customer> {
    CollectionView::new(
        FieldMap::new()
            .search(["full_name", "email", "phone"])
            .filter_named("state", [("enabled", enabled as Predicate<Customer>), ("disabled", disabled)])
            .sort(["full_name", "email", "order_count", "total_spent", "created_at"])
            .stat("enabled", enabled)
            .stat("disabled", disabled),
    )
}
