//! Products screen

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::view::{CollectionView, FieldMap, FieldValue, Predicate, Record};
use crate::Product;

pub const PATH: &str = "/api/admins/products";

/// Stock at or below this level counts as running low.
pub const LOW_STOCK: u32 = 5;

impl Record for Product {
    fn id(&self) -> Uuid { self.id }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        Some(match name {
            "sku" => FieldValue::text(&self.sku),
            "name" => FieldValue::text(&self.name),
            "category" => FieldValue::text(&self.category),
            "status" => FieldValue::text(self.status.as_str()),
            "price" => self.price.into(),
            "stock" => self.stock.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }
}

fn in_stock(p: &Product, _: DateTime<Utc>) -> bool { p.stock > LOW_STOCK }
fn low_stock(p: &Product, _: DateTime<Utc>) -> bool { p.stock > 0 && p.stock <= LOW_STOCK }
fn out_of_stock(p: &Product, _: DateTime<Utc>) -> bool { p.stock == 0 }

pub fn view() -> CollectionView<Product> {
    CollectionView::new(
        FieldMap::new()
            .search(["name", "sku", "category"])
            .filter_eq("category", "category")
            .filter_eq("status", "status")
            .filter_named("stock", [("in_stock", in_stock as Predicate<Product>), ("low", low_stock), ("out", out_of_stock)])
            .sort(["name", "sku", "price", "stock", "created_at"])
            .stat("low_stock", low_stock)
            .stat("out_of_stock", out_of_stock),
    )
}
