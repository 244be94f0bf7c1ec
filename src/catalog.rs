//! Resident record collections
//!
//! The admin screens work on collections already fetched into memory. A catalog is
//! loaded once from a JSON document and shared read-only; changes arrive as a new
//! catalog, never as edits in place.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use crate::domain::aggregates::FlashSaleConfig;
use crate::view::Record;
use crate::{Coupon, Customer, Notification, Order, Product};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    pub flash_sale: Option<FlashSaleConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: &'static str, id: Uuid },
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        let catalog = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            coupons = catalog.coupons.len(),
            orders = catalog.orders.len(),
            customers = catalog.customers.len(),
            products = catalog.products.len(),
            notifications = catalog.notifications.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.check_ids()?;
        Ok(catalog)
    }

    fn check_ids(&self) -> Result<(), CatalogError> {
        unique_ids("coupons", &self.coupons)?;
        unique_ids("orders", &self.orders)?;
        unique_ids("customers", &self.customers)?;
        unique_ids("products", &self.products)?;
        unique_ids("notifications", &self.notifications)
    }
}

fn unique_ids<R: Record>(collection: &'static str, records: &[R]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let id = record.id();
        if !seen.insert(id) { return Err(CatalogError::DuplicateId { collection, id }); }
    }
    Ok(())
}
