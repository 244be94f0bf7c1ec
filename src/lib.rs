//! Storefront Admin
//!
//! Back-office core for a themed storefront: flash-sale promotions and the admin
//! screens that list coupons, orders, customers, products and notifications.
//!
//! ## Features
//! - Promotion window phases, countdowns and sale prices
//! - Search, filter, sort and pagination over resident collections
//! - Persisted light/dark theme preference
//! - Pre-submit form validation and user-facing notices

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod app;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod forms;
pub mod http;
pub mod notify;
pub mod screens;
pub mod theme;
pub mod ticker;
pub mod view;

// =============================================================================
// Listed Records
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_value: Decimal,
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Percentage,
    Fixed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: String,
    pub total: Decimal,
    #[serde(default)]
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub order_count: u32,
    #[serde(default)]
    pub total_spent: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Promotion,
    Order,
    #[default]
    System,
}

macro_rules! wire_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Name used on the wire and in filters.
            pub fn as_str(&self) -> &'static str {
                match self { $(Self::$variant => $name),+ }
            }
        }
    };
}

wire_names!(DiscountType { Percentage => "percentage", Fixed => "fixed" });
wire_names!(OrderStatus { Pending => "pending", Confirmed => "confirmed", Shipping => "shipping", Delivered => "delivered", Cancelled => "cancelled" });
wire_names!(PaymentStatus { Unpaid => "unpaid", Paid => "paid", Refunded => "refunded" });
wire_names!(ProductStatus { Draft => "draft", Active => "active", Archived => "archived" });
wire_names!(NotificationKind { Promotion => "promotion", Order => "order", System => "system" });

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Preference storage error: {0}")]
    Store(#[from] theme::StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
