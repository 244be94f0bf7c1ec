//! Admin screens
//!
//! One declarative field map per listed record type. The REST path of each screen is
//! the collection the admin back-end serves it from.

pub mod coupons;
pub mod customers;
pub mod notifications;
pub mod orders;
pub mod products;

use crate::view::CollectionView;
use crate::{Coupon, Customer, Notification, Order, Product};

/// The views of every admin screen, built once at startup.
#[derive(Debug)]
pub struct Screens {
    pub coupons: CollectionView<Coupon>,
    pub orders: CollectionView<Order>,
    pub customers: CollectionView<Customer>,
    pub products: CollectionView<Product>,
    pub notifications: CollectionView<Notification>,
}

impl Default for Screens {
    fn default() -> Self {
        Self {
            coupons: coupons::view(),
            orders: orders::view(),
            customers: customers::view(),
            products: products::view(),
            notifications: notifications::view(),
        }
    }
}
