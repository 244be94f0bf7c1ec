//! Flash Sale Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;
use crate::domain::aggregates::promotion::{discounted_price, Phase, PromotionWindow};
use crate::domain::events::{DomainEvent, PromotionEvent};
use crate::domain::value_objects::{DiscountPercent, Money};

#[derive(Clone, Debug)]
pub struct FlashSale {
    id: Uuid,
    name: String,
    window: PromotionWindow,
    discount: DiscountPercent,
    product_ids: BTreeSet<Uuid>,
    events: Vec<DomainEvent>,
}

/// A product price as shown to shoppers at a given instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SalePrice {
    pub product_id: Uuid,
    pub phase: Phase,
    pub original: Decimal,
    pub current: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlashSaleConfig {
    pub name: String,
    pub window: PromotionWindow,
    pub discount: DiscountPercent,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

impl FlashSale {
    pub fn schedule(name: impl Into<String>, window: PromotionWindow, discount: DiscountPercent) -> Self {
        let id = Uuid::now_v7();
        let mut sale = Self { id, name: name.into(), window, discount, product_ids: BTreeSet::new(), events: vec![] };
        sale.raise_event(DomainEvent::Promotion(PromotionEvent::SaleScheduled { sale_id: id, starts_at: window.start() }));
        sale
    }

    pub fn from_config(config: FlashSaleConfig) -> Self {
        let mut sale = Self::schedule(config.name, config.window, config.discount);
        sale.product_ids.extend(config.product_ids);
        sale
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn window(&self) -> &PromotionWindow { &self.window }
    pub fn discount(&self) -> DiscountPercent { self.discount }
    pub fn includes(&self, product_id: &Uuid) -> bool { self.product_ids.contains(product_id) }
    pub fn product_count(&self) -> usize { self.product_ids.len() }

    pub fn add_product(&mut self, product_id: Uuid) -> bool { self.product_ids.insert(product_id) }

    /// Prices a product at `now`. Products outside the sale keep their price.
    pub fn price_for(&self, product_id: Uuid, price: &Money, now: DateTime<Utc>) -> SalePrice {
        self.price_in(product_id, price, self.window.phase_at(now))
    }

    /// Prices a product in an already known phase, such as the last clock reading.
    pub fn price_in(&self, product_id: Uuid, price: &Money, phase: Phase) -> SalePrice {
        let current = if self.includes(&product_id) { discounted_price(price, self.discount, phase) } else { price.clone() };
        SalePrice { product_id, phase, original: price.amount(), current: current.amount() }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}
