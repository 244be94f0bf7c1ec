//! Domain events
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::Phase;
use crate::theme::Theme;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DomainEvent {
    Promotion(PromotionEvent),
    Theme(ThemeEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum PromotionEvent {
    PhaseChanged { from: Phase, to: Phase, at: DateTime<Utc> },
    SaleScheduled { sale_id: Uuid, starts_at: DateTime<Utc> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ThemeEvent {
    Changed { theme: Theme },
}
