//! HTTP surface for the admin screens

use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;
use crate::catalog::Catalog;
use crate::domain::aggregates::{ClockReading, FlashSale, Phase, SalePrice};
use crate::domain::value_objects::Money;
use crate::screens::{self, Screens};
use crate::theme::{Theme, ThemeContext};
use crate::ticker::Clock;
use crate::view::{clamp_page, total_pages, CollectionView, Page, Record, ViewQuery};

/// Promotion served by the storefront, with the readings of its running clock.
#[derive(Clone, Debug)]
pub struct LiveSale {
    pub sale: Arc<FlashSale>,
    pub readings: watch::Receiver<ClockReading>,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub screens: Arc<Screens>,
    pub theme: Arc<Mutex<ThemeContext>>,
    pub sale: Option<LiveSale>,
    pub clock: Arc<dyn Clock>,
    pub default_page_size: NonZeroUsize,
}

type ApiError = (StatusCode, String);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-admin"})) }))
        .route(screens::coupons::PATH, get(list_coupons))
        .route(screens::orders::PATH, get(list_orders))
        .route(screens::customers::PATH, get(list_customers))
        .route(screens::products::PATH, get(list_products))
        .route(screens::notifications::PATH, get(list_notifications))
        .route("/api/flash-sale", get(flash_sale_status))
        .route("/api/flash-sale/products", get(flash_sale_products))
        .route("/api/theme", get(get_theme))
        .route("/api/theme/toggle", post(toggle_theme))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

/// Runs a screen's view, resetting a page number that no longer exists to 1.
fn list<R: Record + Clone>(state: &AppState, view: &CollectionView<R>, records: &[R], params: BTreeMap<String, String>) -> Result<Json<Page<R>>, ApiError> {
    let bad_request = |e: crate::view::ViewError| (StatusCode::BAD_REQUEST, e.to_string());
    let now = state.clock.now();
    let mut query = ViewQuery::from_params(params, state.default_page_size).map_err(bad_request)?;
    let matching = view.filtered(records, &query, now).map_err(bad_request)?.len();
    query.page = clamp_page(query.page, total_pages(matching, query.page_size.get()));
    let page = view.apply(records, &query, now).map_err(bad_request)?;
    Ok(Json(page.map(R::clone)))
}

async fn list_coupons(State(s): State<AppState>, Query(p): Query<BTreeMap<String, String>>) -> Result<Json<Page<crate::Coupon>>, ApiError> {
    list(&s, &s.screens.coupons, &s.catalog.coupons, p)
}

async fn list_orders(State(s): State<AppState>, Query(p): Query<BTreeMap<String, String>>) -> Result<Json<Page<crate::Order>>, ApiError> {
    list(&s, &s.screens.orders, &s.catalog.orders, p)
}

async fn list_customers(State(s): State<AppState>, Query(p): Query<BTreeMap<String, String>>) -> Result<Json<Page<crate::Customer>>, ApiError> {
    list(&s, &s.screens.customers, &s.catalog.customers, p)
}

async fn list_products(State(s): State<AppState>, Query(p): Query<BTreeMap<String, String>>) -> Result<Json<Page<crate::Product>>, ApiError> {
    list(&s, &s.screens.products, &s.catalog.products, p)
}

async fn list_notifications(State(s): State<AppState>, Query(p): Query<BTreeMap<String, String>>) -> Result<Json<Page<crate::Notification>>, ApiError> {
    list(&s, &s.screens.notifications, &s.catalog.notifications, p)
}

#[derive(Debug, Serialize)]
pub struct SaleStatus {
    pub id: Uuid,
    pub name: String,
    pub discount: Decimal,
    pub product_count: usize,
    pub phase: Phase,
    /// `HH:MM:SS` until the next boundary.
    pub countdown: String,
    pub reading: ClockReading,
}

fn live_sale(s: &AppState) -> Result<&LiveSale, ApiError> {
    s.sale.as_ref().ok_or((StatusCode::NOT_FOUND, "No flash sale scheduled".to_string()))
}

async fn flash_sale_status(State(s): State<AppState>) -> Result<Json<SaleStatus>, ApiError> {
    let live = live_sale(&s)?;
    let reading = *live.readings.borrow();
    Ok(Json(SaleStatus {
        id: live.sale.id(),
        name: live.sale.name().to_string(),
        discount: live.sale.discount().value(),
        product_count: live.sale.product_count(),
        phase: reading.phase,
        countdown: reading.remaining.to_string(),
        reading,
    }))
}

#[derive(Debug, Serialize)]
pub struct SaleProduct {
    pub id: Uuid,
    pub name: String,
    pub price: SalePrice,
}

async fn flash_sale_products(State(s): State<AppState>) -> Result<Json<Vec<SaleProduct>>, ApiError> {
    let live = live_sale(&s)?;
    // Same reading as the status endpoint, so prices switch together with the phase.
    let phase = live.readings.borrow().phase;
    let products = s.catalog.products.iter()
        .filter(|p| live.sale.includes(&p.id))
        .map(|p| SaleProduct { id: p.id, name: p.name.clone(), price: live.sale.price_in(p.id, &Money::vnd(p.price), phase) })
        .collect();
    Ok(Json(products))
}

#[derive(Debug, Serialize)]
pub struct ThemeBody { pub theme: Theme }

async fn get_theme(State(s): State<AppState>) -> Result<Json<ThemeBody>, ApiError> {
    let ctx = s.theme.lock().map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "theme lock poisoned".to_string()))?;
    Ok(Json(ThemeBody { theme: ctx.theme() }))
}

async fn toggle_theme(State(s): State<AppState>) -> Result<Json<ThemeBody>, ApiError> {
    let mut ctx = s.theme.lock().map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "theme lock poisoned".to_string()))?;
    let theme = ctx.toggle().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    for event in ctx.take_events() { tracing::info!(?event, "theme event"); }
    Ok(Json(ThemeBody { theme }))
}
