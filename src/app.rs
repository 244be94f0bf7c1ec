//! Application bootstrap and teardown

use std::sync::{Arc, Mutex};
use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::domain::aggregates::{FlashSale, PromotionClock};
use crate::http::{AppState, LiveSale};
use crate::screens::Screens;
use crate::theme::{FileStore, ThemeContext};
use crate::ticker::{Clock, ClockDriver, SamplingPlan};

/// Everything the server owns for its lifetime. Must be created inside a tokio runtime.
pub struct App {
    state: AppState,
    driver: Option<ClockDriver>,
}

impl App {
    pub fn bootstrap(config: &ServerConfig, clock: Arc<dyn Clock>) -> crate::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => {
                tracing::warn!("CATALOG_PATH not set, serving an empty catalog");
                Catalog::default()
            }
        };
        let theme = ThemeContext::load(Arc::new(FileStore::open(&config.theme_store_path)?));

        let mut driver = None;
        // Environment overrides the seeded sale but keeps its product list.
        let sale_config = match (config.flash_sale.clone(), catalog.flash_sale.as_ref()) {
            (Some(mut env), Some(seeded)) if env.product_ids.is_empty() => {
                env.product_ids = seeded.product_ids.clone();
                Some(env)
            }
            (Some(env), _) => Some(env),
            (None, seeded) => seeded.cloned(),
        };
        let sale = match sale_config {
            Some(sale_config) => {
                let mut sale = FlashSale::from_config(sale_config);
                for event in sale.take_events() { tracing::info!(?event, "promotion event"); }
                let started = ClockDriver::start(PromotionClock::new(*sale.window()), clock.clone(), SamplingPlan::default());
                let readings = started.subscribe();
                driver = Some(started);
                Some(LiveSale { sale: Arc::new(sale), readings })
            }
            None => None,
        };

        let state = AppState {
            catalog: Arc::new(catalog),
            screens: Arc::new(Screens::default()),
            theme: Arc::new(Mutex::new(theme)),
            sale,
            clock,
            default_page_size: config.default_page_size,
        };
        Ok(Self { state, driver })
    }

    pub fn state(&self) -> AppState { self.state.clone() }

    /// Stops the promotion clock. Dropping the app does the same.
    pub fn shutdown(mut self) {
        if let Some(driver) = self.driver.as_mut() { driver.stop(); }
        tracing::info!("shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticker::SystemClock;
    use std::num::NonZeroUsize;

    fn config(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            port: 0,
            catalog_path: None,
            theme_store_path: dir.join("prefs.json"),
            default_page_size: NonZeroUsize::new(10).unwrap(),
            flash_sale: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_without_sale() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::bootstrap(&config(dir.path()), Arc::new(SystemClock)).unwrap();
        assert!(app.state().sale.is_none());
        app.shutdown();
    }

    #[tokio::test]
    async fn test_bootstrap_reports_bad_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = ServerConfig { catalog_path: Some(path), ..config(dir.path()) };
        assert!(matches!(App::bootstrap(&config, Arc::new(SystemClock)), Err(crate::StorefrontError::Catalog(_))));
    }
}
