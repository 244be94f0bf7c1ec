//! Server configuration from the environment

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use crate::domain::aggregates::{FlashSaleConfig, PromotionWindow};
use crate::domain::value_objects::DiscountPercent;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_THEME_STORE: &str = "preferences.json";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub catalog_path: Option<PathBuf>,
    pub theme_store_path: PathBuf,
    pub default_page_size: NonZeroUsize,
    pub flash_sale: Option<FlashSaleConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value}: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(v) => parse("PORT", &v, |s| s.parse::<u16>().map_err(|e| e.to_string()))?,
            None => DEFAULT_PORT,
        };
        let default_page_size = match get("DEFAULT_PAGE_SIZE") {
            Some(v) => parse("DEFAULT_PAGE_SIZE", &v, |s| s.parse::<NonZeroUsize>().map_err(|e| e.to_string()))?,
            None => NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
        };

        let flash_sale = match (get("FLASH_SALE_START"), get("FLASH_SALE_END")) {
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete("FLASH_SALE_START", "FLASH_SALE_END")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("FLASH_SALE_END", "FLASH_SALE_START")),
            (Some(start), Some(end)) => {
                let start = parse("FLASH_SALE_START", &start, parse_instant)?;
                let end_at = parse("FLASH_SALE_END", &end, parse_instant)?;
                let window = PromotionWindow::new(start, end_at)
                    .map_err(|e| ConfigError::Invalid { key: "FLASH_SALE_END", value: end, reason: e.to_string() })?;
                let discount = match get("FLASH_SALE_DISCOUNT") {
                    Some(v) => parse("FLASH_SALE_DISCOUNT", &v, |s| {
                        let d = s.parse::<Decimal>().map_err(|e| e.to_string())?;
                        DiscountPercent::new(d).map_err(|e| e.to_string())
                    })?,
                    None => return Err(ConfigError::Incomplete("FLASH_SALE_START", "FLASH_SALE_DISCOUNT")),
                };
                Some(FlashSaleConfig {
                    name: get("FLASH_SALE_NAME").unwrap_or_else(|| "Flash Sale".to_string()),
                    window,
                    discount,
                    product_ids: vec![],
                })
            }
        };

        Ok(Self {
            port,
            catalog_path: get("CATALOG_PATH").map(PathBuf::from),
            theme_store_path: get("THEME_STORE_PATH").map_or_else(|| PathBuf::from(DEFAULT_THEME_STORE), PathBuf::from),
            default_page_size,
            flash_sale,
        })
    }

    pub fn bind_address(&self) -> String { format!("0.0.0.0:{}", self.port) }
}

fn parse<T>(key: &'static str, value: &str, f: impl FnOnce(&str) -> Result<T, String>) -> Result<T, ConfigError> {
    f(value).map_err(|reason| ConfigError::Invalid { key, value: value.to_string(), reason })
}

/// RFC 3339 timestamp or epoch milliseconds.
fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ms) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms).ok_or_else(|| "timestamp out of range".to_string());
    }
    DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc)).map_err(|e| e.to_string())
}
