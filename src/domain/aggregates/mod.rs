//! Aggregates module
pub mod promotion;
pub mod flash_sale;

pub use promotion::{discounted_price, ClockReading, Phase, PromotionClock, PromotionWindow, WindowBounds, WindowError};
pub use flash_sale::{FlashSale, FlashSaleConfig, SalePrice};
