//! CANON Tea Shop
//!
//! Tea shop built on the interning cache: one shared [`Tea`] per variety,
//! served to any number of tables. Unknown teas are rejected or replaced by
//! a configured default, per [`ShopConfig::unknown_key_policy`].

pub mod config;
pub mod shop;
pub mod tea;
pub mod telemetry;

pub use config::{LogFormat, LoggingConfig, ShopConfig};
pub use shop::{ShopSummary, TeaOrder, TeaShop, DEMO_ORDERS};
pub use tea::{TableNumber, Tea, TeaVariety};
