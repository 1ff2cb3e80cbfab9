//! Rates, conversion and formatting

pub mod config;
pub mod convert;
pub mod format;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use convert::{Converter, convert_with};
pub use format::CurrencyFormatter;
pub use rates::{BASE_CURRENCY, RateSource, RateTable};
