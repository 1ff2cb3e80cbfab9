//! Cross-currency conversion through the base currency

use crate::core::rates::{BASE_CURRENCY, RateSource, RateTable, normalize_code};
use crate::providers::caching::RateCache;
use std::sync::Arc;
use tracing::debug;

/// Converts `amount` from one currency to another using `table`.
///
/// Returns `None` when either currency is unknown to the table. Converting a
/// currency to itself always succeeds, even against an empty table. Pairs that
/// don't involve the base currency are triangulated through it, so some loss
/// of precision is expected there. No rounding is applied.
pub fn convert_with(table: &RateTable, from: &str, to: &str, amount: f64) -> Option<f64> {
    let from = normalize_code(from);
    let to = normalize_code(to);

    if from == to {
        return Some(amount);
    }
    if from == BASE_CURRENCY {
        return table.rate_for(&to).map(|rate| amount * rate);
    }
    if to == BASE_CURRENCY {
        return table.rate_for(&from).map(|rate| amount / rate);
    }

    let in_base = amount / table.rate_for(&from)?;
    table.rate_for(&to).map(|rate| in_base * rate)
}

/// Conversion engine backed by the shared, load-once rate cache.
pub struct Converter<S: RateSource> {
    rates: Arc<RateCache<S>>,
}

impl<S: RateSource> Clone for Converter<S> {
    fn clone(&self) -> Self {
        Self {
            rates: Arc::clone(&self.rates),
        }
    }
}

impl<S: RateSource> Converter<S> {
    pub fn new(rates: Arc<RateCache<S>>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &Arc<RateCache<S>> {
        &self.rates
    }

    /// Converts `amount`, loading the rate table on first use.
    ///
    /// Identity conversions never trigger a fetch.
    pub async fn convert(&self, from: &str, to: &str, amount: f64) -> Option<f64> {
        if normalize_code(from) == normalize_code(to) {
            return Some(amount);
        }
        let table = self.rates.ensure_loaded().await;
        let converted = convert_with(table, from, to, amount);
        debug!(from, to, amount, ?converted, "Converted amount");
        converted
    }
}
