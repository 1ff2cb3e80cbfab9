//! Exchange rate table quoted against the base currency

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

/// Currency every rate in a [`RateTable`] is quoted against.
pub const BASE_CURRENCY: &str = "EUR";

/// Normalizes a currency code for comparisons, e.g. `" usd "` becomes `"USD"`.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Units of each currency equal to one unit of [`BASE_CURRENCY`], keyed by
/// normalized currency code. The base currency itself is never a key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    published: Option<NaiveDate>,
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// A table with no known rates. Every non-identity conversion fails against it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rates<I, K>(rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut table = Self::empty();
        for (code, rate) in rates {
            table.insert(code.as_ref(), rate);
        }
        table
    }

    pub fn with_published(mut self, published: Option<NaiveDate>) -> Self {
        self.published = published;
        self
    }

    fn insert(&mut self, code: &str, rate: f64) {
        let code = normalize_code(code);
        if code.is_empty() || code == BASE_CURRENCY {
            return;
        }
        if !rate.is_finite() || rate <= 0.0 {
            warn!(currency = %code, rate, "Ignoring unusable exchange rate");
            return;
        }
        self.rates.insert(code, rate);
    }

    /// Rate of `code` against the base currency, if the table knows it.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates.get(&normalize_code(code)).copied()
    }

    /// Date the rates were published for, when the source reported one.
    pub fn published(&self) -> Option<NaiveDate> {
        self.published
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rates ordered by currency code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .rates
            .iter()
            .map(|(code, rate)| (code.as_str(), *rate))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

/// Somewhere a full [`RateTable`] can be fetched from.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable>;
}
