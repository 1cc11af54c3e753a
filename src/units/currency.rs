//! Currency rate sets.
//!
//! A [`CurrencyRateSet`] expresses every rate as units of that currency
//! per one unit of the base currency. The wire shape is
//!
//! ```json
//! { "date": "2025-01-31", "usd": { "eur": 0.96, "jpy": 155.1 } }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::error::{NumbyError, NumbyResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Age after which a rate set is considered stale.
pub fn stale_after() -> Duration {
    Duration::hours(24)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatesError {
    #[error("rate payload is not valid JSON: {0}")]
    Json(String),
    #[error("rate payload must be a JSON object")]
    NotAnObject,
    #[error("rate payload has no \"date\" field")]
    MissingDate,
    #[error("invalid rate date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("rate payload must contain exactly one base currency, found {0}")]
    BaseCount(usize),
    #[error("rates for base '{0}' must be a non-empty object")]
    InvalidRateTable(String),
    #[error("invalid currency code '{0}'")]
    InvalidCode(String),
    #[error("rate for '{code}' must be a positive number, got {value}")]
    InvalidRate { code: String, value: String },
}

/// Serialized form stored in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRates {
    pub date: NaiveDate,
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRateSet {
    date: NaiveDate,
    base: String,
    rates: BTreeMap<String, f64>,
}

impl CurrencyRateSet {
    pub fn new(
        date: NaiveDate,
        base: &str,
        rates: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self, RatesError> {
        let base = normalize_code(base)?;
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            let code = normalize_code(&code)?;
            if !(rate.is_finite() && rate > 0.0) {
                return Err(RatesError::InvalidRate {
                    code,
                    value: rate.to_string(),
                });
            }
            table.insert(code, rate);
        }
        if table.is_empty() {
            return Err(RatesError::InvalidRateTable(base));
        }
        table.insert(base.clone(), 1.0);
        Ok(Self {
            date,
            base,
            rates: table,
        })
    }

    /// Parses and validates a rate payload. Nothing is returned unless the
    /// whole payload is well formed.
    pub fn from_json(json: &str) -> Result<Self, RatesError> {
        let payload: JsonValue =
            serde_json::from_str(json).map_err(|e| RatesError::Json(e.to_string()))?;
        let object = payload.as_object().ok_or(RatesError::NotAnObject)?;

        let date = match object.get("date") {
            Some(JsonValue::String(date)) => NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|_| RatesError::InvalidDate(date.clone()))?,
            Some(other) => return Err(RatesError::InvalidDate(other.to_string())),
            None => return Err(RatesError::MissingDate),
        };

        let bases: Vec<(&String, &JsonValue)> =
            object.iter().filter(|(key, _)| *key != "date").collect();
        let [(base, table)] = bases.as_slice() else {
            return Err(RatesError::BaseCount(bases.len()));
        };
        let table = table
            .as_object()
            .ok_or_else(|| RatesError::InvalidRateTable(base.to_string()))?;

        let mut rates = Vec::with_capacity(table.len());
        for (code, rate) in table {
            let rate = rate.as_f64().ok_or_else(|| RatesError::InvalidRate {
                code: code.clone(),
                value: rate.to_string(),
            })?;
            rates.push((code.clone(), rate));
        }
        Self::new(date, base, rates)
    }

    pub fn to_json(&self) -> String {
        let rates: Map<String, JsonValue> = self
            .rates
            .iter()
            .map(|(code, rate)| (code.to_lowercase(), JsonValue::from(*rate)))
            .collect();
        let mut object = Map::new();
        object.insert(
            "date".to_string(),
            JsonValue::String(self.date.format(DATE_FORMAT).to_string()),
        );
        object.insert(self.base.to_lowercase(), JsonValue::Object(rates));
        JsonValue::Object(object).to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> NumbyResult<f64> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self
            .rate(from)
            .ok_or_else(|| NumbyError::MissingRate(from.to_string()))?;
        let to_rate = self
            .rate(to)
            .ok_or_else(|| NumbyError::MissingRate(to.to_string()))?;
        Ok(amount * to_rate / from_rate)
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        is_date_stale(self.date, now)
    }
}

/// A date is stale once more than 24 hours have passed since its start (UTC).
pub fn is_date_stale(date: NaiveDate, now: DateTime<Utc>) -> bool {
    let start = date.and_hms_opt(0, 0, 0).map(|start| start.and_utc());
    match start {
        Some(start) => now.signed_duration_since(start) > stale_after(),
        None => true,
    }
}

impl From<&CurrencyRateSet> for PersistedRates {
    fn from(set: &CurrencyRateSet) -> Self {
        Self {
            date: set.date,
            base: set.base.clone(),
            rates: set.rates.clone(),
        }
    }
}

impl TryFrom<PersistedRates> for CurrencyRateSet {
    type Error = RatesError;

    fn try_from(persisted: PersistedRates) -> Result<Self, Self::Error> {
        CurrencyRateSet::new(persisted.date, &persisted.base, persisted.rates)
    }
}

fn normalize_code(code: &str) -> Result<String, RatesError> {
    let valid = !code.is_empty()
        && code.len() <= 10
        && code.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(RatesError::InvalidCode(code.to_string()))
    }
}

/// Codes recognized in expressions even before any rate set is loaded.
pub const KNOWN_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "CNY", "INR", "MXN", "BRL", "ZAR", "RUB",
    "KRW", "SEK", "NOK", "DKK", "SGD", "HKD", "NZD", "TRY", "PLN", "THB", "MYR", "IDR", "PHP",
    "CZK", "ILS", "CLP", "AED", "COP", "BYN", "UAH", "NGN", "VND", "BTC", "ETH", "BNB",
];

/// Display symbols. The first entry for a code is used when formatting.
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₽", "RUB"),
    ("₩", "KRW"),
    ("₪", "ILS"),
    ("₱", "PHP"),
    ("฿", "THB"),
    ("₺", "TRY"),
    ("₴", "UAH"),
    ("₦", "NGN"),
    ("₫", "VND"),
    ("₿", "BTC"),
];

const CURRENCY_WORDS: &[(&str, &str)] = &[
    ("dollar", "USD"),
    ("dollars", "USD"),
    ("euro", "EUR"),
    ("euros", "EUR"),
    ("yen", "JPY"),
    ("rupee", "INR"),
    ("rupees", "INR"),
    ("ruble", "RUB"),
    ("rubles", "RUB"),
];

pub fn symbol_for(code: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(symbol, _)| *symbol)
}

pub fn code_for_symbol(symbol: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, code)| *code)
}

/// Resolves a word in an expression to a currency code.
///
/// Upper-case words match any known code or any code of the active rate
/// set; lower-case words only match the built-in list and currency names.
pub fn resolve_code(word: &str, rates: Option<&CurrencyRateSet>) -> Option<String> {
    if let Some((_, code)) = CURRENCY_WORDS.iter().find(|(w, _)| *w == word) {
        return Some(code.to_string());
    }
    let upper = word.to_ascii_uppercase();
    let known = KNOWN_CURRENCIES.contains(&upper.as_str());
    let is_upper = word.chars().all(|c| c.is_ascii_uppercase());
    let in_rates = rates.is_some_and(|set| set.contains(&upper));
    if known || (is_upper && in_rates) {
        Some(upper)
    } else {
        None
    }
}
