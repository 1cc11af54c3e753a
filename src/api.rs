//! Thread-safe facade over a [`Context`] and a [`Pipeline`].
//!
//! A [`Session`] is what hosts hold on to: the command-line binary, the C
//! bindings and embedding applications. Calls on one session are
//! serialized; separate sessions share only the locale and rate status.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::agents::{Evaluation, Pipeline};
use crate::config;
use crate::currency_fetcher::RateFetcher;
use crate::error::{NumbyError, NumbyResult};
use crate::eval::{Context, HistoryEntry};
use crate::locale::{self, LocaleSetting};
use crate::rates::{self, Staleness};
use crate::units::currency::CurrencyRateSet;
use crate::value::Value;

pub use crate::agents::MAX_EXPR_LENGTH;

#[derive(Debug, Default)]
pub struct Session {
    context: Mutex<Context>,
    pipeline: Pipeline,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            context: Mutex::new(Context::new()),
            pipeline,
        }
    }

    /// A session initialised from the config file at `path`.
    pub fn from_config(path: &Path) -> NumbyResult<Self> {
        let session = Self::new();
        session.load_config(path)?;
        Ok(session)
    }

    // a panic mid-evaluation leaves the context consistent, so a poisoned
    // lock is still usable
    fn lock(&self) -> MutexGuard<'_, Context> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn evaluate(&self, input: &str) -> NumbyResult<Evaluation> {
        self.pipeline.evaluate(input, &mut self.lock())
    }

    /// Evaluates raw bytes, which must be UTF-8.
    pub fn evaluate_bytes(&self, input: &[u8]) -> NumbyResult<Evaluation> {
        if input.len() > MAX_EXPR_LENGTH {
            return Err(NumbyError::InputTooLarge {
                len: input.len(),
                max: MAX_EXPR_LENGTH,
            });
        }
        let input = std::str::from_utf8(input)
            .map_err(|e| NumbyError::InvalidInput(format!("input is not UTF-8: {}", e)))?;
        self.evaluate(input)
    }

    /// Evaluates without recording anything.
    pub fn preview(&self, input: &str) -> NumbyResult<Evaluation> {
        self.pipeline.preview(input, &self.lock())
    }

    /// Binds `name` to `value`, with `unit` naming a unit or a currency.
    pub fn set_variable(&self, name: &str, value: f64, unit: Option<&str>) -> NumbyResult<()> {
        if !value.is_finite() {
            return Err(NumbyError::NonFiniteResult);
        }
        let mut context = self.lock();
        let value = match unit.map(str::trim).filter(|u| !u.is_empty()) {
            Some(unit) => {
                let arithmetic = crate::eval::arithmetic::Arithmetic::new(
                    context.units(),
                    context.rates(),
                    locale::current(),
                );
                let kind = arithmetic
                    .resolve_kind(unit)
                    .ok_or_else(|| NumbyError::parse(format!("unknown unit '{}'", unit)))?;
                Value {
                    amount: value,
                    kind,
                }
            }
            None => Value::number(value),
        };
        context.set_variable(name, value)
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.lock().variable(name).cloned()
    }

    /// Applies the config at `path`. Nothing changes unless the whole file
    /// is valid.
    #[instrument(level = "debug", skip(self))]
    pub fn load_config(&self, path: &Path) -> NumbyResult<()> {
        let mut context = self.lock();
        config::load_into(path, &mut context)?;
        Ok(())
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.lock().config_path().map(Path::to_path_buf)
    }

    pub fn clear_history(&self) {
        self.lock().clear_history();
    }

    pub fn clear_variables(&self) {
        self.lock().clear_variables();
    }

    pub fn history_count(&self) -> usize {
        self.lock().history_count()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history().cloned().collect()
    }

    /// Downloads fresh rates, saves them to the loaded config file (or the
    /// default one when none is loaded) and then activates them. Nothing
    /// changes if saving fails.
    pub fn update_currency_rates(&self) -> NumbyResult<NaiveDate> {
        // no lock held across the network call
        let fetched = RateFetcher::new()?.fetch()?;
        self.store_rates(fetched, true)
    }

    /// Replaces the session's rates with a validated JSON payload of the
    /// form `{"date": "YYYY-MM-DD", "usd": {"eur": 0.9, ...}}`.
    pub fn set_currency_rates_json(&self, json: &str) -> NumbyResult<NaiveDate> {
        let set = CurrencyRateSet::from_json(json)?;
        self.store_rates(set, false)
    }

    fn store_rates(&self, set: CurrencyRateSet, persist: bool) -> NumbyResult<NaiveDate> {
        let date = set.date();
        let mut context = self.lock();
        if persist {
            let path = match context.config_path() {
                Some(path) => path.to_path_buf(),
                None => config::default_config_path()?,
            };
            if let Err(e) = config::persist_rates(&path, &set) {
                warn!("rates not saved to {}: {}", path.display(), e);
                return Err(e.into());
            }
        }
        context.set_rates(set);
        rates::record_update(date);
        info!("currency rates dated {} active", date);
        Ok(date)
    }
}

pub fn set_locale(code: &str) -> NumbyResult<()> {
    locale::set_locale(code)
}

pub fn get_locale() -> &'static str {
    locale::get_locale()
}

pub fn locales() -> &'static [LocaleSetting] {
    locale::locales()
}

pub fn locale_count() -> usize {
    locale::locale_count()
}

pub fn are_rates_stale() -> NumbyResult<bool> {
    Ok(rates::are_rates_stale()? == Staleness::Stale)
}

pub fn get_rates_update_date() -> Option<NaiveDate> {
    rates::get_rates_update_date()
}

pub fn default_config_path() -> NumbyResult<PathBuf> {
    Ok(config::default_config_path()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::ValueKind;

    #[test]
    fn test_set_variable_with_unit() {
        let session = Session::new();
        session.set_variable("trip", 12.0, Some("km")).unwrap();
        session.set_variable("n", 2.0, None).unwrap();
        assert_eq!(
            session.variable("trip").map(|v| v.kind),
            Some(ValueKind::Unit("km".to_string()))
        );
        assert_eq!(
            session.set_variable("x", 1.0, Some("parsec")).unwrap_err().kind(),
            ErrorKind::ParseError
        );
        assert_eq!(
            session.set_variable("sum", 1.0, None).unwrap_err().kind(),
            ErrorKind::InvalidName
        );
        assert_eq!(session.history_count(), 0);
    }

    #[test]
    fn test_evaluate_bytes_requires_utf8() {
        let session = Session::new();
        let error = session.evaluate_bytes(&[0x31, 0xff, 0x32]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_preview_does_not_record() {
        let session = Session::new();
        assert!(session.preview("2 + 2").is_ok());
        assert_eq!(session.history_count(), 0);
    }

    #[test]
    fn test_fetched_rates_are_saved_without_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("numby").join("config.json");
        let blocked = dir.path().join("plain-file");
        std::fs::write(&blocked, "").unwrap();

        let session = Session::new();
        let first = CurrencyRateSet::from_json(r#"{"date": "2025-03-01", "usd": {"eur": 0.5}}"#)
            .unwrap();
        let second = CurrencyRateSet::from_json(r#"{"date": "2025-03-02", "usd": {"eur": 0.25}}"#)
            .unwrap();

        std::env::set_var(config::CONFIG_ENV, &target);
        let stored = session.store_rates(first, true);
        std::env::set_var(config::CONFIG_ENV, blocked.join("config.json"));
        let refused = session.store_rates(second, true);
        std::env::remove_var(config::CONFIG_ENV);

        assert_eq!(stored.unwrap().to_string(), "2025-03-01");
        let saved = config::Config::from_file(&target).unwrap();
        assert_eq!(saved.currency_rates.unwrap().rates.get("EUR"), Some(&0.5));
        assert!(session.config_path().is_none());

        assert_eq!(refused.unwrap_err().kind(), ErrorKind::ConfigError);
        let evaluation = session.evaluate("10 USD to EUR").unwrap();
        assert_eq!(evaluation.value, Value::currency(5.0, "EUR"));
    }

    #[test]
    fn test_rejected_rates_keep_previous_set() {
        let session = Session::new();
        let rates = r#"{"date": "2025-02-01", "usd": {"eur": 0.5}}"#;
        session.set_currency_rates_json(rates).unwrap();
        assert!(session.set_currency_rates_json(r#"{"usd": {"eur": 1}}"#).is_err());
        let evaluation = session.evaluate("10 USD to EUR").unwrap();
        assert_eq!(evaluation.value, Value::currency(5.0, "EUR"));
    }
}
