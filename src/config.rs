//! JSON configuration file.
//!
//! ```json
//! {
//!   "locale": "de",
//!   "variables": { "rate": { "value": 0.19 }, "trip": { "value": 42, "unit": "km" } },
//!   "custom_units": { "length": { "furlong": 201.168 } },
//!   "history_limit": 500,
//!   "currency_rates": { "date": "2025-01-31", "base": "USD", "rates": { "EUR": 0.96 } },
//!   "rates_updated_at": "2025-01-31"
//! }
//! ```
//!
//! A file is validated in full by [`Config::prepare`] before anything is
//! applied to a context.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::eval::arithmetic::Arithmetic;
use crate::eval::context::{validate_identifier, Context, DEFAULT_HISTORY_LIMIT};
use crate::locale::{self, LocaleSetting};
use crate::rates;
use crate::units::currency::{CurrencyRateSet, PersistedRates, RatesError};
use crate::units::{Category, UnitTable};
use crate::value::Value;

/// Environment variable overriding the default config location.
pub const CONFIG_ENV: &str = "NUMBY_CONFIG";
pub const MAX_PATH_LENGTH: usize = 4096;
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot access config file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid currency rates: {0}")]
    Rates(#[from] RatesError),
    #[error("config path is {0} bytes long (limit {MAX_PATH_LENGTH})")]
    PathTooLong(usize),
    #[error("config file is {0} bytes (limit {MAX_CONFIG_SIZE})")]
    FileTooLarge(u64),
    #[error("no configuration directory available")]
    NoConfigDir,
    #[error("variable '{name}': {reason}")]
    InvalidVariable { name: String, reason: String },
    #[error("unit '{unit}' ({category}): {reason}")]
    InvalidUnit {
        category: String,
        unit: String,
        reason: String,
    },
    #[error("unknown locale '{0}'")]
    UnknownLocale(String),
    #[error("{0} unavailable")]
    StateUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locale: Option<String>,

    #[serde(default)]
    pub variables: BTreeMap<String, VariableConfig>,

    /// Category name to unit name to factor relative to the category base.
    #[serde(default)]
    pub custom_units: BTreeMap<String, BTreeMap<String, f64>>,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_rates: Option<PersistedRates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates_updated_at: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: None,
            variables: BTreeMap::new(),
            custom_units: BTreeMap::new(),
            history_limit: default_history_limit(),
            currency_rates: None,
            rates_updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        check_path(path)?;
        let size = fs::metadata(path)?.len();
        if size > MAX_CONFIG_SIZE {
            return Err(ConfigError::FileTooLarge(size));
        }
        let reader = BufReader::new(File::open(path)?);
        let config = serde_json::from_reader(reader)?;
        debug!("config read from {}", path.display());
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        check_path(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validates every field and resolves it against the built-in tables.
    pub fn prepare(&self) -> Result<PreparedConfig, ConfigError> {
        let locale = match &self.locale {
            Some(code) => Some(
                locale::find(code).ok_or_else(|| ConfigError::UnknownLocale(code.clone()))?,
            ),
            None => None,
        };

        let mut units = UnitTable::builtin();
        for (category, table) in &self.custom_units {
            for (unit, factor) in table {
                units
                    .add_custom(Category::from_name(category), unit, *factor)
                    .map_err(|e| ConfigError::InvalidUnit {
                        category: category.clone(),
                        unit: unit.clone(),
                        reason: e.to_string(),
                    })?;
            }
        }

        let rates = self
            .currency_rates
            .clone()
            .map(CurrencyRateSet::try_from)
            .transpose()?;

        let resolver = Arithmetic::new(
            &units,
            rates.as_ref(),
            locale.unwrap_or_else(locale::current),
        );
        let mut variables = Vec::with_capacity(self.variables.len());
        for (name, variable) in &self.variables {
            let invalid = |reason: String| ConfigError::InvalidVariable {
                name: name.clone(),
                reason,
            };
            validate_identifier(name).map_err(|e| invalid(e.to_string()))?;
            if !variable.value.is_finite() {
                return Err(invalid("value is not finite".to_string()));
            }
            let value = match &variable.unit {
                Some(unit) => {
                    let kind = resolver
                        .resolve_kind(unit)
                        .ok_or_else(|| invalid(format!("unknown unit '{}'", unit)))?;
                    Value {
                        amount: variable.value,
                        kind,
                    }
                }
                None => Value::number(variable.value),
            };
            variables.push((name.clone(), value));
        }

        let rates_updated_at = self
            .rates_updated_at
            .or_else(|| rates.as_ref().map(CurrencyRateSet::date));

        Ok(PreparedConfig {
            locale,
            variables,
            units,
            history_limit: self.history_limit,
            rates,
            rates_updated_at,
        })
    }
}

/// A validated config, ready to be applied without failure.
#[derive(Debug)]
pub struct PreparedConfig {
    locale: Option<&'static LocaleSetting>,
    variables: Vec<(String, Value)>,
    units: UnitTable,
    history_limit: usize,
    rates: Option<CurrencyRateSet>,
    rates_updated_at: Option<NaiveDate>,
}

impl PreparedConfig {
    pub fn apply(self, context: &mut Context) {
        if let Some(locale) = self.locale {
            locale::activate(locale);
        }
        context.set_units(self.units);
        context.set_history_limit(self.history_limit);
        for (name, value) in self.variables {
            context.insert_variable(name, value);
        }
        if let Some(rates) = self.rates {
            context.set_rates(rates);
        }
        if let Some(date) = self.rates_updated_at {
            rates::record_update(date);
        }
    }
}

/// Reads, validates and applies the file at `path`. The context is only
/// touched once the whole file has been validated.
pub fn load_into(path: &Path, context: &mut Context) -> Result<(), ConfigError> {
    let prepared = Config::from_file(path)?.prepare()?;
    prepared.apply(context);
    context.set_config_path(path);
    info!("config loaded from {}", path.display());
    Ok(())
}

/// Stores `rates` in the config at `path`, keeping its other fields. A
/// missing file is created.
pub fn persist_rates(path: &Path, rates: &CurrencyRateSet) -> Result<(), ConfigError> {
    let mut config = match Config::from_file(path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(e),
    };
    config.currency_rates = Some(PersistedRates::from(rates));
    config.rates_updated_at = Some(rates.date());
    config.save(path)?;
    info!("rates of {} saved to {}", rates.date(), path.display());
    Ok(())
}

/// `$NUMBY_CONFIG`, or `config.json` in the platform config directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("", "", "numby").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.json"))
}

fn check_path(path: &Path) -> Result<(), ConfigError> {
    let length = path.as_os_str().len();
    if length > MAX_PATH_LENGTH {
        return Err(ConfigError::PathTooLong(length));
    }
    Ok(())
}
