use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::Function;
use crate::error::{NumbyError, NumbyResult};
use crate::tokenizer::keyword::is_reserved;
use crate::units::currency::CurrencyRateSet;
use crate::units::UnitTable;
use crate::value::Value;

pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// One successful top-level evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: String,
    pub result: Value,
    pub formatted: String,
    /// Logical timestamp, strictly increasing within a context.
    pub sequence: u64,
}

/// Session state: variables, history, the active rate set and unit table.
///
/// Cloning is cheap for the shared parts (units, rates), so a clone can
/// serve as a scratch copy for previews.
#[derive(Debug, Clone)]
pub struct Context {
    variables: HashMap<String, Value>,
    history: VecDeque<HistoryEntry>,
    history_limit: usize,
    next_sequence: u64,
    rates: Option<Arc<CurrencyRateSet>>,
    units: Arc<UnitTable>,
    config_path: Option<PathBuf>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            next_sequence: 0,
            rates: None,
            units: Arc::new(UnitTable::builtin()),
            config_path: None,
        }
    }

    // Variables

    /// Binds `name`, replacing any previous value. Does not touch history.
    pub fn set_variable(&mut self, name: &str, value: Value) -> NumbyResult<()> {
        validate_identifier(name)?;
        debug!("bind {} = {}", name, value);
        self.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds a name that has already been validated.
    pub(crate) fn insert_variable(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    // History

    /// Appends an entry, evicting the oldest ones beyond the limit.
    pub fn append_history(&mut self, input: &str, result: Value, formatted: String) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.history.push_back(HistoryEntry {
            input: input.to_string(),
            result,
            formatted,
            sequence,
        });
        self.trim_history();
        sequence
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    pub fn last_result(&self) -> Option<&Value> {
        self.history.back().map(|entry| &entry.result)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// A limit of zero is treated as one.
    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit.max(1);
        self.trim_history();
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    // Conversion tables

    pub fn rates(&self) -> Option<&CurrencyRateSet> {
        self.rates.as_deref()
    }

    /// Swaps in a new rate set. The previous one is dropped entirely.
    pub fn set_rates(&mut self, rates: CurrencyRateSet) {
        debug!("rate set of {} replaced ({} codes)", rates.date(), rates.len());
        self.rates = Some(Arc::new(rates));
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn set_units(&mut self, units: UnitTable) {
        self.units = Arc::new(units);
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn set_config_path(&mut self, path: impl Into<PathBuf>) {
        self.config_path = Some(path.into());
    }
}

/// Checks that `name` can be bound: an identifier that is neither a
/// keyword nor a built-in function name.
pub fn validate_identifier(name: &str) -> NumbyResult<()> {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !well_formed {
        return Err(NumbyError::InvalidName(format!(
            "'{}' is not an identifier",
            name
        )));
    }
    if is_reserved(name) || name.parse::<Function>().is_ok() {
        return Err(NumbyError::InvalidName(format!("'{}' is reserved", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    #[test]
    fn test_variables_last_assignment_wins() {
        let mut ctx = Context::new();
        ctx.set_variable("x", Value::number(1.0)).unwrap();
        ctx.set_variable("x", Value::unit(2.0, "km")).unwrap();
        assert_eq!(ctx.variable("x"), Some(&Value::unit(2.0, "km")));
        assert_eq!(ctx.variable_count(), 1);
        assert_eq!(ctx.history_count(), 0);

        ctx.clear_variables();
        ctx.clear_variables();
        assert!(ctx.variable("x").is_none());
    }

    #[test]
    fn test_invalid_names() {
        let mut ctx = Context::new();
        for name in ["", "1x", "a-b", "prev", "to", "sqrt", "x y"] {
            let error = ctx.set_variable(name, Value::number(1.0)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidName, "{}", name);
        }
        for name in ["x", "_tmp", "rate2", "größe", "Prev"] {
            assert!(ctx.set_variable(name, Value::number(1.0)).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_history_is_ordered_and_bounded() {
        let mut ctx = Context::new();
        ctx.set_history_limit(3);
        for i in 0..5 {
            ctx.append_history(&i.to_string(), Value::number(i as f64), i.to_string());
        }
        let inputs: Vec<&str> = ctx.history().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["2", "3", "4"]);
        assert_eq!(ctx.last_result(), Some(&Value::number(4.0)));

        let sequences: Vec<u64> = ctx.history().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);

        ctx.clear_history();
        assert_eq!(ctx.history_count(), 0);
        assert!(ctx.last_result().is_none());
    }

    #[test]
    fn test_rate_set_is_replaced_whole() {
        let mut ctx = Context::new();
        assert!(ctx.rates().is_none());
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let first = CurrencyRateSet::new(date, "usd", [("EUR".to_string(), 0.9)]).unwrap();
        let second = CurrencyRateSet::new(date, "usd", [("GBP".to_string(), 0.8)]).unwrap();
        ctx.set_rates(first);
        ctx.set_rates(second);
        let rates = ctx.rates().unwrap();
        assert!(rates.contains("GBP"));
        assert!(!rates.contains("EUR"));
    }
}
