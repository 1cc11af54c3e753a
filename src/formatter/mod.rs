//! Locale-aware rendering of values.
//!
//! Rounding depends only on [`FormatterConfig`]; the locale decides the
//! separators and where a currency symbol goes, so every locale shows the
//! same digits.

pub mod config;

use crate::locale::LocaleSetting;
use crate::units::currency::symbol_for;
use crate::value::{Value, ValueKind};

pub use config::FormatterConfig;

#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    config: FormatterConfig,
}

impl ValueFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// `1,234.5`, `5 km`, `$1,234.50`, `1.234,50 €`, `12.50 CHF`.
    pub fn format(&self, value: &Value, locale: &LocaleSetting) -> String {
        match &value.kind {
            ValueKind::Number => self.format_number(value.amount, locale),
            ValueKind::Unit(symbol) => {
                format!("{} {}", self.format_number(value.amount, locale), symbol)
            }
            ValueKind::Currency(code) => self.format_currency(value.amount, code, locale),
        }
    }

    /// Plain number with trailing zeros trimmed.
    pub fn format_number(&self, amount: f64, locale: &LocaleSetting) -> String {
        let amount = normalize_zero(amount);
        let magnitude = amount.abs();
        if magnitude >= self.config.scientific_upper
            || (magnitude != 0.0 && magnitude < self.config.scientific_lower)
        {
            return format!("{:e}", amount).replace('.', &locale.decimal_separator.to_string());
        }
        let fixed = format!("{:.*}", self.config.max_fraction_digits, amount);
        let trimmed = trim_fraction(&fixed);
        localize(trimmed, locale)
    }

    fn format_currency(&self, amount: f64, code: &str, locale: &LocaleSetting) -> String {
        let digits = self.config.currency_fraction_digits;
        let fixed = format!("{:.*}", digits, normalize_zero(amount));
        let (sign, unsigned) = match fixed.strip_prefix('-') {
            // `-0.00` after rounding
            Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => ("", rest),
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let number = localize(unsigned, locale);
        match symbol_for(code) {
            Some(symbol) if locale.currency_after => format!("{}{} {}", sign, number, symbol),
            Some(symbol) => format!("{}{}{}", sign, symbol, number),
            None => format!("{}{} {}", sign, number, code),
        }
    }
}

fn normalize_zero(amount: f64) -> f64 {
    if amount == 0.0 {
        0.0
    } else {
        amount
    }
}

fn trim_fraction(fixed: &str) -> &str {
    if !fixed.contains('.') {
        return fixed;
    }
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0"
    } else {
        trimmed
    }
}

/// Groups the integer digits and swaps in the locale decimal separator.
fn localize(number: &str, locale: &LocaleSetting) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(locale.group_separator);
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}{}{}", sign, grouped, locale.decimal_separator, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{find, LOCALES};
    use pretty_assertions::assert_eq;

    fn english() -> &'static LocaleSetting {
        &LOCALES[0]
    }

    fn german() -> &'static LocaleSetting {
        find("de").unwrap()
    }

    fn format(value: Value, locale: &LocaleSetting) -> String {
        ValueFormatter::default().format(&value, locale)
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(format(Value::number(14.0), english()), "14");
        assert_eq!(format(Value::number(1234567.5), english()), "1,234,567.5");
        assert_eq!(format(Value::number(-1234.25), english()), "-1,234.25");
        assert_eq!(format(Value::number(0.1 + 0.2), english()), "0.3");
        assert_eq!(format(Value::number(-0.0), english()), "0");
        assert_eq!(format(Value::number(123.0), english()), "123");
    }

    #[test]
    fn test_locale_changes_only_separators() {
        assert_eq!(format(Value::number(1234567.5), german()), "1.234.567,5");
        assert_eq!(
            format(Value::number(1.0 / 3.0), english()).replace('.', ","),
            format(Value::number(1.0 / 3.0), german())
        );
        let french = find("fr").unwrap();
        assert_eq!(format(Value::number(1234.5), french), "1 234,5");
    }

    #[test]
    fn test_scientific_range() {
        assert_eq!(format(Value::number(1e20), english()), "1e20");
        assert_eq!(format(Value::number(1.5e-7), german()), "1,5e-7");
    }

    #[test]
    fn test_units() {
        assert_eq!(format(Value::unit(5000.0, "m"), english()), "5,000 m");
    }

    #[test]
    fn test_currencies() {
        assert_eq!(format(Value::currency(1234.5, "USD"), english()), "$1,234.50");
        assert_eq!(format(Value::currency(1234.5, "EUR"), german()), "1.234,50 €");
        assert_eq!(format(Value::currency(-5.0, "USD"), english()), "-$5.00");
        assert_eq!(format(Value::currency(12.5, "CHF"), english()), "12.50 CHF");
        assert_eq!(format(Value::currency(-0.001, "USD"), english()), "$0.00");
    }
}
