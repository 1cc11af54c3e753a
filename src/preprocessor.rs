use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::locale::LocaleSetting;
use crate::units::currency::code_for_symbol;

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

lazy_static! {
    static ref RE_DIGIT_UNDERSCORES: Regex = Regex::new(r"\b\d+(?:_\d+)+").unwrap();
    static ref RE_NUMBER_WORD: Regex = Regex::new(&format!(
        r"(?i)\b(?:{})\b",
        NUMBER_WORDS
            .iter()
            .map(|(word, _)| *word)
            .collect::<Vec<_>>()
            .join("|")
    ))
    .unwrap();
    static ref RE_WORD_OPERATORS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\bmultiplied\s+by\b").unwrap(), " * "),
        (Regex::new(r"(?i)\bdivided\s+by\b").unwrap(), " / "),
        (Regex::new(r"(?i)\btimes\b").unwrap(), " * "),
        (Regex::new(r"(?i)\bover\b").unwrap(), " / "),
        (Regex::new(r"(?i)\bplus\b").unwrap(), " + "),
        (Regex::new(r"(?i)\bminus\b").unwrap(), " - "),
        (Regex::new(r"(?i)\bmod\b").unwrap(), " % "),
    ];
    static ref RE_DEGREES_C: Regex = Regex::new(r"°\s*C\b").unwrap();
    static ref RE_DEGREES_F: Regex = Regex::new(r"°\s*F\b").unwrap();
    static ref RE_DEGREES: Regex = Regex::new(r"°").unwrap();
    static ref RE_PUNCTUATED_NUMBER: Regex = Regex::new(r"\d[\d.,]*\d").unwrap();
    static ref RE_SPACED_NUMBER: Regex =
        Regex::new(r"\b\d{1,3}(?:[ \u{a0}\u{202f}]\d{3})+(?:,\d+)?\b").unwrap();
    static ref RE_COMMA_GROUPED: Regex = Regex::new(r"^\d{1,3}(?:,\d{3})+(?:\.\d+)?$").unwrap();
    static ref RE_DOT_GROUPED: Regex = Regex::new(r"^\d{1,3}(?:\.\d{3})+(?:,\d+)?$").unwrap();
    static ref RE_COMMA_DECIMAL: Regex = Regex::new(r"^\d+,\d+$").unwrap();
    static ref RE_SYMBOL_BEFORE: Regex = Regex::new(
        r"(?P<sym>[$€£¥₹₽₩₪₱฿₺₴₦₫₿])\s*(?P<num>\d+(?:\.\d+)?(?:\s*(?:k|M|thousand|million|billion|trillion)\b)?)"
    )
    .unwrap();
    static ref RE_SYMBOL_AFTER: Regex =
        Regex::new(r"(?P<num>\d+(?:\.\d+)?)\s*(?P<sym>[$€£¥₹₽₩₪₱฿₺₴₦₫₿])").unwrap();
    static ref RE_SYMBOL: Regex = Regex::new(r"[$€£¥₹₽₩₪₱฿₺₴₦₫₿]").unwrap();
}

/// Rewrites free-form input into the token vocabulary. Comments (`//` or
/// `#` to end of line) are dropped, then number words, word operators,
/// currency and degree symbols and locale number separators are rewritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, input: &str, locale: &LocaleSetting) -> String {
        let mut output = self.strip_comments(input);

        output = self.replace_symbols(output.trim());

        output = self.replace_number_words(&output);

        output = self.replace_word_operators(&output);

        output = self.replace_degrees(&output);

        // separators first, so currency amounts are plain numbers
        output = self.remove_digit_underscores(&output);
        output = self.normalize_numbers(&output, locale);

        output = self.replace_currency_symbols(&output);

        output.trim().to_string()
    }

    fn strip_comments(&self, input: &str) -> String {
        input
            .lines()
            .map(|line| match line.find("//").or_else(|| line.find('#')) {
                Some(start) => &line[..start],
                None => line,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn replace_number_words(&self, input: &str) -> String {
        RE_NUMBER_WORD
            .replace_all(input, |caps: &Captures| {
                let word = caps[0].to_lowercase();
                NUMBER_WORDS
                    .iter()
                    .find(|(name, _)| *name == word)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .to_string()
    }

    /// `1_000_000` is `1000000`.
    fn remove_digit_underscores(&self, input: &str) -> String {
        RE_DIGIT_UNDERSCORES
            .replace_all(input, |caps: &Captures| caps[0].replace('_', ""))
            .to_string()
    }

    fn replace_symbols(&self, input: &str) -> String {
        input.replace('×', "*").replace('÷', "/").replace('−', "-")
    }

    fn replace_word_operators(&self, input: &str) -> String {
        RE_WORD_OPERATORS
            .iter()
            .fold(input.to_string(), |output, (re, operator)| {
                re.replace_all(&output, *operator).to_string()
            })
    }

    fn replace_degrees(&self, input: &str) -> String {
        let output = RE_DEGREES_C.replace_all(input, " C");
        let output = RE_DEGREES_F.replace_all(&output, " F");
        RE_DEGREES.replace_all(&output, " deg").to_string()
    }

    fn normalize_numbers(&self, input: &str, locale: &LocaleSetting) -> String {
        let input = if locale.group_separator.is_whitespace() {
            RE_SPACED_NUMBER
                .replace_all(input, |caps: &Captures| {
                    caps[0].chars().filter(|c| !c.is_whitespace()).collect::<String>()
                })
                .to_string()
        } else {
            input.to_string()
        };
        RE_PUNCTUATED_NUMBER
            .replace_all(&input, |caps: &Captures| normalize_number(&caps[0], locale))
            .to_string()
    }

    fn replace_currency_symbols(&self, input: &str) -> String {
        let to_code = |symbol: &str| code_for_symbol(symbol).unwrap_or_default();
        let output = RE_SYMBOL_BEFORE.replace_all(input, |caps: &Captures| {
            format!("{} {}", &caps["num"], to_code(&caps["sym"]))
        });
        let output = RE_SYMBOL_AFTER.replace_all(&output, |caps: &Captures| {
            format!("{} {}", &caps["num"], to_code(&caps["sym"]))
        });
        RE_SYMBOL
            .replace_all(&output, |caps: &Captures| format!(" {} ", to_code(&caps[0])))
            .to_string()
    }
}

/// Rewrites one number to use `.` as decimal point and no grouping.
/// Anything that does not look like a number of this locale is kept.
fn normalize_number(number: &str, locale: &LocaleSetting) -> String {
    if locale.decimal_separator == '.' {
        if RE_COMMA_GROUPED.is_match(number) {
            return number.replace(',', "");
        }
        return number.to_string();
    }
    if locale.group_separator == '.' && RE_DOT_GROUPED.is_match(number) {
        return number.replace('.', "").replace(',', ".");
    }
    if RE_COMMA_DECIMAL.is_match(number) {
        return number.replace(',', ".");
    }
    number.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{find, LOCALES};
    use pretty_assertions::assert_eq;

    fn english(input: &str) -> String {
        Preprocessor::new().process(input, &LOCALES[0])
    }

    fn localized(code: &str, input: &str) -> String {
        Preprocessor::new().process(input, find(code).unwrap())
    }

    #[test]
    fn test_word_operators() {
        assert_eq!(english("3 times 4"), "3  *  4");
        assert_eq!(english("10 divided by 4"), "10  /  4");
        assert_eq!(english("7 MOD 3"), "7  %  3");
        assert_eq!(english("6 × 7 ÷ 2"), "6 * 7 / 2");
        // only whole words
        assert_eq!(english("overhead"), "overhead");
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(english("5 + 3 // tip"), "5 + 3");
        assert_eq!(english("12 # note"), "12");
        assert_eq!(english("# only a note"), "");
        assert_eq!(english("2 * 3 // a # b"), "2 * 3");
    }

    #[test]
    fn test_digit_underscores() {
        assert_eq!(english("1_000_000 + 1"), "1000000 + 1");
        assert_eq!(english("$2_500"), "2500 USD");
        assert_eq!(english("rate_2"), "rate_2");
    }

    #[test]
    fn test_number_words() {
        assert_eq!(english("ten plus five"), "10  +  5");
        assert_eq!(english("Twenty times three"), "20  *  3");
        // only whole words
        assert_eq!(english("tone"), "tone");
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(english("$100"), "100 USD");
        assert_eq!(english("100€ + 5"), "100 EUR + 5");
        assert_eq!(english("$5k"), "5k USD");
        assert_eq!(english("$1,234.50"), "1234.50 USD");
        assert_eq!(english("100 to £"), "100 to  GBP");
    }

    #[test]
    fn test_degrees() {
        assert_eq!(english("100°C to F"), "100 C to F");
        assert_eq!(english("90°"), "90 deg");
    }

    #[test]
    fn test_locale_numbers() {
        assert_eq!(english("1,234,567.5 + 1"), "1234567.5 + 1");
        assert_eq!(english("1.5"), "1.5");
        assert_eq!(localized("de", "1.234,5 + 0,5"), "1234.5 + 0.5");
        assert_eq!(localized("de", "1.5"), "1.5");
        assert_eq!(localized("fr", "1 234,5"), "1234.5");
        assert_eq!(localized("es", "12,50 €"), "12.50 EUR");
    }
}
