/// Numeric presentation settings shared by every locale.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    /// Fraction digits kept for plain numbers and units before trailing
    /// zeros are trimmed.
    pub max_fraction_digits: usize,
    /// Fixed fraction digits for currency amounts.
    pub currency_fraction_digits: usize,
    /// Magnitudes at or above this switch to scientific notation.
    pub scientific_upper: f64,
    /// Non-zero magnitudes below this switch to scientific notation.
    pub scientific_lower: f64,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_fraction_digits: 10,
            currency_fraction_digits: 2,
            scientific_upper: 1e15,
            scientific_lower: 1e-6,
        }
    }
}
