//! # Unit Tables
//!
//! Table-driven unit conversion. Every unit belongs to exactly one
//! [`Category`] and carries a factor (and, for temperatures, an offset)
//! relative to the category's base unit:
//!
//! ```text
//! base = amount * factor + offset
//! ```
//!
//! Currencies are not stored here; their factors are the live
//! [`currency::CurrencyRateSet`] held by the evaluation context.

pub mod currency;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use strum::EnumString;

use crate::error::{NumbyError, NumbyResult};
use crate::locale::{self, LocaleSetting};

/// A dimension of measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Length,
    #[strum(serialize = "mass", serialize = "weight")]
    Mass,
    Time,
    Temperature,
    Area,
    Volume,
    #[strum(serialize = "angle", serialize = "angular")]
    Angle,
    Data,
    Speed,
    Energy,
    /// Categories introduced by configuration.
    #[strum(default)]
    Custom(String),
}

impl Category {
    pub fn from_name(name: &str) -> Self {
        // EnumString with a default variant never fails
        Category::from_str(name).unwrap_or_else(|_| Category::Custom(name.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Length => "length",
            Category::Mass => "mass",
            Category::Time => "time",
            Category::Temperature => "temperature",
            Category::Area => "area",
            Category::Volume => "volume",
            Category::Angle => "angle",
            Category::Data => "data",
            Category::Speed => "speed",
            Category::Energy => "energy",
            Category::Custom(name) => name,
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    /// Canonical symbol used for display and as the unit id of a value.
    pub symbol: String,
    pub category: Category,
    pub factor: f64,
    pub offset: f64,
}

impl UnitDef {
    pub fn to_base(&self, amount: f64) -> f64 {
        amount * self.factor + self.offset
    }

    pub fn from_base(&self, base: f64) -> f64 {
        (base - self.offset) / self.factor
    }
}

/// Multipliers accepted directly after a number (`5k`, `2 million`).
pub const SCALES: &[(&str, f64)] = &[
    ("k", 1e3),
    ("thousand", 1e3),
    ("M", 1e6),
    ("million", 1e6),
    ("billion", 1e9),
    ("trillion", 1e12),
];

pub fn scale_factor(word: &str) -> Option<f64> {
    SCALES
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, factor)| *factor)
}

/// Built-in units: (symbol, aliases, factor to base).
const LENGTH: &[(&str, &[&str], f64)] = &[
    ("m", &["meter", "meters", "metre", "metres"], 1.0),
    ("mm", &["millimeter", "millimeters"], 0.001),
    ("cm", &["centimeter", "centimeters"], 0.01),
    ("km", &["kilometer", "kilometers", "kilometre", "kilometres"], 1000.0),
    ("in", &["inch", "inches"], 0.0254),
    ("ft", &["foot", "feet"], 0.3048),
    ("yd", &["yard", "yards"], 0.9144),
    ("mi", &["mile", "miles"], 1609.344),
    ("nmi", &["nauticalmile", "nauticalmiles"], 1852.0),
];

const MASS: &[(&str, &[&str], f64)] = &[
    ("g", &["gram", "grams"], 1.0),
    ("mg", &["milligram", "milligrams"], 0.001),
    ("kg", &["kilogram", "kilograms", "kilo", "kilos"], 1000.0),
    ("t", &["tonne", "tonnes"], 1e6),
    ("ct", &["carat", "carats"], 0.2),
    ("oz", &["ounce", "ounces"], 28.349523125),
    ("lb", &["lbs", "pound", "pounds"], 453.59237),
    ("st", &["stone", "stones"], 6350.29318),
];

const TIME: &[(&str, &[&str], f64)] = &[
    ("s", &["sec", "secs", "second", "seconds"], 1.0),
    ("ms", &["millisecond", "milliseconds"], 0.001),
    ("min", &["mins", "minute", "minutes"], 60.0),
    ("h", &["hr", "hrs", "hour", "hours"], 3600.0),
    ("day", &["days", "d"], 86400.0),
    ("week", &["weeks", "wk"], 604800.0),
    ("month", &["months"], 2592000.0),
    ("year", &["years", "yr", "yrs"], 31536000.0),
];

const AREA: &[(&str, &[&str], f64)] = &[
    ("m2", &["sqm"], 1.0),
    ("cm2", &[], 1e-4),
    ("km2", &["sqkm"], 1e6),
    ("ft2", &["sqft"], 0.09290304),
    ("are", &["ares"], 100.0),
    ("ha", &["hectare", "hectares"], 10000.0),
    ("acre", &["acres"], 4046.8564224),
];

const VOLUME: &[(&str, &[&str], f64)] = &[
    ("m3", &[], 1.0),
    ("l", &["L", "liter", "liters", "litre", "litres"], 0.001),
    ("ml", &["mL", "milliliter", "milliliters"], 1e-6),
    ("gal", &["gallon", "gallons"], 0.003785411784),
    ("qt", &["quart", "quarts"], 0.000946352946),
    ("pt", &["pint", "pints"], 0.000473176473),
    ("cup", &["cups"], 0.0002365882365),
    ("tbsp", &["tablespoon", "tablespoons"], 1.478676478125e-5),
    ("tsp", &["teaspoon", "teaspoons"], 4.92892159375e-6),
];

const ANGLE: &[(&str, &[&str], f64)] = &[
    ("rad", &["radian", "radians"], 1.0),
    ("deg", &["degree", "degrees"], std::f64::consts::PI / 180.0),
];

const DATA: &[(&str, &[&str], f64)] = &[
    ("bit", &["bits", "b"], 1.0),
    ("B", &["byte", "bytes"], 8.0),
    ("KB", &["kilobyte", "kilobytes"], 8e3),
    ("MB", &["megabyte", "megabytes"], 8e6),
    ("GB", &["gigabyte", "gigabytes"], 8e9),
    ("TB", &["terabyte", "terabytes"], 8e12),
    ("KiB", &["kibibyte", "kibibytes"], 8192.0),
    ("MiB", &["mebibyte", "mebibytes"], 8388608.0),
    ("GiB", &["gibibyte", "gibibytes"], 8589934592.0),
];

const SPEED: &[(&str, &[&str], f64)] = &[
    ("mps", &[], 1.0),
    ("kph", &["kmh", "kmph"], 1000.0 / 3600.0),
    ("mph", &[], 0.44704),
    ("kn", &["knot", "knots"], 1852.0 / 3600.0),
];

const ENERGY: &[(&str, &[&str], f64)] = &[
    ("J", &["joule", "joules"], 1.0),
    ("kJ", &["kilojoule", "kilojoules"], 1000.0),
    ("cal", &["calorie", "calories"], 4.184),
    ("kcal", &["kilocalorie", "kilocalories"], 4184.0),
    ("Wh", &[], 3600.0),
    ("kWh", &[], 3.6e6),
];

/// Unit registry with alias resolution.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: HashMap<String, UnitDef>,
    aliases: HashMap<String, String>,
}

impl UnitTable {
    /// An empty table with no units.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        let linear = [
            (Category::Length, LENGTH),
            (Category::Mass, MASS),
            (Category::Time, TIME),
            (Category::Area, AREA),
            (Category::Volume, VOLUME),
            (Category::Angle, ANGLE),
            (Category::Data, DATA),
            (Category::Speed, SPEED),
            (Category::Energy, ENERGY),
        ];
        for (category, units) in linear {
            for (symbol, aliases, factor) in units {
                table.insert(
                    UnitDef {
                        symbol: symbol.to_string(),
                        category: category.clone(),
                        factor: *factor,
                        offset: 0.0,
                    },
                    aliases,
                );
            }
        }

        // kelvin is the base; celsius and fahrenheit are affine
        let temperature: [(&str, &[&str], f64, f64); 3] = [
            ("K", &["kelvin", "kelvins"], 1.0, 0.0),
            ("C", &["c", "celsius", "degC"], 1.0, 273.15),
            (
                "F",
                &["f", "fahrenheit", "degF"],
                5.0 / 9.0,
                459.67 * 5.0 / 9.0,
            ),
        ];
        for (symbol, aliases, factor, offset) in temperature {
            table.insert(
                UnitDef {
                    symbol: symbol.to_string(),
                    category: Category::Temperature,
                    factor,
                    offset,
                },
                aliases,
            );
        }
        table
    }

    /// Registers a unit under its symbol and aliases. Earlier registrations
    /// keep their alias when a later one collides case-insensitively.
    pub fn insert(&mut self, unit: UnitDef, aliases: &[&str]) {
        let symbol = unit.symbol.clone();
        let names = std::iter::once(symbol.as_str()).chain(aliases.iter().copied());
        for name in names {
            self.aliases.insert(name.to_string(), symbol.clone());
            let lower = name.to_lowercase();
            self.aliases.entry(lower).or_insert_with(|| symbol.clone());
        }
        self.units.insert(symbol, unit);
    }

    /// Adds a configuration-defined unit. The factor is relative to the
    /// category's base unit and must be positive.
    pub fn add_custom(&mut self, category: Category, name: &str, factor: f64) -> NumbyResult<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(NumbyError::InvalidInput(format!(
                "unit '{}' needs a positive factor, got {}",
                name, factor
            )));
        }
        if category == Category::Temperature {
            return Err(NumbyError::InvalidInput(
                "temperature units cannot be redefined".to_string(),
            ));
        }
        self.insert(
            UnitDef {
                symbol: name.to_string(),
                category,
                factor,
                offset: 0.0,
            },
            &[],
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&UnitDef> {
        self.lookup_in(name, locale::current())
    }

    /// Resolves a unit name: locale alias, exact alias, then case-folded alias.
    pub fn lookup_in(&self, name: &str, locale: &LocaleSetting) -> Option<&UnitDef> {
        let symbol = locale
            .unit_alias(name)
            .or_else(|| self.aliases.get(name).map(String::as_str))
            .or_else(|| self.aliases.get(&name.to_lowercase()).map(String::as_str))?;
        self.units.get(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&UnitDef> {
        self.units.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Converts between two units of the same category.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> NumbyResult<f64> {
        let source = self
            .lookup(from)
            .ok_or_else(|| NumbyError::parse(format!("unknown unit '{}'", from)))?;
        let target = self
            .lookup(to)
            .ok_or_else(|| NumbyError::parse(format!("unknown unit '{}'", to)))?;
        convert_between(amount, source, target)
    }
}

pub fn convert_between(amount: f64, source: &UnitDef, target: &UnitDef) -> NumbyResult<f64> {
    if source.category != target.category {
        return Err(NumbyError::incompatible(format!(
            "cannot convert {} ({}) to {} ({})",
            source.symbol, source.category, target.symbol, target.category
        )));
    }
    if source.symbol == target.symbol {
        return Ok(amount);
    }
    Ok(target.from_base(source.to_base(amount)))
}
