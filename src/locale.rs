//! Locale catalog and the process-wide active locale.
//!
//! The active locale lives in a single slot shared by every session: it is
//! read under a shared lock and replaced under an exclusive one, so readers
//! always observe a complete [`LocaleSetting`].

use std::sync::RwLock;

use lazy_static::lazy_static;
use tracing::info;

use crate::error::{NumbyError, NumbyResult};

/// Number conventions and vocabulary of one locale.
#[derive(Debug, PartialEq)]
pub struct LocaleSetting {
    pub code: &'static str,
    pub name: &'static str,
    pub decimal_separator: char,
    pub group_separator: char,
    /// Currency symbol after the amount (`12,50 €`) instead of before (`$12.50`).
    pub currency_after: bool,
    /// Localized unit names mapped to canonical unit symbols.
    pub unit_aliases: &'static [(&'static str, &'static str)],
    /// Words accepted in place of `to`/`in`/`as` in conversions.
    pub conversion_words: &'static [&'static str],
}

impl LocaleSetting {
    pub fn unit_alias(&self, word: &str) -> Option<&'static str> {
        self.unit_aliases
            .iter()
            .find(|(alias, _)| *alias == word)
            .map(|(_, symbol)| *symbol)
    }

    pub fn is_conversion_word(&self, word: &str) -> bool {
        self.conversion_words.contains(&word)
    }
}

pub static LOCALES: &[LocaleSetting] = &[
    LocaleSetting {
        code: "en-US",
        name: "English",
        decimal_separator: '.',
        group_separator: ',',
        currency_after: false,
        unit_aliases: &[],
        conversion_words: &[],
    },
    LocaleSetting {
        code: "es",
        name: "Español",
        decimal_separator: ',',
        group_separator: '.',
        currency_after: true,
        unit_aliases: &[
            ("metros", "m"),
            ("kilómetros", "km"),
            ("millas", "mi"),
            ("kilogramos", "kg"),
            ("libras", "lb"),
            ("litros", "l"),
            ("horas", "h"),
        ],
        conversion_words: &["a", "en"],
    },
    LocaleSetting {
        code: "fr",
        name: "Français",
        decimal_separator: ',',
        group_separator: ' ',
        currency_after: true,
        unit_aliases: &[
            ("mètres", "m"),
            ("kilomètres", "km"),
            ("milles", "mi"),
            ("kilogrammes", "kg"),
            ("livres", "lb"),
            ("litres", "l"),
            ("heures", "h"),
        ],
        conversion_words: &["en", "vers"],
    },
    LocaleSetting {
        code: "de",
        name: "Deutsch",
        decimal_separator: ',',
        group_separator: '.',
        currency_after: true,
        unit_aliases: &[
            ("Meter", "m"),
            ("Kilometer", "km"),
            ("Meilen", "mi"),
            ("Kilogramm", "kg"),
            ("Pfund", "lb"),
            ("Liter", "l"),
            ("Stunden", "h"),
        ],
        conversion_words: &["nach", "zu"],
    },
    LocaleSetting {
        code: "ja",
        name: "日本語",
        decimal_separator: '.',
        group_separator: ',',
        currency_after: false,
        unit_aliases: &[
            ("メートル", "m"),
            ("キロメートル", "km"),
            ("キロ", "kg"),
            ("グラム", "g"),
            ("リットル", "l"),
        ],
        conversion_words: &[],
    },
    LocaleSetting {
        code: "ru",
        name: "Русский",
        decimal_separator: ',',
        group_separator: ' ',
        currency_after: true,
        unit_aliases: &[
            ("м", "m"),
            ("км", "km"),
            ("кг", "kg"),
            ("г", "g"),
            ("л", "l"),
            ("ч", "h"),
        ],
        conversion_words: &["в"],
    },
    LocaleSetting {
        code: "be",
        name: "Беларуская",
        decimal_separator: ',',
        group_separator: ' ',
        currency_after: true,
        unit_aliases: &[("м", "m"), ("км", "km"), ("кг", "kg"), ("г", "g")],
        conversion_words: &["у"],
    },
    LocaleSetting {
        code: "zh-CN",
        name: "简体中文",
        decimal_separator: '.',
        group_separator: ',',
        currency_after: false,
        unit_aliases: &[
            ("米", "m"),
            ("公里", "km"),
            ("千克", "kg"),
            ("公斤", "kg"),
            ("克", "g"),
            ("升", "l"),
        ],
        conversion_words: &["到"],
    },
    LocaleSetting {
        code: "zh-TW",
        name: "繁體中文",
        decimal_separator: '.',
        group_separator: ',',
        currency_after: false,
        unit_aliases: &[("米", "m"), ("公里", "km"), ("公斤", "kg"), ("克", "g")],
        conversion_words: &["到"],
    },
];

lazy_static! {
    static ref ACTIVE_LOCALE: RwLock<&'static LocaleSetting> = RwLock::new(&LOCALES[0]);
}

/// The locale every session formats and parses with.
pub fn current() -> &'static LocaleSetting {
    // a poisoned slot still holds a complete reference
    *ACTIVE_LOCALE
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub fn get_locale() -> &'static str {
    current().code
}

/// Finds a locale by code, ignoring case; `de-AT` falls back to `de`.
pub fn find(code: &str) -> Option<&'static LocaleSetting> {
    let code = code.trim().replace('_', "-");
    LOCALES
        .iter()
        .find(|locale| locale.code.eq_ignore_ascii_case(&code))
        .or_else(|| {
            let language = code.split('-').next()?;
            LOCALES.iter().find(|locale| {
                locale
                    .code
                    .split('-')
                    .next()
                    .is_some_and(|l| l.eq_ignore_ascii_case(language))
            })
        })
}

pub fn set_locale(code: &str) -> NumbyResult<()> {
    let locale = find(code).ok_or_else(|| NumbyError::LocaleNotFound(code.to_string()))?;
    activate(locale);
    Ok(())
}

/// Makes `locale` the active locale for every session.
pub fn activate(locale: &'static LocaleSetting) {
    let mut slot = ACTIVE_LOCALE
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *slot = locale;
    info!("locale set to {}", locale.code);
}

pub fn locales() -> &'static [LocaleSetting] {
    LOCALES
}

pub fn locale_count() -> usize {
    LOCALES.len()
}

pub fn locale_at(index: usize) -> Option<&'static LocaleSetting> {
    LOCALES.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_count() {
        assert_eq!(locale_count(), LOCALES.len());
        assert_eq!(locale_at(0).map(|l| l.code), Some("en-US"));
        assert_eq!(locale_at(0).map(|l| l.name), Some("English"));
        assert!(locale_at(locale_count()).is_none());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("en-us").map(|l| l.code), Some("en-US"));
        assert_eq!(find("de_AT").map(|l| l.code), Some("de"));
        assert_eq!(find("zh-TW").map(|l| l.code), Some("zh-TW"));
        assert_eq!(find("zh").map(|l| l.code), Some("zh-CN"));
        assert!(find("xx").is_none());
    }

    #[test]
    fn test_unknown_locale_is_rejected() {
        let error = set_locale("klingon").unwrap_err();
        assert!(matches!(error, NumbyError::LocaleNotFound(code) if code == "klingon"));
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = LOCALES.iter().map(|l| l.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), LOCALES.len());
    }
}
