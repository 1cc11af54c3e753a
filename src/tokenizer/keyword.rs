use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Reserved words. None of them can be used as a variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    // history references
    Prev,
    Ans,
    Sum,
    Total,
    Average,
    Avg,
    // percentages
    Of,
    // conversions
    To,
    In,
    As,
}

impl Keyword {
    pub fn is_history(self) -> bool {
        matches!(
            self,
            Keyword::Prev
                | Keyword::Ans
                | Keyword::Sum
                | Keyword::Total
                | Keyword::Average
                | Keyword::Avg
        )
    }

    pub fn is_conversion(self) -> bool {
        matches!(self, Keyword::To | Keyword::In | Keyword::As)
    }
}

pub fn is_reserved(word: &str) -> bool {
    Keyword::try_from(word).is_ok()
}
