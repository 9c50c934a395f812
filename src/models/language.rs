use serde::{Deserialize, Serialize};

/// Interface languages supported by the clients. Arabic is the default and
/// the only right-to-left one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    Fr,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rtl,
    Ltr,
}

impl Language {
    pub fn direction(&self) -> Direction {
        match self {
            Language::Ar => Direction::Rtl,
            Language::Fr | Language::En => Direction::Ltr,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Ar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_is_the_only_rtl_language() {
        assert_eq!(Language::Ar.direction(), Direction::Rtl);
        assert_eq!(Language::Fr.direction(), Direction::Ltr);
        assert_eq!(Language::En.direction(), Direction::Ltr);
    }

    #[test]
    fn default_language_is_arabic() {
        assert_eq!(Language::default(), Language::Ar);
    }
}
