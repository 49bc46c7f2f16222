//! Locale and currency data used when formatting amounts.
//!
//! The tables are small and cover the separators and symbols
//! commonly needed by shops. Anything unknown falls back to English
//! separators and the ISO code used as a literal symbol.

/// ISO-like currency code with display metadata.
///
/// ## Minor units
///
/// `minor_units()` returns how many decimal digits are shown for the
/// currency. Example: EUR has 2 minor units, so `10.5` renders as `10.50`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Currency {
    code: String,
}

impl Currency {
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
        }
    }

    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display symbol; unknown codes are shown as the code itself.
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self.code.as_str() {
            "USD" | "AUD" | "CAD" | "NZD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "CHF" => "CHF",
            other => other,
        }
    }

    /// Number of fraction digits used when formatting amounts.
    #[must_use]
    pub fn minor_units(&self) -> u32 {
        match self.code.as_str() {
            "JPY" => 0,
            _ => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Number formatting symbols for a locale tag such as `en-AU` or `fr_FR`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    decimal: &'static str,
    group: &'static str,
}

impl Locale {
    /// Parses a locale tag. `-` and `_` are both accepted as separator.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim().replace('_', "-");
        let lower = tag.to_ascii_lowercase();
        let language = lower.split('-').next().unwrap_or_default();

        let (decimal, group) = match lower.as_str() {
            "de-ch" => (".", "’"),
            _ => match language {
                "fr" => (",", "\u{a0}"),
                "de" | "it" | "es" | "nl" | "pt" => (",", "."),
                _ => (".", ","),
            },
        };

        Self {
            tag,
            decimal,
            group,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn decimal_symbol(&self) -> &'static str {
        self.decimal
    }

    #[must_use]
    pub fn group_symbol(&self) -> &'static str {
        self.group
    }

    /// Groups an unsigned digit string in threes, right to left.
    pub(crate) fn group_digits(&self, digits: &str) -> String {
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3 * self.group.len());
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push_str(self.group);
            }
            out.push(c);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_currencies() {
        assert_eq!(Currency::new("eur").symbol(), "€");
        assert_eq!(Currency::new("USD").symbol(), "$");
        assert_eq!(Currency::new("XTS").symbol(), "XTS");
        assert_eq!(Currency::new("JPY").minor_units(), 0);
        assert_eq!(Currency::new("AUD").minor_units(), 2);
    }

    #[test]
    fn locale_separators() {
        let fr = Locale::parse("fr_FR");
        assert_eq!(fr.tag(), "fr-FR");
        assert_eq!(fr.decimal_symbol(), ",");
        assert_eq!(Locale::parse("de-DE").group_symbol(), ".");
        assert_eq!(Locale::parse("de-CH").decimal_symbol(), ".");
        assert_eq!(Locale::parse("tlh").decimal_symbol(), ".");
    }

    #[test]
    fn groups_digits() {
        let en = Locale::parse("en-AU");
        assert_eq!(en.group_digits("1"), "1");
        assert_eq!(en.group_digits("123"), "123");
        assert_eq!(en.group_digits("1234"), "1,234");
        assert_eq!(en.group_digits("1234567"), "1,234,567");
    }
}
