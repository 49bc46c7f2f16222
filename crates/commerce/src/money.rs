use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
    sync::Arc,
};

use rust_decimal::Decimal;

use crate::currency::{Currency, Locale};

/// Locale used when neither the binding nor the schema names one.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Markup used by [`FormattedAmount::html`] when the schema sets none.
pub const DEFAULT_DECIMAL_HTML: &str = concat!(
    r#"<span class="money">"#,
    r#"<span class="currency">{curr_sym}</span>{major}"#,
    r#"<span class="cents">{decimal_sym}{minor}</span>"#,
    "</span>"
);

/// Locale/currency context resolved once per bound summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub locale: Locale,
    pub currency: Option<Currency>,
    pub decimal_html: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            locale: Locale::parse(DEFAULT_LOCALE),
            currency: None,
            decimal_html: DEFAULT_DECIMAL_HTML.to_string(),
        }
    }
}

impl Context {
    fn minor_units(&self) -> u32 {
        self.currency.as_ref().map_or(2, Currency::minor_units)
    }
}

/// Display components of a formatted amount.
///
/// For `1234.56` in `en-AU` with `AUD`:
///
/// | field         | value      |
/// |---------------|------------|
/// | `value`       | `1,234.56` |
/// | `curr_sym`    | `$`        |
/// | `decimal_sym` | `.`        |
/// | `group_sym`   | `,`        |
/// | `major`       | `1,234`    |
/// | `minor`       | `56`       |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Elements {
    pub value: String,
    pub curr_sym: String,
    pub decimal_sym: String,
    pub group_sym: String,
    pub major: String,
    pub minor: String,
}

/// A decimal amount carrying the locale/currency context it is shown in.
///
/// Arithmetic drops the context and yields a plain [`Decimal`]; comparisons
/// look at the value only.
///
/// # Examples
///
/// ```rust
/// use commerce::{Context, Currency, FormattedAmount, Locale};
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let context = Arc::new(Context {
///     locale: Locale::parse("en-AU"),
///     currency: Some(Currency::new("AUD")),
///     ..Context::default()
/// });
/// let amount = FormattedAmount::new(Decimal::new(123456, 2), context);
/// assert_eq!(amount.to_string(), "$1,234.56");
/// assert_eq!(amount.elements().major, "1,234");
/// ```
#[derive(Clone, Debug)]
pub struct FormattedAmount {
    value: Decimal,
    context: Arc<Context>,
}

impl FormattedAmount {
    #[must_use]
    pub fn new(value: Decimal, context: Arc<Context>) -> Self {
        Self { value, context }
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.value
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The unformatted decimal, as `Decimal` prints it.
    #[must_use]
    pub fn raw(&self) -> String {
        self.value.to_string()
    }

    /// Fixed-point text with exactly two decimals and no grouping.
    #[must_use]
    pub fn fixed(&self) -> String {
        fixed(self.value, 2)
    }

    #[must_use]
    pub fn elements(&self) -> Elements {
        let locale = &self.context.locale;
        let places = self.context.minor_units();
        let plain = fixed(self.value.abs(), places);
        let (int_part, minor) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

        let rounded = self.value.round_dp(places);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let major = format!("{sign}{}", locale.group_digits(int_part));
        let decimal_sym = locale.decimal_symbol().to_string();
        let value = if minor.is_empty() {
            major.clone()
        } else {
            format!("{major}{decimal_sym}{minor}")
        };
        let curr_sym = match &self.context.currency {
            Some(currency) => currency.symbol().to_string(),
            None => String::new(),
        };

        Elements {
            value,
            curr_sym,
            decimal_sym,
            group_sym: locale.group_symbol().to_string(),
            major,
            minor: minor.to_string(),
        }
    }

    /// Marked-up amount built from the context's decimal template.
    ///
    /// Currencies without minor units leave `{decimal_sym}` empty too.
    #[must_use]
    pub fn html(&self) -> String {
        let e = self.elements();
        let decimal_sym = if e.minor.is_empty() {
            ""
        } else {
            e.decimal_sym.as_str()
        };
        self.context
            .decimal_html
            .replace("{curr_sym}", &e.curr_sym)
            .replace("{decimal_sym}", decimal_sym)
            .replace("{group_sym}", &e.group_sym)
            .replace("{major}", &e.major)
            .replace("{minor}", &e.minor)
            .replace("{value}", &e.value)
    }

    /// Like `Display`, without a zero minor part (`$12.00` becomes `$12`).
    #[must_use]
    pub fn short(&self) -> String {
        let e = self.elements();
        if e.minor.chars().all(|c| c == '0') {
            format_with_symbol(&e.curr_sym, &e.major)
        } else {
            self.to_string()
        }
    }
}

/// Rounds half-even and pads to exactly `places` decimals. Amounts rounding
/// to zero lose their sign.
pub(crate) fn fixed(value: Decimal, places: u32) -> String {
    let mut rounded = value.round_dp(places);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(places);
    rounded.to_string()
}

fn format_with_symbol(curr_sym: &str, number: &str) -> String {
    match number.strip_prefix('-') {
        Some(abs) => format!("-{curr_sym}{abs}"),
        None => format!("{curr_sym}{number}"),
    }
}

impl fmt::Display for FormattedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.elements();
        f.write_str(&format_with_symbol(&e.curr_sym, &e.value))
    }
}

impl From<FormattedAmount> for Decimal {
    fn from(value: FormattedAmount) -> Self {
        value.value
    }
}

impl PartialEq for FormattedAmount {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<Decimal> for FormattedAmount {
    fn eq(&self, other: &Decimal) -> bool {
        self.value == *other
    }
}

impl PartialOrd<Decimal> for FormattedAmount {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        self.value.partial_cmp(other)
    }
}

impl Neg for FormattedAmount {
    type Output = Decimal;

    fn neg(self) -> Self::Output {
        -self.value
    }
}

macro_rules! decimal_op {
    ($trait:ident, $method:ident) => {
        impl $trait<Decimal> for FormattedAmount {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Self::Output {
                self.value.$method(rhs)
            }
        }

        impl $trait<FormattedAmount> for FormattedAmount {
            type Output = Decimal;

            fn $method(self, rhs: FormattedAmount) -> Self::Output {
                self.value.$method(rhs.value)
            }
        }
    };
}

decimal_op!(Add, add);
decimal_op!(Sub, sub);
decimal_op!(Mul, mul);
decimal_op!(Div, div);

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn context(locale: &str, currency: Option<&str>) -> Arc<Context> {
        Arc::new(Context {
            locale: Locale::parse(locale),
            currency: currency.map(Currency::new),
            ..Context::default()
        })
    }

    #[test]
    fn display_uses_locale_and_symbol() {
        let amount = FormattedAmount::new(dec!(1234567.891), context("en-US", Some("USD")));
        assert_eq!(amount.to_string(), "$1,234,567.89");

        let amount = FormattedAmount::new(dec!(-1234.5), context("de-DE", Some("EUR")));
        assert_eq!(amount.to_string(), "-€1.234,50");

        let amount = FormattedAmount::new(dec!(12), context("en-US", None));
        assert_eq!(amount.to_string(), "12.00");
    }

    #[test]
    fn elements_split_major_and_minor() {
        let amount = FormattedAmount::new(dec!(1234.56), context("fr-FR", Some("EUR")));
        let e = amount.elements();
        assert_eq!(e.major, "1\u{a0}234");
        assert_eq!(e.minor, "56");
        assert_eq!(e.decimal_sym, ",");
        assert_eq!(e.curr_sym, "€");
    }

    #[test]
    fn zero_minor_units_have_no_fraction() {
        let amount = FormattedAmount::new(dec!(1500.4), context("en-US", Some("JPY")));
        assert_eq!(amount.to_string(), "¥1,500");
        assert_eq!(amount.elements().minor, "");
    }

    #[test]
    fn html_fills_the_template() {
        let amount = FormattedAmount::new(dec!(123.45), context("en-AU", Some("AUD")));
        assert_eq!(
            amount.html(),
            r#"<span class="money"><span class="currency">$</span>123<span class="cents">.45</span></span>"#
        );
    }

    #[test]
    fn html_without_minor_units_has_no_decimal_symbol() {
        let amount = FormattedAmount::new(dec!(1500.4), context("en-US", Some("JPY")));
        assert_eq!(
            amount.html(),
            r#"<span class="money"><span class="currency">¥</span>1,500<span class="cents"></span></span>"#
        );
    }

    #[test]
    fn amounts_rounding_to_zero_are_unsigned() {
        let amount = FormattedAmount::new(dec!(-0.001), context("en-US", Some("USD")));
        assert_eq!(amount.to_string(), "$0.00");
        assert_eq!(amount.elements().major, "0");
        assert_eq!(amount.fixed(), "0.00");
        assert_eq!(fixed(dec!(-0.004), 2), "0.00");
        assert_eq!(fixed(dec!(-0.005), 2), "0.00");
        assert_eq!(fixed(dec!(-0.006), 2), "-0.01");
    }

    #[test]
    fn short_drops_zero_cents() {
        let ctx = context("en-US", Some("USD"));
        assert_eq!(FormattedAmount::new(dec!(12.00), ctx.clone()).short(), "$12");
        assert_eq!(FormattedAmount::new(dec!(12.50), ctx).short(), "$12.50");
    }

    #[test]
    fn arithmetic_yields_decimals() {
        let ctx = context("en-US", None);
        let a = FormattedAmount::new(dec!(2350.59), ctx.clone());
        assert_eq!((a.clone() / dec!(10)).round_dp(2), dec!(235.06));
        assert_eq!(a.clone() + FormattedAmount::new(dec!(0.41), ctx), dec!(2351.00));
        assert_eq!(-a, dec!(-2350.59));
    }

    #[test]
    fn fixed_pads_and_rounds() {
        assert_eq!(fixed(dec!(10), 2), "10.00");
        assert_eq!(fixed(dec!(2016.690), 2), "2016.69");
        assert_eq!(fixed(dec!(-12.23), 2), "-12.23");
    }
}
