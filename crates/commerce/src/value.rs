use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ResultSummary, SummaryError};

/// A concrete value produced by resolving a reference.
///
/// Configuration documents and application callables both speak this type,
/// so it stays deliberately small. Strings that parse as decimals are
/// accepted wherever an amount is expected (`"10.03"` is a valid amount).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Decimal(Decimal),
    Text(String),
}

impl Value {
    /// Interprets the value as an amount. `Null` is "no amount".
    pub fn to_decimal(&self) -> ResultSummary<Option<Decimal>> {
        match self {
            Value::Null => Ok(None),
            Value::Decimal(d) => Ok(Some(*d)),
            Value::Text(s) => Decimal::from_str(s.trim())
                .map(Some)
                .map_err(|_| SummaryError::InvalidValue(format!("not an amount: {s:?}"))),
            Value::Bool(b) => Err(SummaryError::InvalidValue(format!(
                "not an amount: {b}"
            ))),
        }
    }

    /// Truthiness: null, `false`, zero and the empty string are false.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Decimal(d) => !d.is_zero(),
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Textual form, `None` for null.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<Option<Decimal>> for Value {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Value::Null, Value::Decimal)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Decimal(Decimal::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn text_amounts_parse() {
        assert_eq!(
            Value::from("10.03").to_decimal().unwrap(),
            Some(dec!(10.03))
        );
        assert_eq!(Value::Null.to_decimal().unwrap(), None);
        assert!(Value::from("ten").to_decimal().is_err());
        assert!(Value::from(true).to_decimal().is_err());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::from(dec!(0.00)).truthy());
        assert!(Value::from(dec!(0.01)).truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("no").truthy());
    }

    #[test]
    fn deserializes_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 1.5, "12.30", "GST"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Decimal(dec!(1.5)),
                Value::Decimal(dec!(12.30)),
                Value::Text("GST".to_string()),
            ]
        );
    }
}
