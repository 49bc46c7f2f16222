//! The module contains the errors a summary can raise.
//!
//! Errors come in two families:
//!
//! - definition errors, raised while a [`Schema`] is being declared (see
//!   [`SummaryError::is_definition`]);
//! - resolution errors, raised the first time a bound element is accessed.
//!
//! The engine never retries or swallows an error: every variant reaches the
//! caller unchanged.
//!
//!  [`Schema`]: crate::Schema
use thiserror::Error;

/// Which object a `self.`/`model.` reference was looked up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Summary,
    Record,
    Item,
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Target::Summary => "summary",
            Target::Record => "record",
            Target::Item => "line item",
        })
    }
}

/// Summary custom errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummaryError {
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
    #[error("\"{0}\" already declared!")]
    DuplicateElement(String),
    #[error("Malformed reference: {0}")]
    MalformedReference(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("\"{0}\" element not found!")]
    UnknownElement(String),
    #[error("\"{name}\" is not an {expected} element")]
    WrongKind { name: String, expected: &'static str },
    #[error("\"{name}\" not found on {target}")]
    UnknownAttribute { target: Target, name: String },
    #[error("\"{0}\" collection not found on record")]
    UnknownCollection(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("\"{0}\" depends on itself")]
    Cycle(String),
    #[error("{0}")]
    Callable(String),
}

impl SummaryError {
    /// Returns `true` for errors raised while declaring a schema.
    #[must_use]
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey(_)
                | Self::DuplicateElement(_)
                | Self::MalformedReference(_)
                | Self::Config(_)
        )
    }
}

impl From<config::ConfigError> for SummaryError {
    fn from(err: config::ConfigError) -> Self {
        // serde reports `deny_unknown_fields` violations as "unknown field `x`, expected ..."
        let message = err.to_string();
        match message
            .split_once("unknown field `")
            .and_then(|(_, rest)| rest.split_once('`'))
        {
            Some((key, _)) => Self::UnknownKey(key.to_string()),
            None => Self::Config(message),
        }
    }
}
