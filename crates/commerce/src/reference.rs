//! Configured values that are resolved against a bound summary.
//!
//! A [`Reference`] is what a schema stores wherever an amount, a name or a
//! flag may be computed: a literal, `self.<name>` (looked up on the summary),
//! `model.<name>` (looked up on the record) or an application [`Callable`].
//!
//! Callables declare their arity when they are built. The engine picks the
//! call form from that declaration, so an error raised inside application
//! code is always propagated as-is and never mistaken for a signature
//! mismatch.
use std::{fmt, sync::Arc};

use crate::{Bound, LineItem, Record, ResultSummary, SummaryError, Target, Value};

/// Prefix naming an attribute or method of the bound summary.
pub const SUMMARY_PREFIX: &str = "self.";
/// Prefix naming an attribute of the underlying record.
pub const RECORD_PREFIX: &str = "model.";

/// The natural argument handed to a unary callable.
///
/// - extras and bind-time context: the record;
/// - per-item amounts: the line item being priced;
/// - custom total sources: the summary itself (already the first argument).
pub enum Arg<'a, R: Record> {
    Record(&'a R),
    Item(&'a R::Item),
    Summary,
}

impl<R: Record> Clone for Arg<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Record> Copy for Arg<'_, R> {}

impl<'a, R: Record> Arg<'a, R> {
    /// The line item, when resolving a per-item amount.
    #[must_use]
    pub fn item(self) -> Option<&'a R::Item> {
        match self {
            Arg::Item(item) => Some(item),
            _ => None,
        }
    }

    /// The record, when resolving an extra or the bind-time context.
    #[must_use]
    pub fn record(self) -> Option<&'a R> {
        match self {
            Arg::Record(record) => Some(record),
            _ => None,
        }
    }
}

type NullaryFn<R> = dyn Fn(&Bound<'_, R>) -> ResultSummary<Value> + Send + Sync;
type UnaryFn<R> = dyn Fn(&Bound<'_, R>, Arg<'_, R>) -> ResultSummary<Value> + Send + Sync;

/// Application logic attached to a schema.
///
/// Every callable receives the bound summary, the way a method receives
/// `self`. Unary callables also receive the natural [`Arg`] of the context
/// they are resolved in.
pub enum Callable<R: Record> {
    Nullary(Arc<NullaryFn<R>>),
    Unary(Arc<UnaryFn<R>>),
}

impl<R: Record + 'static> Callable<R> {
    /// Wraps a callable taking only the bound summary.
    pub fn nullary<F, V>(f: F) -> Self
    where
        F: Fn(&Bound<'_, R>) -> ResultSummary<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::Nullary(Arc::new(move |bound: &Bound<'_, R>| {
            f(bound).map(Into::<Value>::into)
        }))
    }

    /// Wraps a callable taking the bound summary and the natural argument.
    pub fn unary<F, V>(f: F) -> Self
    where
        F: Fn(&Bound<'_, R>, Arg<'_, R>) -> ResultSummary<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::Unary(Arc::new(move |bound: &Bound<'_, R>, arg: Arg<'_, R>| {
            f(bound, arg).map(Into::<Value>::into)
        }))
    }
}

impl<R: Record> Callable<R> {
    /// Number of parameters besides the bound summary.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Callable::Nullary(_) => 0,
            Callable::Unary(_) => 1,
        }
    }

    /// Calls with the natural argument when the callable declares one.
    pub fn invoke(&self, bound: &Bound<'_, R>, arg: Arg<'_, R>) -> ResultSummary<Value> {
        match self {
            Callable::Nullary(f) => f(bound),
            Callable::Unary(f) => f(bound, arg),
        }
    }
}

impl<R: Record> Clone for Callable<R> {
    fn clone(&self) -> Self {
        match self {
            Callable::Nullary(f) => Callable::Nullary(Arc::clone(f)),
            Callable::Unary(f) => Callable::Unary(Arc::clone(f)),
        }
    }
}

impl<R: Record> fmt::Debug for Callable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable(arity = {})", self.arity())
    }
}

/// A value that is resolved at the moment it is needed.
pub enum Reference<R: Record> {
    Literal(Value),
    /// `self.<name>`
    Summary(String),
    /// `model.<name>`
    Record(String),
    Callable(Callable<R>),
}

impl<R: Record> Reference<R> {
    /// Parses a configured string. Prefixed strings become lookups, anything
    /// else stays a literal.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some(name) = text.strip_prefix(SUMMARY_PREFIX) {
            Reference::Summary(name.to_string())
        } else if let Some(name) = text.strip_prefix(RECORD_PREFIX) {
            Reference::Record(name.to_string())
        } else {
            Reference::Literal(Value::Text(text.to_string()))
        }
    }

    /// Parses a string that must name a summary or record attribute.
    pub fn lookup(text: &str) -> ResultSummary<Self> {
        match Self::parse(text) {
            Reference::Literal(_) => Err(SummaryError::MalformedReference(format!(
                "{text:?} must start with either '{SUMMARY_PREFIX}' or '{RECORD_PREFIX}'"
            ))),
            Reference::Summary(name) | Reference::Record(name) if name.is_empty() => Err(
                SummaryError::MalformedReference(format!("{text:?} names no attribute")),
            ),
            reference => Ok(reference),
        }
    }

    /// Resolves the reference into a concrete value.
    ///
    /// `model.<name>` is looked up on the line item when one is being priced,
    /// on the record otherwise.
    pub fn resolve(&self, bound: &Bound<'_, R>, arg: Arg<'_, R>) -> ResultSummary<Value> {
        match self {
            Reference::Literal(value) => Ok(value.clone()),
            Reference::Summary(name) => bound.lookup(name, arg),
            Reference::Record(name) => match arg {
                Arg::Item(item) => item
                    .attribute(name)?
                    .ok_or_else(|| SummaryError::UnknownAttribute {
                        target: Target::Item,
                        name: name.clone(),
                    }),
                _ => bound
                    .record()
                    .attribute(name)
                    .ok_or_else(|| SummaryError::UnknownAttribute {
                        target: Target::Record,
                        name: name.clone(),
                    }),
            },
            Reference::Callable(callable) => callable.invoke(bound, arg),
        }
    }
}

impl<R: Record> Clone for Reference<R> {
    fn clone(&self) -> Self {
        match self {
            Reference::Literal(value) => Reference::Literal(value.clone()),
            Reference::Summary(name) => Reference::Summary(name.clone()),
            Reference::Record(name) => Reference::Record(name.clone()),
            Reference::Callable(callable) => Reference::Callable(callable.clone()),
        }
    }
}

impl<R: Record> fmt::Debug for Reference<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Literal(value) => write!(f, "Literal({value:?})"),
            Reference::Summary(name) => write!(f, "{SUMMARY_PREFIX}{name}"),
            Reference::Record(name) => write!(f, "{RECORD_PREFIX}{name}"),
            Reference::Callable(callable) => fmt::Debug::fmt(callable, f),
        }
    }
}

impl<R: Record> From<&str> for Reference<R> {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl<R: Record> From<Value> for Reference<R> {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(text) => Self::parse(&text),
            other => Reference::Literal(other),
        }
    }
}

impl<R: Record> From<rust_decimal::Decimal> for Reference<R> {
    fn from(value: rust_decimal::Decimal) -> Self {
        Reference::Literal(Value::Decimal(value))
    }
}

impl<R: Record> From<bool> for Reference<R> {
    fn from(value: bool) -> Self {
        Reference::Literal(Value::Bool(value))
    }
}

impl<R: Record> From<Callable<R>> for Reference<R> {
    fn from(value: Callable<R>) -> Self {
        Reference::Callable(value)
    }
}
