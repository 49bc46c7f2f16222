//! Total elements and the aggregation algorithm.
//!
//! A total sums its sources, classified as:
//!
//! - **items**: every priced line of the collection, missing amounts as zero;
//! - **extras**: added when not negated and not included, subtracted when
//!   negated and included, ignored otherwise;
//! - **custom**: anything else, looked up on the summary. A declared total or
//!   a summary attribute contributes its value (negated when marked). A
//!   summary method decides the whole total: the first one reached is called
//!   and its result returned as is, without clamping or persisting.
//!
//! An empty source list means every items and every extra element, never
//! custom sources.
//!
//! Totals are not memoized: each access recomputes them and, when a
//! `model_cache` field is configured, writes the result onto the record.
use rust_decimal::Decimal;

use crate::{
    Arg, Bound, Callable, Element, ElementKind, FormattedAmount, Line, Record, ResultSummary,
    SummaryError, Target, Value,
};

/// Leading marker reversing the sign of a source.
pub const NEGATION_MARKER: char = '-';

/// Declaration of a total element.
///
/// ```rust
/// use commerce::TotalSpec;
///
/// let grand_total = TotalSpec::all().prevent_negative(true);
/// let pretax = TotalSpec::of(["items", "-tax"]).model_cache("pretax_total");
/// assert_eq!(pretax.sources(), ["items", "-tax"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TotalSpec {
    sources: Vec<String>,
    prevent_negative: bool,
    model_cache: Option<String>,
}

impl TotalSpec {
    /// Sums every items and extra element.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Sums the named sources; a leading `-` negates a source.
    #[must_use]
    pub fn of<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Clamps negative results to zero.
    #[must_use]
    pub fn prevent_negative(mut self, prevent_negative: bool) -> Self {
        self.prevent_negative = prevent_negative;
        self
    }

    /// Record field receiving the computed total on every access.
    #[must_use]
    pub fn model_cache(mut self, field: &str) -> Self {
        self.model_cache = Some(field.to_string());
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    #[must_use]
    pub fn prevents_negative(&self) -> bool {
        self.prevent_negative
    }

    #[must_use]
    pub fn model_cache_field(&self) -> Option<&str> {
        self.model_cache.as_deref()
    }

    pub(crate) fn validate(&self, name: &str) -> ResultSummary<()> {
        for source in &self.sources {
            let stripped = source.strip_prefix(NEGATION_MARKER).unwrap_or(source);
            if stripped.is_empty() {
                return Err(SummaryError::MalformedReference(format!(
                    "total '{name}': empty source name"
                )));
            }
        }
        if let Some(field) = &self.model_cache
            && field.is_empty()
        {
            return Err(SummaryError::Config(format!(
                "total '{name}': model_cache field name is empty"
            )));
        }
        Ok(())
    }

    /// Computes the total for one bound summary.
    pub(crate) fn compute<R: Record>(
        &self,
        name: &str,
        bound: &Bound<'_, R>,
    ) -> ResultSummary<FormattedAmount> {
        let sources = Sources::classify(self, bound);
        let mut total = Decimal::ZERO;

        for source in &sources.items {
            let lines = bound.items(source)?;
            let subtotal = lines
                .iter()
                .map(Line::amount_or_zero)
                .try_fold(Decimal::ZERO, |subtotal, amount| {
                    checked(name, subtotal.checked_add(amount))
                })?;
            tracing::debug!(total = name, source = *source, amount = %subtotal, "adding items to the total");
            total = checked(name, total.checked_add(subtotal))?;
        }

        for source in &sources.extras {
            let extra = bound.extra(source)?;
            let negated = sources.is_negated(source);
            let included = extra.included()?;
            if !negated && !included {
                let amount = extra.amount()?.value();
                tracing::debug!(total = name, source = *source, %amount, "adding extra to the total");
                total = checked(name, total.checked_add(amount))?;
            } else if negated && included {
                let amount = extra.amount()?.value();
                tracing::debug!(total = name, source = *source, %amount, "removing included extra from the total");
                total = checked(name, total.checked_sub(amount))?;
            }
        }

        for source in &sources.custom {
            match custom_source(bound, source)? {
                CustomSource::Callable(callable) => {
                    let value = callable
                        .invoke(bound, Arg::Summary)?
                        .to_decimal()?
                        .unwrap_or(Decimal::ZERO);
                    tracing::debug!(total = name, source = *source, %value, "custom source decides the total");
                    return Ok(bound.amount(value));
                }
                CustomSource::Value(value) => {
                    let amount = value.to_decimal()?.unwrap_or(Decimal::ZERO);
                    let amount = if sources.is_negated(source) {
                        -amount
                    } else {
                        amount
                    };
                    tracing::debug!(total = name, source = *source, %amount, "adding custom value to the total");
                    total = checked(name, total.checked_add(amount))?;
                }
            }
        }

        if self.prevent_negative && total < Decimal::ZERO {
            total = Decimal::ZERO;
        }

        if let Some(field) = &self.model_cache {
            tracing::debug!(total = name, field = %field, %total, "storing total on record");
            bound.record().store_total(field, total)?;
        }

        Ok(bound.amount(total))
    }
}

/// Source names split by category, declaration order kept, duplicates
/// dropped.
struct Sources<'s> {
    items: Vec<&'s str>,
    extras: Vec<&'s str>,
    custom: Vec<&'s str>,
    negated: Vec<&'s str>,
}

impl<'s> Sources<'s> {
    fn classify<R: Record>(spec: &'s TotalSpec, bound: &'s Bound<'_, R>) -> Self {
        let mut sources = Sources {
            items: Vec::new(),
            extras: Vec::new(),
            custom: Vec::new(),
            negated: Vec::new(),
        };

        if spec.sources.is_empty() {
            for (name, kind) in bound.schema().elements() {
                match kind {
                    ElementKind::Items => sources.items.push(name),
                    ElementKind::Extra => sources.extras.push(name),
                    ElementKind::Total => {}
                }
            }
            return sources;
        }

        for raw in &spec.sources {
            let name = match raw.strip_prefix(NEGATION_MARKER) {
                Some(stripped) => {
                    sources.negated.push(stripped);
                    stripped
                }
                None => raw.as_str(),
            };
            let bucket = match bound.schema().kind(name) {
                Some(ElementKind::Items) => &mut sources.items,
                Some(ElementKind::Extra) => &mut sources.extras,
                _ => &mut sources.custom,
            };
            if !bucket.contains(&name) {
                bucket.push(name);
            }
        }
        sources
    }

    fn is_negated(&self, name: &str) -> bool {
        self.negated.contains(&name)
    }
}

/// Maps an overflowing step of the sum to an error.
fn checked(name: &str, amount: Option<Decimal>) -> ResultSummary<Decimal> {
    amount.ok_or_else(|| SummaryError::InvalidValue(format!("total '{name}' is out of range")))
}

enum CustomSource<'a, R: Record> {
    Callable(&'a Callable<R>),
    Value(Value),
}

fn custom_source<'a, R: Record>(
    bound: &Bound<'a, R>,
    name: &str,
) -> ResultSummary<CustomSource<'a, R>> {
    let schema = bound.schema();
    if let Some(Element::Total(_)) = schema.element(name) {
        return Ok(CustomSource::Value(Value::Decimal(bound.total(name)?.value())));
    }
    if let Some(callable) = schema.method(name) {
        return Ok(CustomSource::Callable(callable));
    }
    if let Some(value) = schema.attribute(name) {
        return Ok(CustomSource::Value(value.clone()));
    }
    Err(SummaryError::UnknownAttribute {
        target: Target::Summary,
        name: name.to_string(),
    })
}
