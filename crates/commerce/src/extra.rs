//! Extra elements: a single named adjustment such as tax, delivery or a
//! discount.
//!
//! An extra only describes itself. Whether its amount is added to, left out
//! of or removed from a total is decided by the total (see [`TotalSpec`](crate::TotalSpec)).
use rust_decimal::Decimal;

use crate::{Arg, Bound, FormattedAmount, Record, Reference, ResultSummary, Value};

/// Declaration of an extra element. Every facet may be a literal, a
/// `self.`/`model.` string or a callable.
///
/// ```rust
/// use commerce::{ExtraSpec, memory::MemoryRecord};
///
/// let tax = ExtraSpec::<MemoryRecord>::new()
///     .verbose_name("GST")
///     .amount("10.03")
///     .description("15%")
///     .included(true);
/// ```
pub struct ExtraSpec<R: Record> {
    verbose_name: Option<Reference<R>>,
    amount: Option<Reference<R>>,
    description: Option<Reference<R>>,
    included: Reference<R>,
}

impl<R: Record> Default for ExtraSpec<R> {
    fn default() -> Self {
        Self {
            verbose_name: None,
            amount: None,
            description: None,
            included: Reference::Literal(Value::Bool(false)),
        }
    }
}

impl<R: Record> ExtraSpec<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to the humanized element name ("my_commission" → "My commission").
    #[must_use]
    pub fn verbose_name(mut self, verbose_name: impl Into<Reference<R>>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    /// Defaults to `self.get_amount_<name>`.
    #[must_use]
    pub fn amount(mut self, amount: impl Into<Reference<R>>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<Reference<R>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the amount as already priced into the items.
    #[must_use]
    pub fn included(mut self, included: impl Into<Reference<R>>) -> Self {
        self.included = included.into();
        self
    }

    pub(crate) fn register(self, name: &str) -> Extra<R> {
        Extra {
            verbose_name: self
                .verbose_name
                .unwrap_or_else(|| Reference::Literal(Value::Text(humanize(name)))),
            amount: self
                .amount
                .unwrap_or_else(|| Reference::Summary(format!("get_amount_{name}"))),
            description: self
                .description
                .unwrap_or(Reference::Literal(Value::Null)),
            included: self.included,
        }
    }
}

/// A registered extra element, defaults filled in.
pub struct Extra<R: Record> {
    verbose_name: Reference<R>,
    amount: Reference<R>,
    description: Reference<R>,
    included: Reference<R>,
}

impl<R: Record> std::fmt::Debug for Extra<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extra")
            .field("verbose_name", &self.verbose_name)
            .field("amount", &self.amount)
            .field("description", &self.description)
            .field("included", &self.included)
            .finish()
    }
}

/// An extra bound to a summary. Facets are resolved on every call.
pub struct ExtraView<'b, R: Record> {
    bound: &'b Bound<'b, R>,
    name: &'b str,
    extra: &'b Extra<R>,
}

impl<'b, R: Record> ExtraView<'b, R> {
    pub(crate) fn new(bound: &'b Bound<'b, R>, name: &'b str, extra: &'b Extra<R>) -> Self {
        Self { bound, name, extra }
    }

    fn resolve(&self, reference: &Reference<R>) -> ResultSummary<Value> {
        reference.resolve(self.bound, Arg::Record(self.bound.record()))
    }

    #[must_use]
    pub fn name(&self) -> &'b str {
        self.name
    }

    pub fn verbose_name(&self) -> ResultSummary<String> {
        Ok(self.resolve(&self.extra.verbose_name)?.to_text().unwrap_or_default())
    }

    pub fn description(&self) -> ResultSummary<Option<String>> {
        Ok(self.resolve(&self.extra.description)?.to_text())
    }

    /// The amount; a null amount counts as zero.
    pub fn amount(&self) -> ResultSummary<FormattedAmount> {
        let value = self.bound.guard(self.name, || {
            self.resolve(&self.extra.amount)?.to_decimal()
        })?;
        Ok(self.bound.amount(value.unwrap_or(Decimal::ZERO)))
    }

    pub fn included(&self) -> ResultSummary<bool> {
        Ok(self.resolve(&self.extra.included)?.truthy())
    }

    /// Resolves all four facets at once.
    pub fn snapshot(&self) -> ResultSummary<ResolvedExtra> {
        Ok(ResolvedExtra {
            verbose_name: self.verbose_name()?,
            description: self.description()?,
            amount: self.amount()?,
            included: self.included()?,
        })
    }
}

/// The four facets of an extra, resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedExtra {
    pub verbose_name: String,
    pub description: Option<String>,
    pub amount: FormattedAmount,
    pub included: bool,
}

impl ResolvedExtra {
    /// Verbose name followed by the description in brackets, if any.
    #[must_use]
    pub fn label(&self) -> String {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() => {
                format!("{} ({description})", self.verbose_name)
            }
            _ => self.verbose_name.clone(),
        }
    }
}

/// `"items_pretax"` → `"Items pretax"`.
pub(crate) fn humanize(name: &str) -> String {
    let words = name.split('_').collect::<Vec<_>>().join(" ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
