//! A schema bound to one record.
//!
//! [`Bound`] owns everything that lives for a single access to a record: the
//! locale/currency context (resolved once, when binding), the memoized items
//! sequences and the stack of elements being resolved. None of it is shared:
//! a `Bound` is neither `Send` nor `Sync`, and every access path builds its
//! own.
use std::{cell::RefCell, collections::HashMap, rc::Rc, sync::Arc};

use rust_decimal::Decimal;

use crate::{
    Arg, Context, Currency, Element, ElementKind, ExtraView, FormattedAmount, Line, Locale,
    Record, ResolvedExtra, ResultSummary, Schema, SummaryError, Target, Value,
};

/// The resolved form of one element.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<I> {
    Items(Rc<[Line<I>]>),
    Extra(ResolvedExtra),
    Total(FormattedAmount),
}

/// A summary bound to one record.
///
/// # Examples
///
/// ```rust
/// use commerce::{ExtraSpec, ItemsSpec, Schema, TotalSpec, memory::{MemoryItem, MemoryRecord}};
///
/// let schema = Schema::<MemoryRecord>::builder()
///     .items("items", ItemsSpec::new().amount_from("model.amount"))
///     .extra("delivery", ExtraSpec::new().amount("10.00"))
///     .total("total", TotalSpec::all())
///     .build()
///     .unwrap();
/// let cart = MemoryRecord::new().with_collection(
///     "items",
///     vec![MemoryItem::new("1", "Guitar").with("amount", "329.42")],
/// );
///
/// let summary = schema.bind(&cart).unwrap();
/// assert_eq!(summary.total("total").unwrap().to_string(), "339.42");
/// ```
pub struct Bound<'a, R: Record> {
    schema: &'a Schema<R>,
    record: &'a R,
    context: Arc<Context>,
    items: RefCell<HashMap<String, Rc<[Line<R::Item>]>>>,
    resolving: RefCell<Vec<String>>,
}

impl<'a, R: Record> Bound<'a, R> {
    /// Binds `schema` to `record`, resolving the locale/currency context.
    pub fn new(schema: &'a Schema<R>, record: &'a R) -> ResultSummary<Self> {
        Self::bind(schema, record, None)
    }

    /// Binds with a locale that wins over the schema's.
    pub fn with_locale(schema: &'a Schema<R>, record: &'a R, locale: &str) -> ResultSummary<Self> {
        Self::bind(schema, record, Some(locale))
    }

    fn bind(schema: &'a Schema<R>, record: &'a R, locale: Option<&str>) -> ResultSummary<Self> {
        let mut bound = Self {
            schema,
            record,
            context: Arc::new(Context::default()),
            items: RefCell::new(HashMap::new()),
            resolving: RefCell::new(Vec::new()),
        };
        let context = bound.resolve_context(locale)?;
        tracing::debug!(
            locale = context.locale.tag(),
            currency = context.currency.as_ref().map(Currency::code),
            "summary bound"
        );
        bound.context = Arc::new(context);
        Ok(bound)
    }

    fn resolve_context(&self, locale: Option<&str>) -> ResultSummary<Context> {
        let mut context = Context::default();
        let arg = Arg::Record(self.record);

        if let Some(tag) = locale {
            context.locale = Locale::parse(tag);
        } else if let Some(reference) = self.schema.locale()
            && let Some(tag) = reference.resolve(self, arg)?.to_text()
        {
            context.locale = Locale::parse(&tag);
        }

        if let Some(reference) = self.schema.currency()
            && let Some(code) = reference.resolve(self, arg)?.to_text()
            && !code.is_empty()
        {
            context.currency = Some(Currency::new(&code));
        }

        if let Some(reference) = self.schema.decimal_html()
            && let Some(template) = reference.resolve(self, arg)?.to_text()
        {
            context.decimal_html = template;
        }

        Ok(context)
    }

    #[must_use]
    pub fn schema(&self) -> &'a Schema<R> {
        self.schema
    }

    #[must_use]
    pub fn record(&self) -> &'a R {
        self.record
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Wraps a value in this binding's context.
    #[must_use]
    pub fn amount(&self, value: Decimal) -> FormattedAmount {
        FormattedAmount::new(value, Arc::clone(&self.context))
    }

    /// The priced lines of an items element.
    ///
    /// Fetched and priced on first access only: later calls hand back the
    /// same sequence, whatever happened to the record meanwhile.
    pub fn items(&self, name: &str) -> ResultSummary<Rc<[Line<R::Item>]>> {
        let (key, element) = self.entry(name)?;
        let Element::Items(items) = element else {
            return Err(SummaryError::WrongKind {
                name: key.to_string(),
                expected: "items",
            });
        };

        if let Some(lines) = self.items.borrow().get(key) {
            tracing::trace!(element = key, "items served from cache");
            return Ok(Rc::clone(lines));
        }

        let lines: Rc<[Line<R::Item>]> = self.guard(key, || items.fetch(key, self))?.into();
        self.items
            .borrow_mut()
            .insert(key.to_string(), Rc::clone(&lines));
        Ok(lines)
    }

    /// A view on an extra element; facets resolve on every call.
    pub fn extra<'b>(&'b self, name: &str) -> ResultSummary<ExtraView<'b, R>> {
        let (key, element) = self.entry(name)?;
        match element {
            Element::Extra(extra) => Ok(ExtraView::new(self, key, extra)),
            _ => Err(SummaryError::WrongKind {
                name: key.to_string(),
                expected: "extra",
            }),
        }
    }

    /// Computes a total element. Never memoized.
    pub fn total(&self, name: &str) -> ResultSummary<FormattedAmount> {
        let (key, element) = self.entry(name)?;
        match element {
            Element::Total(spec) => self.guard(key, || spec.compute(key, self)),
            _ => Err(SummaryError::WrongKind {
                name: key.to_string(),
                expected: "total",
            }),
        }
    }

    /// Resolves any element by name.
    pub fn get(&self, name: &str) -> ResultSummary<Resolved<R::Item>> {
        match self.schema.kind(name) {
            Some(ElementKind::Items) => self.items(name).map(Resolved::Items),
            Some(ElementKind::Extra) => self.extra(name)?.snapshot().map(Resolved::Extra),
            Some(ElementKind::Total) => self.total(name).map(Resolved::Total),
            None => Err(SummaryError::UnknownElement(name.to_string())),
        }
    }

    /// Every element, resolved, in declaration order.
    pub fn resolved_elements(&self) -> ResultSummary<Vec<(&'a str, ElementKind, Resolved<R::Item>)>> {
        self.schema
            .elements()
            .map(|(name, kind)| Ok((name, kind, self.get(name)?)))
            .collect()
    }

    /// Resolves `self.<name>`.
    ///
    /// Looks at declared totals (their value), declared extras (their amount),
    /// registered methods (invoked with `arg`) and registered attributes, in
    /// that order.
    pub fn lookup(&self, name: &str, arg: Arg<'_, R>) -> ResultSummary<Value> {
        match self.schema.kind(name) {
            Some(ElementKind::Total) => return Ok(Value::Decimal(self.total(name)?.value())),
            Some(ElementKind::Extra) => {
                return Ok(Value::Decimal(self.extra(name)?.amount()?.value()));
            }
            Some(ElementKind::Items) => {
                return Err(SummaryError::WrongKind {
                    name: name.to_string(),
                    expected: "extra or total",
                });
            }
            None => {}
        }
        if let Some(callable) = self.schema.method(name) {
            return self.guard(name, || callable.invoke(self, arg));
        }
        if let Some(value) = self.schema.attribute(name) {
            return Ok(value.clone());
        }
        Err(SummaryError::UnknownAttribute {
            target: Target::Summary,
            name: name.to_string(),
        })
    }

    fn entry(&self, name: &str) -> ResultSummary<(&'a str, &'a Element<R>)> {
        self.schema
            .element_entry(name)
            .ok_or_else(|| SummaryError::UnknownElement(name.to_string()))
    }

    /// Runs `f` with `name` marked as being resolved, failing with
    /// [`SummaryError::Cycle`] when `name` is already on the stack.
    pub(crate) fn guard<T>(
        &self,
        name: &str,
        f: impl FnOnce() -> ResultSummary<T>,
    ) -> ResultSummary<T> {
        if self.resolving.borrow().iter().any(|resolving| resolving == name) {
            return Err(SummaryError::Cycle(name.to_string()));
        }
        self.resolving.borrow_mut().push(name.to_string());
        let result = f();
        self.resolving.borrow_mut().pop();
        result
    }
}

impl<R: Record> std::fmt::Debug for Bound<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bound")
            .field("context", &self.context)
            .field("cached", &self.items.borrow().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        Callable, ExtraSpec, ItemsSpec, TotalSpec,
        memory::{MemoryItem, MemoryRecord},
    };

    fn cart() -> MemoryRecord {
        MemoryRecord::new()
            .with_attribute("country", "AU")
            .with_collection(
                "items",
                vec![
                    MemoryItem::new("1", "Guitar").with("amount", "329.42"),
                    MemoryItem::new("2", "Strings").with("amount", "4.48"),
                ],
            )
    }

    #[test]
    fn context_resolves_once_at_bind_time() {
        let schema = Schema::<MemoryRecord>::builder()
            .locale("self.get_locale")
            .currency("AUD")
            .method(
                "get_locale",
                Callable::unary(|_, arg| {
                    let country = arg
                        .record()
                        .and_then(|record: &MemoryRecord| record.attribute("country"))
                        .and_then(|value| value.to_text())
                        .unwrap_or_default();
                    Ok(format!("en-{country}"))
                }),
            )
            .build()
            .unwrap();
        let record = cart();

        let bound = schema.bind(&record).unwrap();
        assert_eq!(bound.context().locale.tag(), "en-AU");
        assert_eq!(bound.context().currency, Some(Currency::new("AUD")));

        let bound = Bound::with_locale(&schema, &record, "de-DE").unwrap();
        assert_eq!(bound.amount(dec!(1234.5)).to_string(), "$1.234,50");
    }

    #[test]
    fn items_are_memoized_per_binding() {
        let schema = Schema::<MemoryRecord>::builder()
            .items("items", ItemsSpec::new().amount_from("model.amount"))
            .build()
            .unwrap();
        let record = cart();
        let bound = schema.bind(&record).unwrap();

        let first = bound.items("items").unwrap();
        record.push("items", MemoryItem::new("3", "Pick").with("amount", "1.00"));
        let second = bound.items("items").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);

        let fresh = schema.bind(&record).unwrap();
        assert_eq!(fresh.items("items").unwrap().len(), 3);
    }

    #[test]
    fn lookup_order() {
        let schema = Schema::<MemoryRecord>::builder()
            .extra("delivery", ExtraSpec::new().amount("10.00"))
            .total("total", TotalSpec::of(["delivery"]))
            .method("get_discount", Callable::nullary(|_| Ok("-1.50")))
            .attribute("label", "Cart")
            .build()
            .unwrap();
        let record = MemoryRecord::new();
        let bound = schema.bind(&record).unwrap();

        assert_eq!(
            bound.lookup("total", Arg::Summary).unwrap(),
            Value::Decimal(dec!(10.00))
        );
        assert_eq!(
            bound.lookup("delivery", Arg::Summary).unwrap(),
            Value::Decimal(dec!(10.00))
        );
        assert_eq!(
            bound.lookup("get_discount", Arg::Summary).unwrap(),
            Value::from("-1.50")
        );
        assert_eq!(bound.lookup("label", Arg::Summary).unwrap(), Value::from("Cart"));
        assert_eq!(
            bound.lookup("missing", Arg::Summary).unwrap_err(),
            SummaryError::UnknownAttribute {
                target: Target::Summary,
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn wrong_kind_and_unknown_elements() {
        let schema = Schema::<MemoryRecord>::builder()
            .extra("delivery", ExtraSpec::new().amount("10.00"))
            .build()
            .unwrap();
        let record = MemoryRecord::new();
        let bound = schema.bind(&record).unwrap();

        assert_eq!(
            bound.total("delivery").unwrap_err(),
            SummaryError::WrongKind {
                name: "delivery".to_string(),
                expected: "total"
            }
        );
        assert_eq!(
            bound.items("nope").unwrap_err(),
            SummaryError::UnknownElement("nope".to_string())
        );
    }

    #[test]
    #[should_panic(expected = "Cycle(\"delivery\")")]
    fn fail_self_referencing_extra() {
        let schema = Schema::<MemoryRecord>::builder()
            .extra("delivery", ExtraSpec::new().amount("self.delivery"))
            .build()
            .unwrap();
        let record = MemoryRecord::new();
        let bound = schema.bind(&record).unwrap();
        bound.extra("delivery").unwrap().amount().unwrap();
    }
}
