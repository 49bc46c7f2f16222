//! Schema registry: the ordered, immutable definition of a summary.
//!
//! A [`Schema`] is declared once through [`SchemaBuilder`] and shared by every
//! summary bound from it. Elements keep the order they were declared in; that
//! order is what rendering and introspection see.
use indexmap::IndexMap;

use crate::{
    Bound, Callable, ExtraSpec, ItemsSpec, Record, Reference, ResultSummary, SummaryError,
    TotalSpec, Value,
    extra::Extra,
    items::Items,
};

/// Category of a declared element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Items,
    Extra,
    Total,
}

impl ElementKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::Items => "items",
            ElementKind::Extra => "extra",
            ElementKind::Total => "total",
        }
    }
}

impl core::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered element.
pub enum Element<R: Record> {
    Items(Items<R>),
    Extra(Extra<R>),
    Total(TotalSpec),
}

impl<R: Record> Element<R> {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Items(_) => ElementKind::Items,
            Element::Extra(_) => ElementKind::Extra,
            Element::Total(_) => ElementKind::Total,
        }
    }
}

impl<R: Record> std::fmt::Debug for Element<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Items(items) => std::fmt::Debug::fmt(items, f),
            Element::Extra(extra) => std::fmt::Debug::fmt(extra, f),
            Element::Total(total) => std::fmt::Debug::fmt(total, f),
        }
    }
}

/// The definition of a summary.
///
/// # Examples
///
/// ```rust
/// use commerce::{Callable, ExtraSpec, ItemsSpec, Schema, TotalSpec, memory::MemoryRecord};
///
/// let schema = Schema::<MemoryRecord>::builder()
///     .items("items", ItemsSpec::new().amount_from("model.amount"))
///     .extra("delivery", ExtraSpec::new())
///     .total("total", TotalSpec::all())
///     .method("get_amount_delivery", Callable::nullary(|_| Ok("10.00")))
///     .build()
///     .unwrap();
///
/// let names: Vec<_> = schema.elements().map(|(name, _)| name).collect();
/// assert_eq!(names, ["items", "delivery", "total"]);
/// ```
pub struct Schema<R: Record> {
    elements: IndexMap<String, Element<R>>,
    methods: IndexMap<String, Callable<R>>,
    attributes: IndexMap<String, Value>,
    locale: Option<Reference<R>>,
    currency: Option<Reference<R>>,
    decimal_html: Option<Reference<R>>,
}

impl<R: Record> Schema<R> {
    /// Return a builder for `Schema`.
    #[must_use]
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder::default()
    }

    /// Binds the schema to one record.
    pub fn bind<'a>(&'a self, record: &'a R) -> ResultSummary<Bound<'a, R>> {
        Bound::new(self, record)
    }

    /// `(name, kind)` pairs in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, ElementKind)> {
        self.elements
            .iter()
            .map(|(name, element)| (name.as_str(), element.kind()))
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &Items<R>)> {
        self.elements.iter().filter_map(|(name, element)| match element {
            Element::Items(items) => Some((name.as_str(), items)),
            _ => None,
        })
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &Extra<R>)> {
        self.elements.iter().filter_map(|(name, element)| match element {
            Element::Extra(extra) => Some((name.as_str(), extra)),
            _ => None,
        })
    }

    pub fn totals(&self) -> impl Iterator<Item = (&str, &TotalSpec)> {
        self.elements.iter().filter_map(|(name, element)| match element {
            Element::Total(total) => Some((name.as_str(), total)),
            _ => None,
        })
    }

    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Element<R>> {
        self.elements.get(name)
    }

    /// Looks up an element together with the schema-owned copy of its name.
    #[must_use]
    pub fn element_entry(&self, name: &str) -> Option<(&str, &Element<R>)> {
        self.elements
            .get_key_value(name)
            .map(|(name, element)| (name.as_str(), element))
    }

    #[must_use]
    pub fn kind(&self, name: &str) -> Option<ElementKind> {
        self.element(name).map(Element::kind)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Callable<R>> {
        self.methods.get(name)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub(crate) fn locale(&self) -> Option<&Reference<R>> {
        self.locale.as_ref()
    }

    pub(crate) fn currency(&self) -> Option<&Reference<R>> {
        self.currency.as_ref()
    }

    pub(crate) fn decimal_html(&self) -> Option<&Reference<R>> {
        self.decimal_html.as_ref()
    }
}

impl<R: Record> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("elements", &self.elements)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("attributes", &self.attributes)
            .field("locale", &self.locale)
            .field("currency", &self.currency)
            .field("decimal_html", &self.decimal_html)
            .finish()
    }
}

enum Declaration<R: Record> {
    Items(ItemsSpec<R>),
    Extra(ExtraSpec<R>),
    Total(TotalSpec),
}

/// Collects declarations in order; validation happens in [`SchemaBuilder::build`].
pub struct SchemaBuilder<R: Record> {
    declarations: Vec<(String, Declaration<R>)>,
    methods: Vec<(String, Callable<R>)>,
    attributes: Vec<(String, Value)>,
    locale: Option<Reference<R>>,
    currency: Option<Reference<R>>,
    decimal_html: Option<Reference<R>>,
}

impl<R: Record> Default for SchemaBuilder<R> {
    fn default() -> Self {
        Self {
            declarations: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            locale: None,
            currency: None,
            decimal_html: None,
        }
    }
}

impl<R: Record> SchemaBuilder<R> {
    #[must_use]
    pub fn items(mut self, name: &str, spec: ItemsSpec<R>) -> Self {
        self.declarations
            .push((name.to_string(), Declaration::Items(spec)));
        self
    }

    #[must_use]
    pub fn extra(mut self, name: &str, spec: ExtraSpec<R>) -> Self {
        self.declarations
            .push((name.to_string(), Declaration::Extra(spec)));
        self
    }

    #[must_use]
    pub fn total(mut self, name: &str, spec: TotalSpec) -> Self {
        self.declarations
            .push((name.to_string(), Declaration::Total(spec)));
        self
    }

    /// Registers a method reachable as `self.<name>` and as a custom total
    /// source.
    #[must_use]
    pub fn method(mut self, name: &str, callable: Callable<R>) -> Self {
        self.methods.push((name.to_string(), callable));
        self
    }

    /// Registers a literal attribute reachable as `self.<name>`.
    #[must_use]
    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }

    /// Locale tag, or a reference resolved once per binding.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<Reference<R>>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Currency code, or a reference resolved once per binding.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<Reference<R>>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Markup template for [`FormattedAmount::html`](crate::FormattedAmount::html).
    #[must_use]
    pub fn decimal_html(mut self, decimal_html: impl Into<Reference<R>>) -> Self {
        self.decimal_html = Some(decimal_html.into());
        self
    }

    /// Construct `Schema`, validating every declaration.
    pub fn build(self) -> ResultSummary<Schema<R>> {
        let mut elements = IndexMap::with_capacity(self.declarations.len());
        let mut methods = IndexMap::with_capacity(self.methods.len());
        let mut attributes = IndexMap::with_capacity(self.attributes.len());

        for (name, declaration) in self.declarations {
            validate_name(&name)?;
            if elements.contains_key(&name) {
                return Err(SummaryError::DuplicateElement(name));
            }
            let element = match declaration {
                Declaration::Items(spec) => Element::Items(spec.register(&name)?),
                Declaration::Extra(spec) => Element::Extra(spec.register(&name)),
                Declaration::Total(spec) => {
                    spec.validate(&name)?;
                    Element::Total(spec)
                }
            };
            elements.insert(name, element);
        }

        for (name, callable) in self.methods {
            validate_name(&name)?;
            if elements.contains_key(&name) || methods.contains_key(&name) {
                return Err(SummaryError::DuplicateElement(name));
            }
            methods.insert(name, callable);
        }

        for (name, value) in self.attributes {
            validate_name(&name)?;
            if elements.contains_key(&name)
                || methods.contains_key(&name)
                || attributes.contains_key(&name)
            {
                return Err(SummaryError::DuplicateElement(name));
            }
            attributes.insert(name, value);
        }

        tracing::debug!(
            elements = elements.len(),
            methods = methods.len(),
            attributes = attributes.len(),
            "schema defined"
        );

        Ok(Schema {
            elements,
            methods,
            attributes,
            locale: self.locale,
            currency: self.currency,
            decimal_html: self.decimal_html,
        })
    }
}

fn validate_name(name: &str) -> ResultSummary<()> {
    if name.is_empty() || name.starts_with(crate::total::NEGATION_MARKER) || name.contains('.') {
        return Err(SummaryError::Config(format!("invalid name: {name:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecord;

    fn builder() -> SchemaBuilder<MemoryRecord> {
        Schema::builder()
    }

    #[test]
    fn elements_keep_declaration_order() {
        let schema = builder()
            .total("zeta", TotalSpec::all())
            .extra("alpha", ExtraSpec::new())
            .items("mid", ItemsSpec::new())
            .total("beta", TotalSpec::of(["mid"]))
            .build()
            .unwrap();

        let elements: Vec<_> = schema.elements().collect();
        assert_eq!(
            elements,
            [
                ("zeta", ElementKind::Total),
                ("alpha", ElementKind::Extra),
                ("mid", ElementKind::Items),
                ("beta", ElementKind::Total),
            ]
        );
        let totals: Vec<_> = schema.totals().map(|(name, _)| name).collect();
        assert_eq!(totals, ["zeta", "beta"]);
    }

    #[test]
    #[should_panic(expected = "DuplicateElement(\"delivery\")")]
    fn fail_duplicate_element() {
        builder()
            .extra("delivery", ExtraSpec::new())
            .total("delivery", TotalSpec::all())
            .build()
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "DuplicateElement(\"total\")")]
    fn fail_method_shadowing_element() {
        builder()
            .total("total", TotalSpec::all())
            .method("total", Callable::nullary(|_| Ok(42_i64)))
            .build()
            .unwrap();
    }

    #[test]
    fn fail_invalid_names() {
        assert!(builder().extra("-tax", ExtraSpec::new()).build().is_err());
        assert!(builder().extra("", ExtraSpec::new()).build().is_err());
        assert!(builder().attribute("self.x", 1_i64).build().is_err());
    }

    #[test]
    fn definition_errors_surface_at_build() {
        let err = builder()
            .items("items", ItemsSpec::new().amount_from("price"))
            .build()
            .unwrap_err();
        assert!(err.is_definition());
    }

    #[test]
    fn schema_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema<MemoryRecord>>();
    }
}
