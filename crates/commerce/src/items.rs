//! Items elements: a named collection of line items, each priced once per
//! bound summary.
use rust_decimal::Decimal;

use crate::{
    Arg, Bound, FormattedAmount, LineItem, Record, Reference, ResultSummary, SummaryError,
};

/// Default name under which the per-unit amount is handed to each item.
pub const DEFAULT_CACHE_AMOUNT_AS: &str = "AMOUNT";

/// Declaration of an items element.
///
/// ```rust
/// use commerce::{ItemsSpec, memory::MemoryRecord};
///
/// let spec = ItemsSpec::<MemoryRecord>::new()
///     .attribute("lines")
///     .amount_from("model.amount");
/// ```
pub struct ItemsSpec<R: Record> {
    attribute: Option<String>,
    amount_from: Option<Reference<R>>,
    cache_amount_as: String,
    editable: bool,
}

impl<R: Record> Default for ItemsSpec<R> {
    fn default() -> Self {
        Self {
            attribute: None,
            amount_from: None,
            cache_amount_as: DEFAULT_CACHE_AMOUNT_AS.to_string(),
            editable: false,
        }
    }
}

impl<R: Record> ItemsSpec<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection name on the record. Defaults to the element name.
    #[must_use]
    pub fn attribute(mut self, attribute: &str) -> Self {
        self.attribute = Some(attribute.to_string());
        self
    }

    /// Per-unit amount: a `self.`/`model.` string or a callable. Defaults to
    /// `self.get_<name>_amount`.
    #[must_use]
    pub fn amount_from(mut self, amount_from: impl Into<Reference<R>>) -> Self {
        self.amount_from = Some(amount_from.into());
        self
    }

    #[must_use]
    pub fn cache_amount_as(mut self, name: &str) -> Self {
        self.cache_amount_as = name.to_string();
        self
    }

    /// Marks the collection as editable by form layers.
    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub(crate) fn register(self, name: &str) -> ResultSummary<Items<R>> {
        let amount_from = match self.amount_from {
            Some(Reference::Literal(value)) => {
                return Err(SummaryError::MalformedReference(format!(
                    "items '{name}': amount_from must start with either 'self.' or 'model.' (got {value:?})"
                )));
            }
            Some(Reference::Summary(attr)) | Some(Reference::Record(attr)) if attr.is_empty() => {
                return Err(SummaryError::MalformedReference(format!(
                    "items '{name}': amount_from names no attribute"
                )));
            }
            Some(reference) => reference,
            None => Reference::Summary(format!("get_{name}_amount")),
        };

        Ok(Items {
            attribute: self.attribute.unwrap_or_else(|| name.to_string()),
            amount_from,
            cache_amount_as: self.cache_amount_as,
            editable: self.editable,
        })
    }
}

/// A registered items element, defaults filled in.
pub struct Items<R: Record> {
    attribute: String,
    amount_from: Reference<R>,
    cache_amount_as: String,
    editable: bool,
}

impl<R: Record> Items<R> {
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    #[must_use]
    pub fn amount_from(&self) -> &Reference<R> {
        &self.amount_from
    }

    #[must_use]
    pub fn cache_amount_as(&self) -> &str {
        &self.cache_amount_as
    }

    #[must_use]
    pub fn editable(&self) -> bool {
        self.editable
    }

    /// Fetches the collection and prices every member.
    pub(crate) fn fetch(
        &self,
        name: &str,
        bound: &Bound<'_, R>,
    ) -> ResultSummary<Vec<Line<R::Item>>> {
        let members = bound.record().collection(&self.attribute)?;
        let mut lines = Vec::with_capacity(members.len());

        for mut item in members {
            let amount = self
                .amount_from
                .resolve(bound, Arg::Item(&item))?
                .to_decimal()?;
            item.cache_amount(&self.cache_amount_as, amount);
            lines.push(Line {
                item,
                amount: amount.map(|value| bound.amount(value)),
            });
        }

        tracing::debug!(
            element = name,
            collection = %self.attribute,
            count = lines.len(),
            "fetched and priced items"
        );
        Ok(lines)
    }
}

impl<R: Record> std::fmt::Debug for Items<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Items")
            .field("attribute", &self.attribute)
            .field("amount_from", &self.amount_from)
            .field("cache_amount_as", &self.cache_amount_as)
            .field("editable", &self.editable)
            .finish()
    }
}

/// A line item together with the per-unit amount computed for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Line<I> {
    pub item: I,
    pub amount: Option<FormattedAmount>,
}

impl<I: LineItem> Line<I> {
    /// The amount, a missing one counting as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount
            .as_ref()
            .map_or(Decimal::ZERO, FormattedAmount::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecord;

    #[test]
    fn defaults_follow_the_element_name() {
        let items = ItemsSpec::<MemoryRecord>::new().register("vouchers").unwrap();
        assert_eq!(items.attribute(), "vouchers");
        assert_eq!(items.cache_amount_as(), "AMOUNT");
        assert!(matches!(
            items.amount_from(),
            Reference::Summary(name) if name == "get_vouchers_amount"
        ));
        assert!(!items.editable());
    }

    #[test]
    #[should_panic(expected = "MalformedReference")]
    fn fail_unprefixed_amount_from() {
        ItemsSpec::<MemoryRecord>::new()
            .amount_from("item_price")
            .register("items")
            .unwrap();
    }

    #[test]
    fn callables_are_accepted() {
        let items = ItemsSpec::<MemoryRecord>::new()
            .amount_from(crate::Callable::<MemoryRecord>::unary(|_, _| Ok(rust_decimal::Decimal::ONE)))
            .register("items")
            .unwrap();
        assert!(matches!(items.amount_from(), Reference::Callable(_)));
    }
}
