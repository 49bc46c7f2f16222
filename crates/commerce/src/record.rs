//! The narrow contract between the engine and the record store.
//!
//! A summary never talks to a database directly. It asks the bound [`Record`]
//! for named collections of line items, reads named attributes for
//! `model.<name>` references and hands computed totals back through
//! [`Record::store_total`].
//!
//! All methods take `&self`: a record is shared by the bound summary and by
//! application callables while a total is being computed, so stores that
//! accept writes keep their own interior mutability (the way an ORM's unit of
//! work does).
use rust_decimal::Decimal;

use crate::{ResultSummary, Value};

/// A record a summary can be bound to (a cart, an order, an invoice).
pub trait Record {
    type Item: LineItem;

    /// Fetches the named collection of line items.
    ///
    /// Unknown names must be reported as
    /// [`SummaryError::UnknownCollection`](crate::SummaryError::UnknownCollection).
    fn collection(&self, name: &str) -> ResultSummary<Vec<Self::Item>>;

    /// Reads a named attribute, `None` when the record has no such attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Writes a computed total onto the named field. The change is not
    /// persisted until [`Record::save`] is called.
    fn store_total(&self, field: &str, total: Decimal) -> ResultSummary<()>;

    /// Persists pending changes. The engine never calls this itself.
    fn save(&self) -> ResultSummary<()> {
        Ok(())
    }
}

/// One member of a record's collection.
pub trait LineItem: Clone {
    /// Reads a named attribute, `None` when the item has no such attribute.
    ///
    /// Attributes an item derives from others (an amount computed from a
    /// unit price) report a malformed input as an error instead of hiding it
    /// behind `None`.
    fn attribute(&self, name: &str) -> ResultSummary<Option<Value>>;

    /// Human readable label, used by the text rendering.
    fn label(&self) -> String;

    /// Stable key identifying the item, used by the JSON summary.
    fn key(&self) -> String;

    /// Receives the per-unit amount computed for this item, under the
    /// element's `cache_amount_as` name.
    fn cache_amount(&mut self, _name: &str, _amount: Option<Decimal>) {}
}
