//! In-memory records, used by the `tally` binary and by tests.
//!
//! A [`MemoryRecord`] can be deserialized from a JSON document:
//!
//! ```json
//! {
//!   "attributes": { "country": "AU" },
//!   "collections": {
//!     "items": [
//!       { "key": "1", "label": "Guitar", "attributes": { "unit_price": "329.42" } }
//!     ]
//!   }
//! }
//! ```
use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{LineItem, Record, ResultSummary, SummaryError, Value};

/// A record kept in ordered maps.
///
/// Attributes and collections sit behind `RefCell`s: totals are written
/// through [`Record::store_total`] while a summary holds a shared reference,
/// and tests append items to a bound record.
#[derive(Debug, Default)]
pub struct MemoryRecord {
    attributes: RefCell<IndexMap<String, Value>>,
    collections: RefCell<IndexMap<String, Vec<MemoryItem>>>,
    saves: Cell<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDocument {
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    collections: IndexMap<String, Vec<MemoryItem>>,
}

impl<'de> Deserialize<'de> for MemoryRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let document = RecordDocument::deserialize(deserializer)?;
        Ok(Self {
            attributes: RefCell::new(document.attributes),
            collections: RefCell::new(document.collections),
            saves: Cell::new(0),
        })
    }
}

impl MemoryRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(self, name: &str, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_collection(self, name: &str, items: Vec<MemoryItem>) -> Self {
        self.collections.borrow_mut().insert(name.to_string(), items);
        self
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<Value>) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.into());
    }

    /// Appends an item, creating the collection if needed.
    pub fn push(&self, collection: &str, item: MemoryItem) {
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .push(item);
    }

    /// Current value of an attribute, `Value::Null` when unset.
    #[must_use]
    pub fn field(&self, name: &str) -> Value {
        self.attributes
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times [`Record::save`] was called.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl Record for MemoryRecord {
    type Item = MemoryItem;

    fn collection(&self, name: &str) -> ResultSummary<Vec<MemoryItem>> {
        self.collections
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| SummaryError::UnknownCollection(name.to_string()))
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }

    fn store_total(&self, field: &str, total: Decimal) -> ResultSummary<()> {
        self.set_attribute(field, total);
        Ok(())
    }

    fn save(&self) -> ResultSummary<()> {
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// One line of a [`MemoryRecord`] collection.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryItem {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(skip)]
    cached: IndexMap<String, Option<Decimal>>,
}

impl MemoryItem {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            attributes: IndexMap::new(),
            cached: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// The amount handed over by the summary under `name`, if any.
    #[must_use]
    pub fn cached_amount(&self, name: &str) -> Option<Decimal> {
        self.cached.get(name).copied().flatten()
    }

    fn derived_amount(&self) -> ResultSummary<Option<Value>> {
        let Some(unit_price) = self.attributes.get("unit_price") else {
            return Ok(None);
        };
        let Some(unit_price) = unit_price.to_decimal()? else {
            return Ok(None);
        };
        let quantity = match self.attributes.get("quantity") {
            Some(quantity) => quantity.to_decimal()?.unwrap_or(Decimal::ONE),
            None => Decimal::ONE,
        };
        let amount = unit_price.checked_mul(quantity).ok_or_else(|| {
            SummaryError::InvalidValue(format!(
                "item '{}': {unit_price} x {quantity} is out of range",
                self.key
            ))
        })?;
        Ok(Some(Value::Decimal(amount)))
    }
}

impl LineItem for MemoryItem {
    /// `amount`, when not set, is derived as `unit_price × quantity`
    /// (quantity defaulting to one).
    fn attribute(&self, name: &str) -> ResultSummary<Option<Value>> {
        match self.attributes.get(name) {
            Some(value) => Ok(Some(value.clone())),
            None if name == "amount" => self.derived_amount(),
            None => Ok(None),
        }
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn key(&self) -> String {
        self.key.clone()
    }

    fn cache_amount(&mut self, name: &str, amount: Option<Decimal>) {
        self.cached.insert(name.to_string(), amount);
    }
}
