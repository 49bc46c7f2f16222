//! Declarative financial summaries.
//!
//! A [`Schema`] declares, once, how a summary is computed from a record: its
//! line items, its extras (tax, delivery, discounts) and its totals. Binding
//! the schema to a record gives a [`Bound`] summary whose elements resolve on
//! access, formatted for the record's locale and currency.
//!
//! [`FriendlyId`] turns record ids into short codes for invoices and orders.
pub use bound::{Bound, Resolved};
pub use self::config::{ElementConfig, ExtraConfig, ItemsConfig, SchemaConfig, TotalConfig};
pub use currency::{Currency, Locale};
pub use error::{SummaryError, Target};
pub use extra::{Extra, ExtraSpec, ExtraView, ResolvedExtra};
pub use friendly_id::{FriendlyId, FriendlyIdBuilder};
pub use items::{DEFAULT_CACHE_AMOUNT_AS, Items, ItemsSpec, Line};
pub use json::json_summary;
pub use money::{Context, DEFAULT_DECIMAL_HTML, DEFAULT_LOCALE, Elements, FormattedAmount};
pub use record::{LineItem, Record};
pub use reference::{Arg, Callable, RECORD_PREFIX, Reference, SUMMARY_PREFIX};
pub use schema::{Element, ElementKind, Schema, SchemaBuilder};
pub use total::{NEGATION_MARKER, TotalSpec};
pub use value::Value;

mod bound;
mod config;
mod currency;
mod error;
mod extra;
pub mod friendly_id;
mod items;
pub mod json;
pub mod memory;
mod money;
mod record;
mod reference;
mod render;
mod schema;
mod total;
mod value;

pub type ResultSummary<T> = Result<T, SummaryError>;
