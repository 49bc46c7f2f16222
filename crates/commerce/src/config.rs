//! Schemas declared in TOML or JSON documents.
//!
//! ```toml
//! locale = "en-AU"
//! currency = "AUD"
//!
//! [[elements]]
//! name = "items"
//! kind = "items"
//! amount_from = "model.amount"
//!
//! [[elements]]
//! name = "delivery"
//! kind = "extra"
//! amount = "10.00"
//!
//! [[elements]]
//! name = "total"
//! kind = "total"
//! ```
//!
//! Elements keep the order of the `elements` array. Unknown keys are
//! rejected.
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    ExtraSpec, ItemsSpec, Record, Reference, ResultSummary, Schema, TotalSpec, Value,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub locale: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub decimal_html: Option<Value>,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementConfig {
    Items(ItemsConfig),
    Extra(ExtraConfig),
    Total(TotalConfig),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemsConfig {
    pub name: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub amount_from: Option<String>,
    #[serde(default)]
    pub cache_amount_as: Option<String>,
    #[serde(default)]
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraConfig {
    pub name: String,
    #[serde(default)]
    pub verbose_name: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub included: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TotalConfig {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub prevent_negative: bool,
    #[serde(default)]
    pub model_cache: Option<String>,
}

impl SchemaConfig {
    /// Reads a schema document; the format follows the file extension.
    pub fn load(path: impl AsRef<Path>) -> ResultSummary<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading schema");
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml(text: &str) -> ResultSummary<Self> {
        Self::from_str(text, config::FileFormat::Toml)
    }

    pub fn from_json(text: &str) -> ResultSummary<Self> {
        Self::from_str(text, config::FileFormat::Json)
    }

    fn from_str(text: &str, format: config::FileFormat) -> ResultSummary<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(text, format))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Builds the schema. Summary methods cannot be declared in a document:
    /// `self.<name>` references may only reach elements and attributes.
    pub fn into_schema<R: Record + 'static>(self) -> ResultSummary<Schema<R>> {
        let mut builder = Schema::<R>::builder();

        if let Some(locale) = self.locale {
            builder = builder.locale(locale);
        }
        if let Some(currency) = self.currency {
            builder = builder.currency(currency);
        }
        if let Some(decimal_html) = self.decimal_html {
            builder = builder.decimal_html(decimal_html);
        }
        for (name, value) in self.attributes {
            builder = builder.attribute(&name, value);
        }

        for element in self.elements {
            builder = match element {
                ElementConfig::Items(items) => {
                    let mut spec = ItemsSpec::new().editable(items.editable);
                    if let Some(attribute) = &items.attribute {
                        spec = spec.attribute(attribute);
                    }
                    if let Some(amount_from) = &items.amount_from {
                        spec = spec.amount_from(Reference::lookup(amount_from)?);
                    }
                    if let Some(cache_amount_as) = &items.cache_amount_as {
                        spec = spec.cache_amount_as(cache_amount_as);
                    }
                    builder.items(&items.name, spec)
                }
                ElementConfig::Extra(extra) => {
                    let mut spec = ExtraSpec::new();
                    if let Some(verbose_name) = extra.verbose_name {
                        spec = spec.verbose_name(verbose_name);
                    }
                    if let Some(amount) = extra.amount {
                        spec = spec.amount(amount);
                    }
                    if let Some(description) = extra.description {
                        spec = spec.description(description);
                    }
                    if let Some(included) = extra.included {
                        spec = spec.included(included);
                    }
                    builder.extra(&extra.name, spec)
                }
                ElementConfig::Total(total) => {
                    let mut spec =
                        TotalSpec::of(total.sources).prevent_negative(total.prevent_negative);
                    if let Some(field) = &total.model_cache {
                        spec = spec.model_cache(field);
                    }
                    builder.total(&total.name, spec)
                }
            };
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{ElementKind, SummaryError, memory::MemoryRecord};

    const CART: &str = r#"
currency = "AUD"

[[elements]]
name = "items"
kind = "items"
amount_from = "model.amount"

[[elements]]
name = "tax"
kind = "extra"
verbose_name = "GST"
amount = "10.03"
included = true

[[elements]]
name = "total"
kind = "total"
sources = ["items", "tax"]
prevent_negative = true
"#;

    #[test]
    fn toml_keeps_element_order() {
        let config = SchemaConfig::from_toml(CART).unwrap();
        let schema = config.into_schema::<MemoryRecord>().unwrap();
        let elements: Vec<_> = schema.elements().collect();
        assert_eq!(
            elements,
            [
                ("items", ElementKind::Items),
                ("tax", ElementKind::Extra),
                ("total", ElementKind::Total),
            ]
        );
    }

    #[test]
    fn extra_facets_become_references() {
        let config = SchemaConfig::from_json(
            r#"{"elements": [{"name": "delivery", "kind": "extra", "amount": "self.shipping"}]}"#,
        )
        .unwrap();
        let ElementConfig::Extra(extra) = &config.elements[0] else {
            panic!("expected an extra");
        };
        assert_eq!(extra.amount, Some(Value::from("self.shipping")));

        let schema = config
            .into_schema::<MemoryRecord>()
            .unwrap();
        let record = MemoryRecord::new();
        let bound = schema.bind(&record).unwrap();
        assert_eq!(
            bound.extra("delivery").unwrap().amount().unwrap_err(),
            SummaryError::UnknownAttribute {
                target: crate::Target::Summary,
                name: "shipping".to_string()
            }
        );
    }

    #[test]
    fn literal_amounts_parse() {
        let schema = SchemaConfig::from_toml(CART)
            .unwrap()
            .into_schema::<MemoryRecord>()
            .unwrap();
        let record = MemoryRecord::new();
        let bound = schema.bind(&record).unwrap();
        let tax = bound.extra("tax").unwrap();
        assert_eq!(tax.amount().unwrap(), dec!(10.03));
        assert!(tax.included().unwrap());
        assert_eq!(tax.verbose_name().unwrap(), "GST");
    }

    #[test]
    #[should_panic(expected = "UnknownKey(\"amount_form\")")]
    fn fail_unknown_key() {
        SchemaConfig::from_toml(
            r#"
[[elements]]
name = "items"
kind = "items"
amount_form = "model.amount"
"#,
        )
        .unwrap();
    }

    #[test]
    fn fail_unprefixed_amount_from() {
        let err = SchemaConfig::from_toml(
            r#"
[[elements]]
name = "items"
kind = "items"
amount_from = "amount"
"#,
        )
        .unwrap()
        .into_schema::<MemoryRecord>()
        .unwrap_err();
        assert!(matches!(err, SummaryError::MalformedReference(_)));
    }
}
