//! Handles settings for `tally`.
//!
//! Values are read from `tally.toml` (optional unless a path is given) and
//! from `TALLY__<SECTION>__<KEY>` environment variables, e.g.
//! `TALLY__APP__LEVEL=debug`.
use std::path::Path;

use commerce::{SchemaConfig, Value};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "tally";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Context used when a schema declares none.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub locale: Option<String>,
    pub currency: Option<String>,
    pub decimal_html: Option<String>,
}

impl Summary {
    pub fn apply(&self, definition: &mut SchemaConfig) {
        fill(&mut definition.locale, self.locale.as_deref());
        fill(&mut definition.currency, self.currency.as_deref());
        fill(&mut definition.decimal_html, self.decimal_html.as_deref());
    }
}

fn fill(slot: &mut Option<Value>, fallback: Option<&str>) {
    if slot.is_none()
        && let Some(fallback) = fallback
    {
        *slot = Some(Value::from(fallback));
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub summary: Summary,
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_values_win_over_defaults() {
        let mut definition = SchemaConfig {
            currency: Some(Value::from("AUD")),
            ..SchemaConfig::default()
        };
        let summary = Summary {
            locale: Some("en-AU".to_string()),
            currency: Some("USD".to_string()),
            decimal_html: None,
        };
        summary.apply(&mut definition);

        assert_eq!(definition.locale, Some(Value::from("en-AU")));
        assert_eq!(definition.currency, Some(Value::from("AUD")));
        assert_eq!(definition.decimal_html, None);
    }
}
