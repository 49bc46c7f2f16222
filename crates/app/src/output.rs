//! Output formats of the `tally` binary.
use commerce::{Bound, LineItem, Record, Resolved, ResultSummary, json_summary};

use crate::{cli::Format, error::Result};

pub fn render<R: Record>(
    summary: &Bound<'_, R>,
    format: Format,
    fields: &[String],
) -> Result<String> {
    let output = match format {
        Format::Text => summary.render_text()?,
        Format::Json => {
            let fields: Vec<&str> = if fields.is_empty() {
                summary.schema().elements().map(|(name, _)| name).collect()
            } else {
                fields.iter().map(String::as_str).collect()
            };
            let mut json = serde_json::to_string_pretty(&json_summary(summary, &fields)?)?;
            json.push('\n');
            json
        }
        Format::Html => html(summary)?,
    };
    Ok(output)
}

/// One table row per line item, extra and total, amounts in the schema's
/// decimal markup.
fn html<R: Record>(summary: &Bound<'_, R>) -> ResultSummary<String> {
    let mut rows = Vec::new();
    for (name, _, resolved) in summary.resolved_elements()? {
        match resolved {
            Resolved::Items(lines) => {
                for line in lines.iter() {
                    let amount = line.amount.as_ref().map(|amount| amount.html());
                    rows.push(row("item", &line.item.label(), &amount.unwrap_or_default()));
                }
            }
            Resolved::Extra(extra) => {
                rows.push(row("extra", &extra.label(), &extra.amount.html()));
            }
            Resolved::Total(total) => rows.push(row("total", name, &total.html())),
        }
    }
    Ok(format!("<table>\n{}</table>\n", rows.concat()))
}

fn row(class: &str, label: &str, amount: &str) -> String {
    format!("  <tr class=\"{class}\"><th>{}</th><td>{amount}</td></tr>\n", escape(label))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
