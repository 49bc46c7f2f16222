//! JSON view of a bound summary.
use serde_json::{Map, Value as Json};

use crate::{Bound, FormattedAmount, LineItem, Record, ResultSummary};

/// Serializes the requested elements of a summary.
///
/// Items become an object mapping each line's key to its amount, extras and
/// totals their amount. Amounts are decimal strings; a line without an
/// amount maps to `null`. Names not listed in `fields` are left out, so an
/// empty list yields an empty object.
pub fn json_summary<R: Record>(bound: &Bound<'_, R>, fields: &[&str]) -> ResultSummary<Json> {
    let schema = bound.schema();
    let wanted = |name: &str| fields.contains(&name);
    let mut data = Map::new();

    for (name, _) in schema.items() {
        if !wanted(name) {
            continue;
        }
        let lines = bound
            .items(name)?
            .iter()
            .map(|line| {
                let amount = line.amount.as_ref().map_or(Json::Null, amount_json);
                (line.item.key(), amount)
            })
            .collect::<Map<_, _>>();
        data.insert(name.to_string(), Json::Object(lines));
    }

    for (name, _) in schema.extras() {
        if wanted(name) {
            data.insert(name.to_string(), amount_json(&bound.extra(name)?.amount()?));
        }
    }

    for (name, _) in schema.totals() {
        if wanted(name) {
            data.insert(name.to_string(), amount_json(&bound.total(name)?));
        }
    }

    tracing::debug!(fields = data.len(), "summary serialized");
    Ok(Json::Object(data))
}

fn amount_json(amount: &FormattedAmount) -> Json {
    Json::String(amount.raw())
}
