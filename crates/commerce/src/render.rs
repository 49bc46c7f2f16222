//! Plain-text rendering of a bound summary.
use rust_decimal::Decimal;

use crate::{Bound, LineItem, Record, ResultSummary, extra::humanize, money::fixed};

const DECIMAL_PLACES: u32 = 2;

impl<R: Record> Bound<'_, R> {
    /// Renders the summary as aligned text.
    ///
    /// Item lines come first, then extras, then totals, each group followed
    /// by an empty line. Labels of items and extras are left-aligned, total
    /// labels right-aligned; amounts are right-aligned with two decimals.
    ///
    /// ```text
    /// 1x Guitar      329.42
    /// 1x Strings       4.48
    /// 3x Mandolin    672.23
    ///
    /// Delivery        10.00
    ///
    ///        Total  2360.59
    /// ```
    pub fn render_text(&self) -> ResultSummary<String> {
        let schema = self.schema();

        let mut item_rows = Vec::new();
        for (name, _) in schema.items() {
            for line in self.items(name)?.iter() {
                item_rows.push((line.item.label(), line.amount_or_zero()));
            }
        }

        let mut extra_rows = Vec::new();
        for (name, _) in schema.extras() {
            let extra = self.extra(name)?.snapshot()?;
            extra_rows.push((extra.label(), extra.amount.value()));
        }

        let mut total_rows = Vec::new();
        for (name, _) in schema.totals() {
            total_rows.push((humanize(name), self.total(name)?.value()));
        }

        let rows = || item_rows.iter().chain(&extra_rows).chain(&total_rows);
        let width = rows()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        let digits = rows()
            .map(|(_, amount)| fixed(*amount, DECIMAL_PLACES).len())
            .max()
            .unwrap_or(0);

        let left = |(label, amount): &(String, Decimal)| {
            format!("{label:<width$}  {:>digits$}", fixed(*amount, DECIMAL_PLACES))
        };
        let right = |(label, amount): &(String, Decimal)| {
            format!("{label:>width$}  {:>digits$}", fixed(*amount, DECIMAL_PLACES))
        };

        let mut output = Vec::with_capacity(item_rows.len() + extra_rows.len() + total_rows.len() + 3);
        output.extend(item_rows.iter().map(left));
        output.push(String::new());
        output.extend(extra_rows.iter().map(left));
        output.push(String::new());
        output.extend(total_rows.iter().map(right));
        output.push(String::new());

        Ok(output.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ExtraSpec, ItemsSpec, Schema, TotalSpec,
        memory::{MemoryItem, MemoryRecord},
    };

    #[test]
    fn columns_align_on_widest_label_and_amount() {
        let schema = Schema::<MemoryRecord>::builder()
            .items("items", ItemsSpec::new().amount_from("model.amount"))
            .extra(
                "tax",
                ExtraSpec::new()
                    .verbose_name("GST")
                    .description("15%")
                    .amount("1.50")
                    .included(true),
            )
            .total("grand_total", TotalSpec::all())
            .build()
            .unwrap();
        let record = MemoryRecord::new().with_collection(
            "items",
            vec![MemoryItem::new("1", "Pick").with("amount", "0.5")],
        );
        let bound = schema.bind(&record).unwrap();

        assert_eq!(
            bound.render_text().unwrap(),
            "Pick         0.50\n\nGST (15%)    1.50\n\nGrand total  0.50\n"
        );
    }

    #[test]
    fn empty_schema_renders_blank_groups() {
        let schema = Schema::<MemoryRecord>::builder().build().unwrap();
        let record = MemoryRecord::new();
        assert_eq!(schema.bind(&record).unwrap().render_text().unwrap(), "\n\n");
    }
}
