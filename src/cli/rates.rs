use super::ui;
use crate::core::{BASE_CURRENCY, RateTable};
use crate::core::format::currency_symbol;
use comfy_table::Cell;

impl RateTable {
    /// Renders the table with a title line naming the base currency.
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Symbol"),
            ui::header_cell(&format!("Rate (per 1 {BASE_CURRENCY})")),
        ]);

        for (code, rate) in self.iter() {
            table.add_row(vec![
                Cell::new(code),
                Cell::new(currency_symbol(code).unwrap_or("")),
                ui::number_cell(format!("{rate:.4}")),
            ]);
        }

        let published = self
            .published()
            .map_or("unknown date".to_string(), |date| date.to_string());

        format!(
            "{} {}\n\n{}",
            ui::style_text(
                &format!("Reference rates against {BASE_CURRENCY}"),
                ui::StyleType::Title
            ),
            ui::style_text(&format!("({published})"), ui::StyleType::Subtle),
            table
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_as_table() {
        let table = RateTable::from_rates([("USD", 1.1), ("JPY", 150.0), ("ZZZ", 2.0)])
            .with_published(NaiveDate::from_ymd_opt(2024, 3, 1));
        let output = table.display_as_table();

        assert!(output.contains("Reference rates against EUR"));
        assert!(output.contains("2024-03-01"));
        assert!(output.contains("USD"));
        assert!(output.contains("1.1000"));
        assert!(output.contains("150.0000"));
        assert!(output.contains("¥"));
        let jpy = output.find("JPY").unwrap();
        let usd = output.find("USD").unwrap();
        assert!(jpy < usd);
    }
}
