use super::ui;
use crate::core::{Converter, CurrencyFormatter, RateSource};

/// Result of a conversion request, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOutput {
    pub display: String,
    /// Set when no rate was available and `display` shows the original amount.
    pub notice: Option<String>,
}

/// Converts `amount` and formats it. When the pair can't be converted the
/// original amount is formatted in the source currency instead.
pub async fn convert_amount<S: RateSource>(
    converter: &Converter<S>,
    formatter: &CurrencyFormatter,
    from: &str,
    to: &str,
    amount: f64,
) -> ConvertOutput {
    match converter.convert(from, to, amount).await {
        Some(converted) => ConvertOutput {
            display: formatter.format(to, converted),
            notice: None,
        },
        None => ConvertOutput {
            display: formatter.format(from, amount),
            notice: Some(ui::style_text(
                &format!(
                    "No exchange rate available for {} to {}, showing the original amount",
                    from.trim().to_uppercase(),
                    to.trim().to_uppercase()
                ),
                ui::StyleType::Error,
            )),
        },
    }
}
