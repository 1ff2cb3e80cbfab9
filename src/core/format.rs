//! Display formatting for monetary amounts

use crate::core::rates::normalize_code;

/// Currency symbols keyed by currency code. Sorted by code.
#[rustfmt::skip]
static SYMBOLS: &[(&str, &str)] = &[
    ("AED", "د.إ"), ("AFN", "؋"), ("ANG", "ƒ"), ("ARS", "$"), ("AUD", "$"), ("AWG", "ƒ"),
    ("AZN", "₼"), ("BAM", "KM"), ("BBD", "$"), ("BGN", "лв"), ("BMD", "$"), ("BND", "$"),
    ("BOB", "$b"), ("BRL", "R$"), ("BSD", "$"), ("BWP", "P"), ("BYN", "Br"), ("BZD", "BZ$"),
    ("CAD", "$"), ("CLP", "$"), ("CNY", "¥"), ("COP", "$"), ("CRC", "₡"), ("CUP", "₱"),
    ("CZK", "Kč"), ("DKK", "kr"), ("DOP", "RD$"), ("EGP", "£"), ("EUR", "€"), ("FJD", "FJ$"),
    ("FKP", "£"), ("GBP", "£"), ("GGP", "£"), ("GHS", "¢"), ("GIP", "£"), ("GTQ", "Q"),
    ("GYD", "$"), ("HKD", "$"), ("HNL", "L"), ("HRK", "kn"), ("HUF", "Ft"), ("IDR", "Rp"),
    ("ILS", "₪"), ("IMP", "£"), ("INR", "₹"), ("IRR", "﷼"), ("ISK", "kr"), ("JEP", "$"),
    ("JMD", "J$"), ("JPY", "¥"), ("KGS", "лв"), ("KHR", "៛"), ("KPW", "₩"), ("KRW", "₩"),
    ("KYD", "$"), ("KZT", "лв"), ("LAK", "₭"), ("LBP", "£"), ("LEK", "Lek"), ("LKR", "₨"),
    ("LRD", "$"), ("MAD", ".د.م"), ("MKD", "ден"), ("MMK", "K"), ("MNT", "₮"), ("MUR", "₨"),
    ("MXN", "$"), ("MYR", "RM"), ("MZN", "MT"), ("NAD", "$"), ("NGN", "₦"), ("NIO", "C$"),
    ("NOK", "kr"), ("NPR", "₨"), ("NZD", "$"), ("OMR", "﷼"), ("PAB", "B/."), ("PEN", "S/."),
    ("PHP", "₱"), ("PKR", "₨"), ("PLN", "zł"), ("PYG", "Gs"), ("QAR", "﷼"), ("RON", "lei"),
    ("RSD", "Дин."), ("RUB", "₽"), ("SAR", "﷼"), ("SBD", "$"), ("SCR", "₨"), ("SEK", "kr"),
    ("SGD", "$"), ("SHP", "£"), ("SOS", "S"), ("SRD", "$"), ("SVC", "$"), ("SYP", "£"),
    ("THB", "฿"), ("TND", "DT"), ("TRY", "₺"), ("TTD", "TT$"), ("TVD", "$"), ("TWD", "元"),
    ("UAH", "₴"), ("USD", "$"), ("UYU", "$U"), ("UZS", "лв"), ("VEF", "Bs"), ("VND", "₫"),
    ("XAF", "FCFA"), ("XCD", "$"), ("XPF", "F"), ("YER", "﷼"), ("ZAR", "R"), ("ZWD", "Z$"),
];

/// Symbol for a currency code, if one is known.
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let code = normalize_code(code);
    SYMBOLS
        .binary_search_by_key(&code.as_str(), |(c, _)| *c)
        .ok()
        .map(|i| SYMBOLS[i].1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SymbolPosition {
    /// `$1,234.56`
    Before,
    /// `€ 1.234,56`
    BeforeSpaced,
    /// `1.234,56 €`
    AfterSpaced,
}

#[derive(Debug, Clone, Copy)]
struct NumberConvention {
    decimal: char,
    group: char,
    position: SymbolPosition,
}

/// Number conventions per language subtag.
#[rustfmt::skip]
static CONVENTIONS: &[(&str, NumberConvention)] = &[
    ("de", NumberConvention { decimal: ',', group: '.', position: SymbolPosition::AfterSpaced }),
    ("el", NumberConvention { decimal: ',', group: '.', position: SymbolPosition::AfterSpaced }),
    ("en", NumberConvention { decimal: '.', group: ',', position: SymbolPosition::Before }),
    ("es", NumberConvention { decimal: ',', group: '.', position: SymbolPosition::AfterSpaced }),
    ("fr", NumberConvention { decimal: ',', group: '\u{202f}', position: SymbolPosition::AfterSpaced }),
    ("it", NumberConvention { decimal: ',', group: '.', position: SymbolPosition::AfterSpaced }),
    ("nl", NumberConvention { decimal: ',', group: '.', position: SymbolPosition::BeforeSpaced }),
    ("pt", NumberConvention { decimal: ',', group: '.', position: SymbolPosition::BeforeSpaced }),
];

/// Looks up the conventions for a locale tag such as `en-US`, `de_DE.UTF-8` or `fr`.
fn convention_for(locale: &str) -> Option<NumberConvention> {
    let language = locale
        .trim()
        .split(['-', '_', '.', '@'])
        .next()?
        .to_ascii_lowercase();
    CONVENTIONS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, convention)| *convention)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Splits `amount` into a sign and its absolute value with two decimals.
/// Amounts that round to zero never get a sign, so there is no "-0.00".
fn signed_fixed(amount: f64) -> (&'static str, String) {
    let fixed = format!("{:.2}", amount.abs());
    let sign = if amount < 0.0 && fixed.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        "-"
    } else {
        ""
    };
    (sign, fixed)
}

fn format_localized(symbol: &str, amount: f64, convention: NumberConvention) -> String {
    let (sign, fixed) = signed_fixed(amount);
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let number = format!(
        "{}{}{}",
        group_digits(integer, convention.group),
        convention.decimal,
        fraction
    );

    match convention.position {
        SymbolPosition::Before => format!("{sign}{symbol}{number}"),
        SymbolPosition::BeforeSpaced => format!("{sign}{symbol} {number}"),
        SymbolPosition::AfterSpaced => format!("{sign}{number} {symbol}"),
    }
}

/// Formats monetary amounts for display.
///
/// With a supported locale the amount is grouped and placed according to that
/// locale's conventions. Otherwise the result is `"<symbol> <amount>"` with two
/// decimals, where the symbol falls back to the currency code itself.
#[derive(Debug, Clone, Default)]
pub struct CurrencyFormatter {
    locale: Option<String>,
}

impl CurrencyFormatter {
    pub fn new(locale: Option<String>) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn format(&self, currency: &str, amount: f64) -> String {
        self.format_with_locale(currency, amount, self.locale.as_deref())
    }

    pub fn format_with_locale(&self, currency: &str, amount: f64, locale: Option<&str>) -> String {
        let code = normalize_code(currency);
        let symbol = currency_symbol(&code).unwrap_or(code.as_str());

        match locale.and_then(convention_for) {
            Some(convention) => format_localized(symbol, amount, convention),
            None => {
                let (sign, fixed) = signed_fixed(amount);
                format!("{symbol} {sign}{fixed}")
            }
        }
    }
}
