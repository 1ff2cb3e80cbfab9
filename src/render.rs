//! Replaces `{forex FROM TO}amount{/forex}` tags in free text with formatted,
//! converted amounts.

use crate::core::convert::Converter;
use crate::core::format::CurrencyFormatter;
use crate::core::rates::{RateSource, normalize_code};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, warn};

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?iU)\{\s*forex(.*)\s*\}(.*)\{\s*/forex\s*\}").expect("valid tag pattern")
});

/// What a single tag asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum TagRequest {
    /// `{forex USD}12{/forex}`: display the amount in that currency.
    Display { currency: String },
    /// `{forex USD EUR}12{/forex}`: convert before displaying.
    Convert { from: String, to: String },
}

impl TagRequest {
    /// Parses the argument part of a tag. Tabs are ignored and only the first
    /// space separates the two currency codes.
    pub fn parse(arguments: &str) -> Option<Self> {
        let arguments = arguments.trim().to_uppercase().replace('\t', "");
        let mut parts = arguments.splitn(2, ' ');
        let first = normalize_code(parts.next()?);
        if first.is_empty() {
            return None;
        }
        match parts.next().map(normalize_code) {
            Some(second) if !second.is_empty() => Some(TagRequest::Convert {
                from: first,
                to: second,
            }),
            _ => Some(TagRequest::Display { currency: first }),
        }
    }
}

struct Tag {
    span: Range<usize>,
    arguments: String,
    value: String,
}

fn find_tags(text: &str) -> Vec<Tag> {
    TAG_PATTERN
        .captures_iter(text)
        .map(|caps| Tag {
            span: caps.get_match().range(),
            arguments: caps[1].to_string(),
            value: caps[2].to_string(),
        })
        .collect()
}

/// Renders currency tags found in a block of text.
pub struct TagRenderer<S: RateSource> {
    converter: Converter<S>,
    formatter: CurrencyFormatter,
}

impl<S: RateSource> TagRenderer<S> {
    pub fn new(converter: Converter<S>, formatter: CurrencyFormatter) -> Self {
        Self {
            converter,
            formatter,
        }
    }

    /// Returns `text` with every well formed tag replaced in place.
    ///
    /// Tags whose amount isn't a number, or that name no currency, are left as
    /// they are. When a conversion isn't possible the original amount is shown
    /// in the original currency.
    pub async fn render(&self, text: &str) -> String {
        if !text.to_lowercase().contains("forex") {
            return text.to_string();
        }

        let tags = find_tags(text);
        debug!(count = tags.len(), "Found currency tags");

        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        for tag in tags {
            output.push_str(&text[last..tag.span.start]);
            match self.render_tag(&tag.arguments, &tag.value).await {
                Some(rendered) => output.push_str(&rendered),
                None => output.push_str(&text[tag.span.clone()]),
            }
            last = tag.span.end;
        }
        output.push_str(&text[last..]);
        output
    }

    /// Renders the replacement for a single tag.
    pub async fn render_tag(&self, arguments: &str, value: &str) -> Option<String> {
        let Some(request) = TagRequest::parse(arguments) else {
            warn!(arguments, "Currency tag without a currency, leaving it as is");
            return None;
        };
        let amount = match value.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() => amount,
            Ok(_) => {
                warn!(value, "Currency tag amount is not finite, leaving it as is");
                return None;
            }
            Err(e) => {
                warn!(value, error = %e, "Currency tag amount is not a number, leaving it as is");
                return None;
            }
        };

        let rendered = match request {
            TagRequest::Display { currency } => self.formatter.format(&currency, amount),
            TagRequest::Convert { from, to } => {
                match self.converter.convert(&from, &to, amount).await {
                    Some(converted) => self.formatter.format(&to, converted),
                    None => {
                        debug!(%from, %to, "No conversion available, showing original amount");
                        self.formatter.format(&from, amount)
                    }
                }
            }
        };
        Some(rendered)
    }
}
