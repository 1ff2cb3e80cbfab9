use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::SourceConfig;
use crate::core::rates::{RateSource, RateTable};

pub const ECB_DAILY_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// The daily feed nests three levels of <Cube> elements:
// <Cube><Cube time="..."><Cube currency="USD" rate="1.0903"/>...</Cube></Cube>
#[allow(dead_code)]
#[derive(Deserialize, Debug)]
enum EnvelopeEntry {
    #[serde(rename = "subject")]
    Subject(String),
    #[serde(rename = "Sender")]
    Sender(Sender),
    Cube(OuterCube),
}

#[derive(Deserialize, Debug)]
struct Sender {
    #[serde(rename = "name")]
    _name: String,
}

#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(rename = "$value")]
    entries: Vec<EnvelopeEntry>,
}

#[derive(Deserialize, Debug)]
struct OuterCube {
    #[serde(rename = "Cube")]
    day: DayCube,
}

#[derive(Deserialize, Debug)]
struct DayCube {
    time: Option<String>,
    #[serde(rename = "$value", default)]
    quotes: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    currency: String,
    rate: f64,
}

/// Parses the ECB daily reference rate document into a [`RateTable`].
pub fn parse_rate_document(body: &str) -> Result<RateTable> {
    let envelope: Envelope =
        serde_xml_rs::from_str(body.trim_start_matches('\u{feff}')).map_err(|e| anyhow!("{e}"))?;

    let day = envelope
        .entries
        .into_iter()
        .find_map(|entry| match entry {
            EnvelopeEntry::Cube(cube) => Some(cube.day),
            _ => None,
        })
        .ok_or_else(|| anyhow!("No Cube element found in rate document"))?;

    if day.quotes.is_empty() {
        return Err(anyhow!("Rate document contains no quotes"));
    }

    let published = day
        .time
        .as_deref()
        .and_then(|time| NaiveDate::parse_from_str(time.trim(), "%Y-%m-%d").ok());

    let table = RateTable::from_rates(day.quotes.into_iter().map(|q| (q.currency, q.rate)))
        .with_published(published);
    Ok(table)
}

/// Fetches the daily euro foreign exchange reference rates published by the
/// European Central Bank.
pub struct EcbRateSource {
    url: String,
    timeout: Duration,
}

impl EcbRateSource {
    pub fn new(url: &str, timeout: Duration) -> Self {
        EcbRateSource {
            url: url.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for EcbRateSource {
    fn default() -> Self {
        Self::new(ECB_DAILY_URL, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl RateSource for EcbRateSource {
    #[instrument(name = "EcbRateFetch", skip(self), fields(url = %self.url))]
    async fn fetch_rates(&self) -> Result<RateTable> {
        debug!("Requesting exchange rates from {}", self.url);

        let client = reqwest::Client::builder()
            .user_agent(concat!("forex/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} fetching rates from {}", e, self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} fetching rates from {}",
                response.status(),
                self.url
            ));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", self.url))?;

        let table = parse_rate_document(&text)
            .map_err(|e| anyhow!("Failed to parse rate document from {}: {}", self.url, e))?;
        debug!(currencies = table.len(), "Parsed rate document");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<gesmes:Sender>
		<gesmes:name>European Central Bank</gesmes:name>
	</gesmes:Sender>
	<Cube>
		<Cube time='2022-10-03'>
			<Cube currency='USD' rate='0.9764'/>
			<Cube currency='JPY' rate='141.49'/>
			<Cube currency='GBP' rate='0.87070'/>
			<Cube currency='CHF' rate='0.9658'/>
			<Cube currency='SEK' rate='10.8743'/>
		</Cube>
	</Cube>
</gesmes:Envelope>"#;

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/eurofxref-daily.xml"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn source_for(server: &MockServer) -> EcbRateSource {
        EcbRateSource::new(
            &format!("{}/eurofxref-daily.xml", server.uri()),
            DEFAULT_TIMEOUT,
        )
    }

    #[test]
    fn test_parse_rate_document() {
        let table = parse_rate_document(SAMPLE_DOCUMENT).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.rate_for("USD"), Some(0.9764));
        assert_eq!(table.rate_for("jpy"), Some(141.49));
        assert_eq!(table.rate_for("GBP"), Some(0.8707));
        assert_eq!(table.rate_for("EUR"), None);
        assert_eq!(table.published(), NaiveDate::from_ymd_opt(2022, 10, 3));
    }

    #[test]
    fn test_parse_accepts_byte_order_mark() {
        let body = format!("\u{feff}{SAMPLE_DOCUMENT}");
        let table = parse_rate_document(&body).unwrap();
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_rate_document("this is not xml").is_err());
        assert!(parse_rate_document("").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_cube() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01">
	<gesmes:subject>Reference rates</gesmes:subject>
</gesmes:Envelope>"#;
        assert!(parse_rate_document(body).is_err());
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = create_mock_server(200, SAMPLE_DOCUMENT).await;
        let source = source_for(&mock_server);

        let table = source.fetch_rates().await.expect("Failed to fetch rates");
        assert_eq!(table.len(), 5);
        assert_eq!(table.rate_for("SEK"), Some(10.8743));
    }

    #[tokio::test]
    async fn test_rates_api_error_response() {
        let mock_server = create_mock_server(500, "").await;
        let source = source_for(&mock_server);

        let result = source.fetch_rates().await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            format!(
                "HTTP error: 500 Internal Server Error fetching rates from {}",
                source.url()
            )
        );
    }

    #[tokio::test]
    async fn test_rates_api_malformed_response() {
        let mock_server = create_mock_server(200, "<html><body>Maintenance</body></html>").await;
        let source = source_for(&mock_server);

        let result = source.fetch_rates().await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse rate document from")
        );
    }

    #[tokio::test]
    async fn test_rates_fetch_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/eurofxref-daily.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SAMPLE_DOCUMENT)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let source = EcbRateSource::new(
            &format!("{}/eurofxref-daily.xml", mock_server.uri()),
            Duration::from_millis(50),
        );
        let result = source.fetch_rates().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().starts_with("Request error"));
    }
}
