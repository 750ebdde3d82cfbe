//! HTTP transport to the remote accounting engine.
//!
//! Every call checks the posting settings first; a failed precondition is a
//! [`TallyError::Configuration`] and no request is made.

use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{header, Client};
use tracing::{debug, warn};

use retailpos_accounting::PostingSettings;

use super::xml;

/// Characters of a raw response quoted in protocol errors.
const RESPONSE_SNIPPET_CHARS: usize = 300;

static COMPANY_NAME_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<COMPANYNAME\b[^>]*>(.*?)</COMPANYNAME>").expect("valid regex")
});

static COMPANY_NAME_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<COMPANY\b[^>]*>\s*<NAME\b[^>]*>(.*?)</NAME>").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TallyError {
    /// Integration disabled or missing endpoint/company.
    #[error("accounting integration not configured: {0}")]
    Configuration(String),
    /// Timeout, connection failure or non-success HTTP status.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// A response arrived but could not be understood.
    #[error("unexpected response from accounting engine: {0}")]
    Protocol(String),
}

impl TallyError {
    fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Blocking-per-call client. `connect_timeout` bounds connection set-up and
/// `read_timeout` bounds each wait for response bytes.
#[derive(Debug, Clone)]
pub struct TallyClient {
    http: Client,
}

impl TallyClient {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, TallyError> {
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| TallyError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap ledger-master messages in an "All Masters" envelope and post them.
    pub async fn push_masters(
        &self,
        settings: &PostingSettings,
        inner_xml: &str,
    ) -> Result<String, TallyError> {
        let url = require_endpoint(settings)?;
        let company = settings.company().ok_or_else(|| {
            TallyError::Configuration("company name is required to push masters".to_string())
        })?;
        self.post(url, xml::build_master_envelope(company, inner_xml)).await
    }

    /// Wrap voucher messages in a "Vouchers" envelope and post them.
    pub async fn push_vouchers(
        &self,
        settings: &PostingSettings,
        inner_xml: &str,
    ) -> Result<String, TallyError> {
        let url = require_endpoint(settings)?;
        let company = settings.company().unwrap_or_default();
        self.post(url, xml::build_voucher_envelope(company, inner_xml)).await
    }

    /// Post a caller-built envelope unchanged (diagnostics).
    pub async fn push_raw_envelope(
        &self,
        settings: &PostingSettings,
        envelope: &str,
    ) -> Result<String, TallyError> {
        let url = require_endpoint(settings)?;
        self.post(url, envelope.to_string()).await
    }

    /// Names of the companies loaded in the remote engine, sorted and distinct.
    pub async fn list_companies(&self, settings: &PostingSettings) -> Result<Vec<String>, TallyError> {
        let url = require_endpoint(settings)?;
        let body = self.post(url, xml::list_companies_request().to_string()).await?;
        parse_company_names(&body)
    }

    async fn post(&self, url: &str, body: String) -> Result<String, TallyError> {
        debug!(url, bytes = body.len(), "posting to accounting engine");

        let resp = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| TallyError::transport(url, describe(&e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TallyError::transport(url, describe(&e)))?;

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "accounting engine rejected request");
            return Err(TallyError::transport(
                url,
                format!("HTTP {}: {}", status.as_u16(), snippet(&text)),
            ));
        }

        debug!(url, status = status.as_u16(), "accounting engine replied");
        Ok(text)
    }
}

fn require_endpoint(settings: &PostingSettings) -> Result<&str, TallyError> {
    if !settings.enabled {
        return Err(TallyError::Configuration(
            "accounting integration is disabled".to_string(),
        ));
    }
    let url = settings.endpoint();
    if url.is_empty() {
        return Err(TallyError::Configuration("endpoint URL is not set".to_string()));
    }
    Ok(url)
}

fn describe(err: &reqwest::Error) -> String {
    if is_timeout(err) {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

/// reqwest reports read timeouts as an I/O `TimedOut` somewhere in the source chain.
fn is_timeout(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
        {
            return true;
        }
        source = cause.source();
    }
    false
}

fn snippet(body: &str) -> String {
    body.chars().take(RESPONSE_SNIPPET_CHARS).collect()
}

/// Decoded name with control characters (e.g. `&#4;` markers) removed.
fn company_name(raw: &str) -> String {
    let decoded: String = xml::unescape(raw).chars().filter(|c| !c.is_control()).collect();
    decoded.trim().to_string()
}

/// Extract company names from a "List of Companies" response.
///
/// Tries `<COMPANYNAME>` tags first and falls back to `<COMPANY><NAME>`
/// blocks.
pub fn parse_company_names(body: &str) -> Result<Vec<String>, TallyError> {
    let collect = |re: &Regex| -> BTreeSet<String> {
        re.captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| company_name(m.as_str()))
            .filter(|name| !name.is_empty())
            .collect()
    };

    let mut names = collect(&COMPANY_NAME_TAG);
    if names.is_empty() {
        names = collect(&COMPANY_NAME_BLOCK);
    }
    if names.is_empty() {
        return Err(TallyError::Protocol(format!(
            "no company names found in response: {}",
            snippet(body)
        )));
    }
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> TallyClient {
        TallyClient::new(Duration::from_secs(2), Duration::from_secs(5)).unwrap()
    }

    fn settings(endpoint: &str) -> PostingSettings {
        PostingSettings {
            enabled: true,
            endpoint_url: format!("{endpoint}/"),
            company_name: "Corner Shop".to_string(),
            ..PostingSettings::default()
        }
    }

    #[test]
    fn company_tags_are_trimmed_distinct_and_sorted() {
        let body = "<ENVELOPE><COMPANYNAME> Zeta </COMPANYNAME><COMPANYNAME></COMPANYNAME>\
                    <COMPANYNAME>Alpha &amp; Co</COMPANYNAME><COMPANYNAME>Zeta</COMPANYNAME></ENVELOPE>";
        assert_eq!(parse_company_names(body).unwrap(), vec!["Alpha & Co", "Zeta"]);
    }

    #[test]
    fn numeric_references_in_company_names_are_decoded() {
        let body = "<ENVELOPE><COMPANYNAME>&#4; R &#38; D Stores</COMPANYNAME>\
                    <COMPANYNAME>R &amp; D Stores</COMPANYNAME><COMPANYNAME>&#4;</COMPANYNAME></ENVELOPE>";
        assert_eq!(parse_company_names(body).unwrap(), vec!["R & D Stores"]);
    }

    #[test]
    fn company_blocks_are_used_as_fallback() {
        let body = "<ENVELOPE><COMPANY NAME=\"B\" RESERVEDNAME=\"\">\n  <NAME TYPE=\"String\">Beta</NAME></COMPANY>\
                    <COMPANY><NAME>Alpha</NAME></COMPANY></ENVELOPE>";
        assert_eq!(parse_company_names(body).unwrap(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn unrecognised_response_is_a_protocol_error_with_snippet() {
        let body = format!("<RESPONSE>{}</RESPONSE>", "x".repeat(1000));
        match parse_company_names(&body).unwrap_err() {
            TallyError::Protocol(msg) => {
                assert!(msg.contains("<RESPONSE>xxx"));
                assert!(msg.len() < 400);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_settings_fail_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut s = settings(&server.uri());
        s.enabled = false;
        let err = client().push_vouchers(&s, "<X/>").await.unwrap_err();
        assert!(matches!(err, TallyError::Configuration(_)));
    }

    #[tokio::test]
    async fn masters_require_a_company() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut s = settings(&server.uri());
        s.company_name = "  ".to_string();
        let err = client().push_masters(&s, "<X/>").await.unwrap_err();
        assert!(matches!(err, TallyError::Configuration(msg) if msg.contains("company")));
    }

    #[tokio::test]
    async fn vouchers_are_posted_as_xml_inside_the_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "text/xml; charset=utf-8"))
            .and(body_string_contains("<REPORTNAME>Vouchers</REPORTNAME>"))
            .and(body_string_contains("<SVCURRENTCOMPANY>Corner Shop</SVCURRENTCOMPANY>"))
            .and(body_string_contains("<REQUESTDATA><X/></REQUESTDATA>"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<RESPONSE>ok</RESPONSE>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .push_vouchers(&settings(&server.uri()), "<X/>")
            .await
            .unwrap();
        assert_eq!(body, "<RESPONSE>ok</RESPONSE>");
    }

    #[tokio::test]
    async fn non_success_status_names_the_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client()
            .push_masters(&settings(&server.uri()), "<X/>")
            .await
            .unwrap_err();
        match err {
            TallyError::Transport { url, message } => {
                assert_eq!(url, server.uri());
                assert!(message.contains("500"));
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reply_slower_than_read_timeout_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = TallyClient::new(Duration::from_secs(1), Duration::from_millis(200)).unwrap();
        let err = client
            .push_raw_envelope(&settings(&server.uri()), "<ENVELOPE/>")
            .await
            .unwrap_err();
        assert!(matches!(err, TallyError::Transport { message, .. } if message.contains("timed out")));
    }

    #[tokio::test]
    async fn list_companies_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("List of Companies"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<ENVELOPE><COMPANYNAME>Shop B</COMPANYNAME><COMPANYNAME>Shop A</COMPANYNAME></ENVELOPE>",
            ))
            .mount(&server)
            .await;

        let mut s = settings(&server.uri());
        s.company_name.clear();
        let names = client().list_companies(&s).await.unwrap();
        assert_eq!(names, vec!["Shop A", "Shop B"]);
    }
}
