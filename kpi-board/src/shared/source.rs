/// Spreadsheet values source
///
/// Fetches the KPI range from the Google Sheets values API. The controller only
/// sees the [`SheetSource`] trait, so tests and other hosts can feed grids directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::SyncError;
use crate::shared::layout::SHEET_RANGE;

/// Anything that can hand over the raw cell grid of the KPI range
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Rows × columns of raw cells; an empty grid is valid
    async fn fetch_rows(&self) -> Result<Vec<Vec<Value>>, SyncError>;
}

/// Sheets API client configuration
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// API root, e.g. `https://sheets.googleapis.com`
    pub base_url: String,
    /// Spreadsheet id from the sheet URL
    pub spreadsheet_id: String,
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Tab name; empty means the first tab
    pub sheet_name: String,
    /// A1 range inside the tab
    pub range: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: String::new(),
            api_key: String::new(),
            sheet_name: String::new(),
            range: SHEET_RANGE.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SheetsConfig {
    /// Create a new configuration for a spreadsheet
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read configuration from `SHEETS_*` environment variables.
    ///
    /// `SHEETS_SPREADSHEET_ID` and `SHEETS_API_KEY` are required.
    pub fn from_env() -> Result<Self, SyncError> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SyncError::Config(format!("{} is not set", name)))
        };

        let mut config = Self::new(required("SHEETS_SPREADSHEET_ID")?, required("SHEETS_API_KEY")?);
        if let Ok(name) = std::env::var("SHEETS_SHEET_NAME") {
            config = config.with_sheet_name(name);
        }
        if let Ok(range) = std::env::var("SHEETS_RANGE") {
            config = config.with_range(range);
        }
        if let Ok(base_url) = std::env::var("SHEETS_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Set tab name
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Set A1 range
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Set API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `Tab!A2:G17`, or just the range when no tab is named
    pub fn qualified_range(&self) -> String {
        let sheet_name = self.sheet_name.trim();
        if sheet_name.is_empty() {
            self.range.clone()
        } else {
            format!("{}!{}", sheet_name, self.range)
        }
    }

    /// Full values URL, including the API key
    pub fn values_url(&self) -> Result<Url, SyncError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SyncError::Config(format!("base url {:?}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| SyncError::Config(format!("base url {:?} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                self.qualified_range().as_str(),
            ]);
        url.query_pairs_mut().append_pair("key", &self.api_key);

        Ok(url)
    }
}

/// Successful values response. `values` is omitted when the range is empty.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<Value>>>,
}

/// Error envelope: `{"error": {"code": 403, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Decode a success body into the cell grid
pub fn parse_values_body(body: &str) -> Result<Vec<Vec<Value>>, SyncError> {
    let range: ValueRange = serde_json::from_str(body)?;
    Ok(range.values.unwrap_or_default())
}

/// Server-provided detail from an error body, if any
pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

/// [`SheetSource`] backed by the Sheets values API
#[derive(Debug, Clone)]
pub struct SheetsClient {
    config: SheetsConfig,
    http: reqwest::Client,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SyncError> {
        // Fail early on an unusable base url rather than on first refresh
        config.values_url()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_rows(&self) -> Result<Vec<Vec<Value>>, SyncError> {
        let url = self.config.values_url()?;
        // The url carries the API key, log the range instead
        debug!(
            spreadsheet = %self.config.spreadsheet_id,
            range = %self.config.qualified_range(),
            "fetching sheet values"
        );

        let response = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The status is the error; an unreadable body only loses the detail
            let body = response.text().await.unwrap_or_default();
            let error = SyncError::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            };
            warn!(%error, "sheet values request rejected");
            return Err(error);
        }

        let body = response.text().await?;
        let rows = parse_values_body(&body)?;
        info!(rows = rows.len(), "fetched sheet values");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_builder() {
        let config = SheetsConfig::new("sheet-123", "key-abc")
            .with_sheet_name("GCDC Test Sheet")
            .with_range("A2:G17")
            .with_base_url("http://127.0.0.1:8080")
            .with_request_timeout(Duration::from_secs(3));

        assert_eq!(config.spreadsheet_id, "sheet-123");
        assert_eq!(config.api_key, "key-abc");
        assert_eq!(config.qualified_range(), "GCDC Test Sheet!A2:G17");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_default_config() {
        let config = SheetsConfig::default();
        assert_eq!(config.base_url, "https://sheets.googleapis.com");
        assert_eq!(config.range, SHEET_RANGE);
        assert_eq!(config.qualified_range(), SHEET_RANGE);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_values_url_encodes_range() {
        let config = SheetsConfig::new("sheet-123", "key abc").with_sheet_name("GCDC Test Sheet");
        let url = config.values_url().unwrap();

        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/GCDC%20Test%20Sheet!A2:G17?key=key+abc"
        );
    }

    #[test]
    fn test_values_url_with_trailing_slash_base() {
        let config = SheetsConfig::new("id", "k").with_base_url("http://localhost:9000/");
        let url = config.values_url().unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/id/values/A2:G17");
    }

    #[test]
    fn test_values_url_rejects_bad_base() {
        let config = SheetsConfig::new("id", "k").with_base_url("not a url");
        assert!(matches!(config.values_url(), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_parse_values_body() {
        let rows = parse_values_body(r#"{"range":"A2:G17","values":[["Sales","$1,234"],[]]}"#).unwrap();
        assert_eq!(rows, vec![vec![json!("Sales"), json!("$1,234")], vec![]]);

        // Empty range omits values entirely
        assert!(parse_values_body(r#"{"range":"A2:G17"}"#).unwrap().is_empty());
        assert!(parse_values_body(r#"{"values":null}"#).unwrap().is_empty());

        assert!(matches!(parse_values_body("<html>"), Err(SyncError::Body(_))));
        assert!(matches!(parse_values_body(r#"{"values":"nope"}"#), Err(SyncError::Body(_))));
    }

    #[test]
    fn test_error_detail() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            error_detail(body),
            Some("The caller does not have permission".to_string())
        );
        assert_eq!(error_detail(r#"{"error":{"code":500}}"#), None);
        assert_eq!(error_detail("Bad Gateway"), None);
        assert_eq!(error_detail(""), None);
    }

    #[test]
    fn test_client_rejects_bad_config() {
        let config = SheetsConfig::new("id", "k").with_base_url("mailto:someone@example.com");
        assert!(matches!(SheetsClient::new(config), Err(SyncError::Config(_))));
    }

    /// Answer a single request with a canned raw HTTP response, then hang up
    async fn serve_once(response: String) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    /// Raw response whose Content-Length may claim more than `body` delivers
    fn http_response(status_line: &str, body: &str, content_length: usize) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line, content_length, body
        )
    }

    fn complete(status_line: &str, body: &str) -> String {
        http_response(status_line, body, body.len())
    }

    async fn fetch_from(response: String) -> Result<Vec<Vec<Value>>, SyncError> {
        let base_url = serve_once(response).await;
        let config = SheetsConfig::new("sheet-123", "key-abc").with_base_url(base_url);
        SheetsClient::new(config).unwrap().fetch_rows().await
    }

    #[tokio::test]
    async fn test_fetch_rows_maps_responses() {
        struct TestCase {
            response: String,
            expected: Result<Vec<Vec<Value>>, SyncError>,
        }

        let tests = vec![
            TestCase {
                // TC0: success body
                response: complete("200 OK", r#"{"values":[["Sales","$1,234"]]}"#),
                expected: Ok(vec![vec![json!("Sales"), json!("$1,234")]]),
            },
            TestCase {
                // TC1: rejection carries the server detail
                response: complete("403 Forbidden", r#"{"error":{"code":403,"message":"Bad API key"}}"#),
                expected: Err(SyncError::Http {
                    status: 403,
                    detail: Some("Bad API key".to_string()),
                }),
            },
            TestCase {
                // TC2: cut-off error body still reports the status
                response: http_response("503 Service Unavailable", "unavaila", 500),
                expected: Err(SyncError::Http {
                    status: 503,
                    detail: None,
                }),
            },
            TestCase {
                // TC3: non-JSON success body
                response: complete("200 OK", "<html>"),
                expected: Err(SyncError::Body(String::new())),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = fetch_from(test.response).await;
            match (&actual, &test.expected) {
                (Err(SyncError::Body(_)), Err(SyncError::Body(_))) => {}
                _ => assert_eq!(actual, test.expected, "TC{} failed", index),
            }
        }
    }

    #[tokio::test]
    async fn test_cut_off_error_body_message_has_status() {
        let error = fetch_from(http_response("503 Service Unavailable", "unavaila", 500))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "HTTP 503");
        assert!(!error.is_rejected());

        let error = fetch_from(complete("403 Forbidden", r#"{"error":{"message":"Bad API key"}}"#))
            .await
            .unwrap_err();
        assert!(error.is_rejected());
    }
}
