//! HTTP fetcher for the analyzed page
//!
//! This module handles:
//! - Building the HTTP client shared by the page fetch and the link probes
//! - Validating the target URL before any network I/O
//! - Fetching the page body under a per-request timeout and the caller's
//!   cancellation token
//! - Decoding the body with the charset declared in `Content-Type`
//! - Classifying transport failures into `AnalysisError`

use crate::config::Config;
use crate::AnalysisError;
use encoding_rs::{Encoding, UTF_8};
use mime::Mime;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::borrow::Cow;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Maximum number of redirects followed by any request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// Content-Type header value, if any; its charset drives decoding
    pub content_type: Option<String>,

    /// Raw response body
    pub body: Vec<u8>,
}

/// Builds the HTTP client used for the page fetch and every link probe
///
/// Per-request timeouts are applied on each request rather than here, so
/// the page fetch and the probes can use different limits.
///
/// # Example
///
/// ```no_run
/// use site_analyzer::analyzer::build_http_client;
/// use site_analyzer::config::Config;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(config.http.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Checks that the target is an absolute http(s) URL
pub fn validate_target_url(target_url: &str) -> Result<Url, AnalysisError> {
    let url = Url::parse(target_url).map_err(|e| AnalysisError::InvalidRequest {
        url: target_url.to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AnalysisError::InvalidRequest {
            url: target_url.to_string(),
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Fetches the target page
///
/// # Failure Modes
///
/// | Condition | Error |
/// |-----------|-------|
/// | Unbuildable request | `InvalidRequest` |
/// | DNS / connect / TLS failure | `FetchFailed` (no status) |
/// | Request timeout | `FetchFailed` (no status) |
/// | Cancellation token fired | `FetchFailed` (no status) |
/// | Any status other than 200 | `FetchFailed` (with status) |
///
/// Nothing is retried.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<FetchedPage, AnalysisError> {
    let request = async {
        let response = client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AnalysisError::FetchFailed {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP error: {}", status),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok::<_, AnalysisError>(FetchedPage {
            final_url,
            content_type,
            body: body.to_vec(),
        })
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnalysisError::FetchFailed {
            url: url.to_string(),
            status: None,
            message: "deadline exceeded before the page was fetched".to_string(),
        }),
        result = request => result,
    }
}

impl FetchedPage {
    /// Decodes the body with the charset declared by the server
    pub fn decode(&self, url: &str) -> Result<Cow<'_, str>, AnalysisError> {
        decode_body(url, self.content_type.as_deref(), &self.body)
    }
}

/// Decodes a page body for parsing
///
/// The charset comes from a byte order mark if present, then from the
/// `Content-Type` parameter, and defaults to UTF-8; unknown labels also fall
/// back to UTF-8. The HTML parser itself recovers from any markup, so bytes
/// that are invalid in the chosen charset are the one way a fetched page can
/// fail to parse.
pub fn decode_body<'a>(
    url: &str,
    content_type: Option<&str>,
    body: &'a [u8],
) -> Result<Cow<'a, str>, AnalysisError> {
    let (encoding, bom_length) = match Encoding::for_bom(body) {
        Some((encoding, length)) => (encoding, length),
        None => (declared_encoding(content_type), 0),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(&body[bom_length..])
        .ok_or_else(|| AnalysisError::ParseFailed {
            url: url.to_string(),
            message: format!("body is not valid {}", encoding.name()),
        })
}

fn declared_encoding(content_type: Option<&str>) -> &'static Encoding {
    content_type
        .and_then(|value| value.parse::<Mime>().ok())
        .and_then(|mime| {
            mime.get_param(mime::CHARSET)
                .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
        })
        .unwrap_or(UTF_8)
}

fn classify_error(url: &str, error: reqwest::Error) -> AnalysisError {
    if error.is_builder() {
        return AnalysisError::InvalidRequest {
            url: url.to_string(),
            message: error.to_string(),
        };
    }

    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    };

    AnalysisError::FetchFailed {
        url: url.to_string(),
        status: error.status().map(|s| s.as_u16()),
        message,
    }
}
