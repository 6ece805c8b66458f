// Measurement service HTTP client
//
// Wraps `reqwest::Client` with URL construction, status mapping, and JSON
// decoding. Endpoint methods live in `telemetry` (reads) and `control`
// (writes) as inherent impls so this module stays about transport.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Maximum number of body bytes carried into error messages.
const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for the measurement service's `/api` surface.
///
/// Every call is a single request: no retries, no caching. Callers in
/// `netpulse-core` decide whether a failure is masked or surfaced.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the service root, e.g. `http://192.168.1.2:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: Url,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let body = self.ensure_success(endpoint, resp).await?;
        decode(&body)
    }

    /// Send a POST request with an optional JSON body; the response body is
    /// ignored on success.
    pub(crate) async fn post(
        &self,
        endpoint: &str,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let mut builder = self.http.post(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;

        self.ensure_success(endpoint, resp).await.map(|_| ())
    }

    /// Read the body, turning any non-2xx status into `Error::Http`.
    async fn ensure_success(
        &self,
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        trace!(endpoint, %status, bytes = body.len(), "response received");

        if status.is_success() {
            return Ok(body);
        }

        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        } else {
            preview(&body).to_owned()
        };

        Err(Error::Http {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
            message,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Truncate to at most `BODY_PREVIEW` bytes on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW {
        return body;
    }
    let mut end = BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
