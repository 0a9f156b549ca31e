//! HTTP client for the Jira Cloud REST API (v3).

use crate::config::{JiraSettings, API_TOKEN_VAR};
use crate::error::{JiraError, JiraResult};
use base64::Engine;
use reqwest::{header, Client, RequestBuilder};
use serde_json::Value;
use tokio::sync::OnceCell;
use toolrelay_mcp::{ConfigError, ConfigSource};
use tracing::{debug, info, warn};
use url::Url;

const API_PREFIX: [&str; 3] = ["rest", "api", "3"];

/// Authenticated client bound to one Jira site.
///
/// Every request carries Basic auth and JSON headers. No retries: a failed
/// call surfaces as a [`JiraError`] right away.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: Client,
    base_url: Url,
}

impl JiraClient {
    pub fn new(settings: &JiraSettings) -> JiraResult<Self> {
        let mut headers = header::HeaderMap::new();

        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", settings.email, settings.api_token));
        let mut auth = header::HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|_| ConfigError::Invalid {
                key: API_TOKEN_VAR.to_string(),
                reason: "credentials contain characters not allowed in a header".to_string(),
            })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(concat!("toolrelay-jira/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    /// URL for `/rest/api/3/<segments..>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> JiraResult<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| JiraError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Execute a GET request.
    pub async fn get(&self, url: Url) -> JiraResult<Value> {
        debug!(url = %url, "GET request");
        self.send(self.client.get(url)).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post(&self, url: Url, body: &Value) -> JiraResult<Value> {
        debug!(url = %url, "POST request");
        self.send(self.client.post(url).json(body)).await
    }

    async fn send(&self, request: RequestBuilder) -> JiraResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(JiraError::from_response(status, &text));
        }

        Ok(parse_body(&text))
    }
}

/// Empty bodies become `{}`; non-JSON bodies are kept under `raw`.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Default::default());
    }

    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Response body is not JSON");
            serde_json::json!({ "raw": text })
        }
    }
}

/// Lazily-built client shared by every Jira tool.
///
/// Settings are read on first use, so a missing variable fails the first
/// invocation instead of the process start, and never reaches the network.
pub struct JiraConnection {
    source: ConfigSource,
    client: OnceCell<JiraClient>,
}

impl JiraConnection {
    pub fn new(source: ConfigSource) -> Self {
        Self {
            source,
            client: OnceCell::new(),
        }
    }

    pub async fn client(&self) -> JiraResult<&JiraClient> {
        self.client
            .get_or_try_init(|| async {
                let settings = JiraSettings::from_source(&self.source)?;
                info!(base_url = %settings.base_url, email = %settings.email, "Jira client configured");
                JiraClient::new(&settings)
            })
            .await
    }
}
