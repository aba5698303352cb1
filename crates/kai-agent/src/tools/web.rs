//! `http.get`: a capped, timeout-bounded GET for http/https URLs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use kai_core::utils::truncate_bytes;

use super::base::{argument_or_raw, Tool};
use super::context::ToolContext;

/// User-Agent header.
const USER_AGENT: &str = concat!("kai/", env!("CARGO_PKG_VERSION"));

/// Max body bytes returned to the model.
pub const MAX_BODY_BYTES: usize = 8 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches a URL and returns the (truncated) response body as text.
pub struct HttpGetTool {
    client: Client,
}

impl HttpGetTool {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(5))
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpGetTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HttpGetTool {
    fn name(&self) -> &str {
        "http.get"
    }

    fn description(&self) -> &str {
        "Make a safe GET request to a URL. Only allows http/https URLs and returns text content."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The URL to fetch" }
            },
            "required": ["url"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: &str, _ctx: &mut ToolContext<'_>) -> anyhow::Result<String> {
        let url = argument_or_raw(input, "url");
        if url.is_empty() {
            anyhow::bail!("URL is required");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Only HTTP and HTTPS URLs are allowed");
        }

        debug!(url = %url, "fetching URL");

        let mut resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("HTTP request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Ok(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ));
        }

        // Stop reading once the cap is reached
        let mut body = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read response body: {e}"))?
        {
            body.extend_from_slice(&chunk);
            if body.len() >= MAX_BODY_BYTES {
                break;
            }
        }

        let text = String::from_utf8_lossy(&body);
        Ok(truncate_bytes(&text, MAX_BODY_BYTES).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let mut ctx = ToolContext::detached();
        let err = HttpGetTool::new()
            .execute(r#"{"url": "file:///etc/passwd"}"#, &mut ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Only HTTP and HTTPS"));

        assert!(HttpGetTool::new().execute("{}", &mut ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello from the server"))
            .mount(&server)
            .await;

        let mut ctx = ToolContext::detached();
        let input = json!({ "url": format!("{}/hello", server.uri()) }).to_string();
        let out = HttpGetTool::new().execute(&input, &mut ctx).await.unwrap();
        assert_eq!(out, "hello from the server");
    }

    #[tokio::test]
    async fn test_body_is_capped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(20_000)))
            .mount(&server)
            .await;

        let mut ctx = ToolContext::detached();
        // Raw URL input works too
        let out = HttpGetTool::new()
            .execute(&format!("{}/big", server.uri()), &mut ctx)
            .await
            .unwrap();
        assert_eq!(out.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_non_success_status_is_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut ctx = ToolContext::detached();
        let input = json!({ "url": format!("{}/missing", server.uri()) }).to_string();
        let out = HttpGetTool::new().execute(&input, &mut ctx).await.unwrap();
        assert_eq!(out, "HTTP 404: Not Found");
    }
}
