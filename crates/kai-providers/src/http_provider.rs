//! OpenAI-compatible HTTP client.
//!
//! Talks to any `/chat/completions` endpoint (LM Studio, OpenAI, vLLM, ...).
//! Transient failures are retried inside a single `chat` call; the full JSON
//! response is kept as the completion's `raw` payload so tool calls can be
//! extracted later.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use kai_core::config::ProviderSettings;
use kai_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionResult, GenerationParams, Role,
    ToolCallRequest, ToolDefinition, Turn, WireMessage,
};
use kai_core::LlmError;

use crate::registry::{find_by_name, resolve_api_base, resolve_api_key, ProviderSpec};
use crate::retry::{with_retry, RetryPolicy};
use crate::traits::LlmClient;

// ─────────────────────────────────────────────
// OpenAiClient
// ─────────────────────────────────────────────

/// An [`LlmClient`] for any OpenAI-compatible chat completions API.
pub struct OpenAiClient {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"http://localhost:1234/v1"`).
    api_base: String,
    /// API key for Bearer authentication. `None` for local servers.
    api_key: Option<String>,
    /// Model sent with every request.
    model: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    retry: RetryPolicy,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client from provider settings and a preset.
    ///
    /// Settings win over the preset: `api_base` overrides the default base URL,
    /// a configured `api_key` overrides the preset's environment variable.
    pub fn new(settings: &ProviderSettings, spec: &'static ProviderSpec) -> anyhow::Result<Self> {
        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = settings.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(OpenAiClient {
            client,
            api_base: resolve_api_base(settings, spec),
            api_key: resolve_api_key(settings, spec),
            model: settings.model.clone(),
            extra_headers,
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                base_delay: Duration::from_millis(settings.retry_delay_ms),
            },
            spec,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn provider(&self) -> &'static ProviderSpec {
        self.spec
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.api_base.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.headers(self.extra_headers.clone());
        match self.api_key {
            Some(ref key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn build_request(
        &self,
        turns: &[Turn],
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> ChatCompletionRequest {
        let has_tools = !tools.is_empty();
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: wire_messages(turns),
            tools: has_tools.then(|| tools.to_vec()),
            tool_choice: has_tools.then(|| "auto".to_string()),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            stop: params.stop.clone(),
            stream: false,
        }
    }

    /// One HTTP round-trip, no retries.
    async fn send_once(&self, body: &ChatCompletionRequest) -> Result<CompletionResult, LlmError> {
        let response = self
            .authorize(self.client.post(self.completions_url()))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                LlmError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.spec.display_name,
                status = %status,
                body = %error_text,
                "API error"
            );
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        parse_completion(&text)
    }

    /// List model ids served by the endpoint (`GET {api_base}/models`).
    ///
    /// Returns an empty list if the endpoint is unreachable or answers with
    /// something unexpected.
    pub async fn list_models(&self) -> Vec<String> {
        #[derive(Deserialize)]
        struct ModelList {
            #[serde(default)]
            data: Vec<ModelEntry>,
        }

        #[derive(Deserialize)]
        struct ModelEntry {
            id: String,
        }

        let response = match self.authorize(self.client.get(self.models_url())).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(status = %resp.status(), "Model listing failed");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Model listing failed");
                return Vec::new();
            }
        };

        match response.json::<ModelList>().await {
            Ok(list) => list.data.into_iter().map(|m| m.id).collect(),
            Err(e) => {
                warn!(error = %e, "Unexpected model listing payload");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        turns: &[Turn],
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> Result<CompletionResult, LlmError> {
        debug!(
            provider = self.spec.display_name,
            model = %self.model,
            turns = turns.len(),
            tools = tools.len(),
            "Calling LLM"
        );

        let body = self.build_request(turns, tools, params);
        let result = with_retry(&self.retry, "chat_completion", || self.send_once(&body)).await?;

        debug!(
            provider = self.spec.display_name,
            chars = result.text.len(),
            total_tokens = result.usage.as_ref().and_then(|u| u.total_tokens),
            "LLM response received"
        );
        Ok(result)
    }

    fn extract_tool_calls(&self, result: &CompletionResult) -> Vec<ToolCallRequest> {
        result
            .raw
            .as_ref()
            .map(extract_openai_tool_calls)
            .unwrap_or_default()
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Request messages
// ─────────────────────────────────────────────

/// Prefix for tool results that can't be sent as `role: "tool"`.
pub const DETACHED_TOOL_RESULT_PREFIX: &str = "Tool result: ";

/// Convert prompt turns to wire messages.
///
/// A `tool` message is only accepted right after the assistant message whose
/// `tool_calls` carry its id. Results whose parent slid out of the memory
/// window, or whose call had no id, go out as user text after the matched
/// results of the same run.
pub fn wire_messages(turns: &[Turn]) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(turns.len());
    let mut open_ids: HashSet<&str> = HashSet::new();
    let mut detached: Vec<WireMessage> = Vec::new();

    for turn in turns {
        if turn.role() == Role::Tool {
            match turn.tool_call_id() {
                Some(id) if open_ids.remove(id) => messages.push(WireMessage::from(turn)),
                _ => detached.push(WireMessage {
                    role: Role::User.as_str().to_string(),
                    content: Some(format!("{DETACHED_TOOL_RESULT_PREFIX}{}", turn.content())),
                    tool_calls: None,
                    tool_call_id: None,
                }),
            }
            continue;
        }

        messages.append(&mut detached);
        open_ids = turn
            .tool_calls()
            .iter()
            .filter_map(|call| call.id.as_deref())
            .collect();
        messages.push(WireMessage::from(turn));
    }

    if !detached.is_empty() {
        debug!(count = detached.len(), "Sending detached tool results as text");
        messages.append(&mut detached);
    }
    messages
}

// ─────────────────────────────────────────────
// Payload parsing
// ─────────────────────────────────────────────

/// Parse a chat completions response body into a [`CompletionResult`].
///
/// The text is the first choice's content (`null` becomes `""`); the whole
/// body is kept as `raw`.
pub fn parse_completion(body: &str) -> Result<CompletionResult, LlmError> {
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::Malformed(format!("invalid JSON: {e}")))?;
    let response: ChatCompletionResponse = serde_json::from_value(raw.clone())
        .map_err(|e| LlmError::Malformed(format!("unexpected response shape: {e}")))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Malformed("response has no choices".to_string()))?;

    let mut result = CompletionResult::text(choice.message.content.unwrap_or_default()).with_raw(raw);
    result.usage = response.usage;
    Ok(result)
}

/// Read `choices[0].message.tool_calls` from an OpenAI-shaped payload.
///
/// Entries missing a function name are skipped; a missing or malformed list
/// yields no calls.
pub fn extract_openai_tool_calls(raw: &Value) -> Vec<ToolCallRequest> {
    let Some(calls) = raw
        .pointer("/choices/0/message/tool_calls")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    calls
        .iter()
        .filter_map(|call| {
            let function = call.get("function")?;
            let name = function.get("name")?.as_str()?;
            let arguments = match function.get("arguments") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                // Some servers send the arguments as an object instead of a string
                Some(other) => other.to_string(),
            };
            let mut request = ToolCallRequest::new(name, arguments);
            if let Some(id) = call.get("id").and_then(Value::as_str) {
                request = request.with_id(id);
            }
            Some(request)
        })
        .inspect(|call| debug!(tool = %call.name, "Extracted tool call"))
        .collect()
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an [`OpenAiClient`] for the preset named in the settings.
pub fn create_client(settings: &ProviderSettings) -> anyhow::Result<OpenAiClient> {
    let spec = find_by_name(&settings.name).with_context(|| {
        format!(
            "Unknown provider '{}'. Supported: lmstudio, openai.",
            settings.name
        )
    })?;

    if !spec.is_local && resolve_api_key(settings, spec).is_none() {
        warn!(
            provider = spec.display_name,
            env = spec.env_key.unwrap_or(""),
            "No API key configured"
        );
    }

    debug!(
        provider = spec.display_name,
        model = %settings.model,
        api_base = settings.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating LLM client"
    );

    OpenAiClient::new(settings, spec)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
