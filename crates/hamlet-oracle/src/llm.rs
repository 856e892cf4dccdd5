//! LLM backends behind the [`Oracle`] contract.
//!
//! Enum dispatch over the concrete backends keeps the engine free of trait
//! objects, which async methods cannot be. Both HTTP backends speak JSON over
//! `reqwest`; the offline variant fails every call so the cycle runs purely
//! on its fallbacks.

use crate::config::{BackendType, OracleConfig};
use crate::error::OracleError;
use crate::request::{Oracle, OracleRequest};
use crate::stub::StubOracle;

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An oracle backend selected from configuration.
pub enum LlmBackend {
    /// `OpenAI`-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
    /// No backend; every call fails with [`OracleError::Unavailable`].
    Offline(StubOracle),
}

impl Oracle for LlmBackend {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        match self {
            Self::OpenAi(backend) => backend.complete(request).await,
            Self::Anthropic(backend) => backend.complete(request).await,
            Self::Offline(stub) => stub.complete(request).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Offline(_) => "offline",
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for `OpenAI`-compatible chat completions APIs.
///
/// Posts to `{api_url}/chat/completions`; JSON-shaped tasks ask for a JSON
/// object response.
pub struct OpenAiBackend {
    http: HttpClient,
    model: String,
}

impl OpenAiBackend {
    /// A backend for `config`, authenticating with `api_key`.
    pub fn new(config: &OracleConfig, api_key: String) -> Self {
        Self {
            http: HttpClient::new(config, api_key, "OpenAI"),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.prompt.system},
                {"role": "user", "content": request.prompt.user},
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if request.task.expects_json()
            && let Some(fields) = body.as_object_mut()
        {
            fields.insert(
                "response_format".to_owned(),
                serde_json::json!({"type": "json_object"}),
            );
        }

        let bearer = format!("Bearer {}", self.http.api_key);
        let reply = self
            .http
            .post("chat/completions", &body, &[("Authorization", bearer.as_str())])
            .await?;
        openai_text(&reply)
    }
}

/// `choices[0].message.content` of a chat completions reply.
fn openai_text(reply: &serde_json::Value) -> Result<String, OracleError> {
    reply
        .pointer("/choices/0/message/content")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| OracleError::Parse("OpenAI reply has no choices[0].message.content".to_owned()))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Backend for the Anthropic Messages API.
///
/// The system prompt is a top-level field and the reply lives at
/// `content[0].text`.
pub struct AnthropicBackend {
    http: HttpClient,
    model: String,
}

impl AnthropicBackend {
    /// A backend for `config`, authenticating with `api_key`.
    pub fn new(config: &OracleConfig, api_key: String) -> Self {
        Self {
            http: HttpClient::new(config, api_key, "Anthropic"),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let body = serde_json::json!({
            "model": self.model,
            "system": request.prompt.system,
            "messages": [{"role": "user", "content": request.prompt.user}],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        let reply = self
            .http
            .post(
                "messages",
                &body,
                &[
                    ("x-api-key", self.http.api_key.as_str()),
                    ("anthropic-version", ANTHROPIC_VERSION),
                ],
            )
            .await?;
        anthropic_text(&reply)
    }
}

/// `content[0].text` of a Messages API reply.
fn anthropic_text(reply: &serde_json::Value) -> Result<String, OracleError> {
    reply
        .pointer("/content/0/text")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| OracleError::Parse("Anthropic reply has no content[0].text".to_owned()))
}

// ---------------------------------------------------------------------------
// Shared HTTP plumbing
// ---------------------------------------------------------------------------

/// A JSON-over-HTTP client bound to one base URL and credential.
struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    vendor: &'static str,
}

impl HttpClient {
    fn new(config: &OracleConfig, api_key: String, vendor: &'static str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_url().trim_end_matches('/').to_owned(),
            api_key,
            vendor,
        }
    }

    /// POST `body` to `{base_url}/{path}` and decode the JSON reply. Any
    /// non-2xx status is a transport failure carrying the response body.
    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<serde_json::Value, OracleError> {
        let vendor = self.vendor;
        let mut builder = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .header("Content-Type", "application/json")
            .json(body);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("{vendor} request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OracleError::Transport(format!(
                "{vendor} answered {status}: {detail}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| OracleError::Transport(format!("{vendor} reply was not JSON: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create a backend from configuration.
///
/// # Errors
///
/// Returns [`OracleError::Config`] when an HTTP backend has no credential.
pub fn create_backend(config: &OracleConfig) -> Result<LlmBackend, OracleError> {
    let key = || {
        config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                OracleError::Config(format!("no API key for the {:?} backend", config.backend))
            })
    };
    Ok(match config.backend {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config, key()?)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config, key()?)),
        BackendType::Offline => LlmBackend::Offline(StubOracle::new("offline backend")),
    })
}
