use lazy_static::lazy_static;
use log::{debug, trace};
use reqwest::{
    ClientBuilder, RequestBuilder, Response, StatusCode, Url,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for the FRA portal website. Answer questions about features, dashboards, and how to use the site. Keep responses concise and friendly.";

lazy_static! {
    pub static ref DEFAULT_BASE_URL: Url =
        Url::parse("https://generativelanguage.googleapis.com/v1beta/").unwrap();
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Missing GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Gemini request failed with status {status}")]
    Upstream { status: StatusCode, body: String },

    #[error("Sending request to Gemini: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Decoding Gemini response: {0}")]
    Decode(String),

    #[error("Malformed chat message: {0}")]
    Message(String),

    #[error("Invalid Gemini endpoint: {0}")]
    Endpoint(String),
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.clone(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, base_url: Option<&str>, model: Option<String>) -> Result<Self, GeminiError> {
        let base_url = match base_url {
            None => DEFAULT_BASE_URL.clone(),
            Some(raw) => {
                // Url::join drops the last path segment unless it ends with a slash.
                let raw = if raw.ends_with('/') {
                    raw.to_string()
                } else {
                    format!("{raw}/")
                };
                Url::parse(&raw).map_err(|e| GeminiError::Endpoint(e.to_string()))?
            }
        };

        Ok(GeminiConfig {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url,
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn endpoint(&self) -> Result<Url, GeminiError> {
        let key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| GeminiError::Endpoint(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A chat request as the portal's widget sends it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub system: Option<String>,
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl ChatRequest {
    /// A `messages` value that is not an array is an empty conversation.
    /// Inside the array every item must be an object; its fields are
    /// read leniently.
    pub fn from_value(body: &Value) -> Result<Self, GeminiError> {
        let messages: Vec<ChatMessage> = match body.get("messages") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, m)| match m {
                    Value::Object(fields) => Ok(ChatMessage {
                        role: text_of(fields.get("role")),
                        content: text_of(fields.get("content")),
                    }),
                    other => Err(GeminiError::Message(format!(
                        "messages[{}] is {}, expected an object",
                        i, other
                    ))),
                })
                .collect::<Result<_, _>>()?,
            _ => Vec::new(),
        };

        let system = body
            .get("system")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ChatRequest { messages, system })
    }

    pub fn system_instruction(&self) -> &str {
        self.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

#[derive(Serialize, Debug)]
struct NetPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct NetContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<NetPart<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NetGenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

const GENERATION_CONFIG: NetGenerationConfig = NetGenerationConfig {
    temperature: 0.4,
    top_k: 32,
    top_p: 0.95,
    max_output_tokens: 512,
};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NetGenerateRequest<'a> {
    contents: Vec<NetContent<'a>>,
    system_instruction: NetContent<'a>,
    generation_config: &'a NetGenerationConfig,
}

#[derive(Deserialize, Debug, Default)]
struct NetResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct NetResponseContent {
    #[serde(default)]
    parts: Vec<NetResponsePart>,
}

#[derive(Deserialize, Debug)]
struct NetCandidate {
    #[serde(default)]
    content: Option<NetResponseContent>,
}

#[derive(Deserialize, Debug)]
struct NetGenerateResponse {
    #[serde(default)]
    candidates: Vec<NetCandidate>,
}

impl NetGenerateResponse {
    fn reply(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .unwrap_or_default()
    }
}

fn gemini_role(role: &str) -> &str {
    match role {
        "assistant" => "model",
        "" => "user",
        other => other,
    }
}

fn build_request(request: &ChatRequest) -> NetGenerateRequest<'_> {
    NetGenerateRequest {
        contents: request
            .messages
            .iter()
            .map(|m| NetContent {
                role: Some(gemini_role(&m.role)),
                parts: vec![NetPart { text: &m.content }],
            })
            .collect(),
        system_instruction: NetContent {
            role: None,
            parts: vec![NetPart {
                text: request.system_instruction(),
            }],
        },
        generation_config: &GENERATION_CONFIG,
    }
}

/// Client for the `generateContent` endpoint.
pub struct GeminiSession {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiSession {
    pub fn new(cb: ClientBuilder, config: GeminiConfig) -> Result<Self, GeminiError> {
        let mut headers = HeaderMap::new();
        headers.append(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = cb
            .default_headers(headers)
            .build()
            .map_err(GeminiError::Transport)?;

        Ok(GeminiSession { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<String, GeminiError> {
        let endpoint = self.config.endpoint()?;
        let body = build_request(request);
        debug!(
            "Forwarding {} chat message(s) to model {}",
            request.messages.len(),
            self.config.model
        );

        let resp = Self::trace_send_request(self.client.post(endpoint).json(&body))
            .await
            .map_err(GeminiError::Transport)?;
        let status = resp.status();
        let text = Self::trace_body_for_response("generateContent", resp).await?;

        if !status.is_success() {
            return Err(GeminiError::Upstream { status, body: text });
        }

        let parsed: NetGenerateResponse =
            serde_json::from_str(&text).map_err(|e| GeminiError::Decode(e.to_string()))?;
        Ok(parsed.reply())
    }

    async fn trace_body_for_response(operation: &str, resp: Response) -> Result<String, GeminiError> {
        debug!("{} status code: {}", operation, resp.status());
        let body = resp.text().await.map_err(GeminiError::Transport)?;
        trace!("{} response body: {}", operation, body);
        Ok(body)
    }

    fn trace_send_request(
        request: RequestBuilder,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> {
        trace!("Sending request: {:?}", &request);
        request.send()
    }
}
