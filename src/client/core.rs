// File: ./src/client/core.rs
// Generative Language API backend for reminder inference
use crate::client::cert::build_connector;
use crate::config::Config;
use crate::error::ReminderError;
use crate::reminder::CompletionBackend;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{Method, Request};
use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    /// Full JSON Schema; `responseSchema` only takes the OpenAPI subset,
    /// which has no `additionalProperties`.
    response_json_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: HttpsClient,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Result<Self, String> {
        if endpoint.is_empty() {
            return Err("No model endpoint configured.".to_string());
        }
        let uri: http::Uri = endpoint
            .parse()
            .map_err(|e: http::uri::InvalidUri| e.to_string())?;

        let https_connector = build_connector(uri.scheme_str())?;
        let http = Client::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let key = config.require_api_key()?;
        Self::new(&config.endpoint, &config.model, key)
            .map_err(anyhow::Error::msg)
    }

    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    async fn complete(&self, prompt: &str, output_schema: &Value) -> Result<String, ReminderError> {
        let payload = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_json_schema: output_schema,
            },
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ReminderError::unavailable(format!("encoding request: {}", e)))?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.generate_url())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .body(body)
            .map_err(|e| ReminderError::unavailable(e.to_string()))?;

        debug!(model = %self.model, "POST generateContent");
        let resp = self
            .http
            .request(req)
            .await
            .map_err(|e| ReminderError::unavailable(format!("request failed: {}", e)))?;

        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ReminderError::unavailable(format!("reading response: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            let detail = String::from_utf8_lossy(&bytes);
            warn!(%status, "model endpoint rejected request");
            return Err(ReminderError::unavailable(format!(
                "model endpoint answered {}: {}",
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let envelope: GenerateResponse = serde_json::from_slice(&bytes).map_err(|e| {
            ReminderError::unavailable(format!("unreadable response envelope: {}", e))
        })?;

        let Some(candidate) = envelope.candidates.into_iter().next() else {
            return Err(ReminderError::output("model returned no candidates"));
        };
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ReminderError::output(format!(
                "model returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_joins_model() {
        let client =
            GeminiClient::new("http://localhost:1234/v1beta/", "gemini-2.0-flash", "k").unwrap();
        assert_eq!(
            client.generate_url(),
            "http://localhost:1234/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        assert!(GeminiClient::new("", "m", "k").is_err());
    }

    #[test]
    fn endpoint_scheme_must_be_http_or_https() {
        assert!(GeminiClient::new("ftp://models.example/v1beta", "m", "k").is_err());
        assert!(GeminiClient::new("localhost:1234", "m", "k").is_err());
    }

    #[test]
    fn request_body_declares_schema() {
        let schema = crate::reminder::reminder_output_schema();
        let payload = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_json_schema: &schema,
            },
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(v["generationConfig"]["responseJsonSchema"], schema);
        assert_eq!(
            v["generationConfig"]["responseJsonSchema"]["additionalProperties"],
            false
        );
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
    }
}
