//! Gemini `generateContent` refiner.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result};
use crate::pipeline::refine::{format_refine_prompt, parse_refined_profile, RefinedProfile};
use crate::security::SecretString;
use crate::traits::refiner::Refiner;
use crate::types::{ExtractedFact, Identity};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

fn refine_error(reason: impl Into<String>) -> ExtractionError {
    ExtractionError::Refine {
        reason: reason.into(),
    }
}

/// First text part of the first candidate that has one.
fn reply_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    if let Some(err) = response.error {
        return Err(refine_error(err.message));
    }
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
        .ok_or_else(|| refine_error("response had no text candidates"))
}

/// Refines the knowledge base with a Gemini model.
pub struct GeminiRefiner {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiRefiner {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a raw prompt and return the model's text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose())])
            .json(&request)
            .send()
            .await
            .map_err(|e| refine_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| refine_error(e.to_string()))?;

        if !status.is_success() {
            let detail = reply_text(&body)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_default();
            return Err(refine_error(format!("HTTP {status} {detail}").trim_end().to_string()));
        }

        reply_text(&body)
    }
}

#[async_trait]
impl Refiner for GeminiRefiner {
    async fn refine(&self, identity: &Identity, facts: &[ExtractedFact]) -> Result<RefinedProfile> {
        if facts.is_empty() {
            return Ok(RefinedProfile::default());
        }

        info!(model = %self.model, facts = facts.len(), name = %identity.name(), "refining knowledge base");
        let reply = self.generate(&format_refine_prompt(facts)).await?;
        debug!(chars = reply.len(), "refiner replied");

        profile_from_reply(reply)
    }
}

/// Parse a reply, keeping the raw text on failure.
fn profile_from_reply(reply: String) -> Result<RefinedProfile> {
    match parse_refined_profile(&reply) {
        Ok(profile) => Ok(profile),
        Err(e) => {
            warn!(error = %e, "refiner reply is not a profile");
            Err(ExtractionError::UnparsableReply {
                reason: e.to_string(),
                raw: reply,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_reply_text_takes_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"finishReason": "SAFETY"},
                {"content": {"role": "model", "parts": [{"text": "{\"name\": \"Jane\"}"}]}}
            ]
        }"#;
        assert_eq!(reply_text(body).unwrap(), r#"{"name": "Jane"}"#);
    }

    #[test]
    fn test_reply_errors() {
        let err = reply_text(r#"{"error": {"code": 400, "message": "API key not valid"}}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Refine { ref reason } if reason == "API key not valid"));

        let err = reply_text(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Refine { .. }));

        assert!(matches!(reply_text("<html>").unwrap_err(), ExtractionError::JsonParse(_)));
    }

    #[test]
    fn test_unparsable_reply_is_kept() {
        let reply = "I'm sorry, I can't find reliable information about this person.";
        let err = profile_from_reply(reply.to_string()).unwrap_err();

        assert!(matches!(err, ExtractionError::UnparsableReply { .. }));
        assert_eq!(err.raw_reply(), Some(reply));

        let profile = profile_from_reply("```json\n{\"name\": \"Jane Doe\"}\n```".to_string()).unwrap();
        assert_eq!(profile.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_empty_knowledge_base_skips_request() {
        let refiner = GeminiRefiner::new("key").with_base_url("http://127.0.0.1:9");
        let profile = refiner.refine(&Identity::named("Jane Doe"), &[]).await.unwrap();
        assert!(profile.is_empty());
    }
}
