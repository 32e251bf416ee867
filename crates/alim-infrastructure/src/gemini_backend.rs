//! Gemini implementation of the scholar backend.
//!
//! Calls the `generateContent` REST endpoint with the configured system
//! instruction and the prior conversation history, and collects
//! grounding source URIs when search grounding is enabled.

use alim_core::chat::{ChatMessage, MessageRole, ScholarBackend, ScholarReply};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default model for scholar answers.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
/// Cheaper model for fast mode.
pub const FAST_MODEL: &str = "gemini-flash-lite-latest";
/// Model used when search grounding is requested.
pub const GROUNDED_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub system_instruction: String,
    /// Enables the search grounding tool; replies then carry source URIs.
    pub grounding: bool,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            system_instruction: system_instruction.into(),
            grounding: false,
        }
    }
}

/// Gemini-backed [`ScholarBackend`].
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize)]
struct WebSource {
    uri: Option<String>,
}

fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

#[async_trait]
impl ScholarBackend for GeminiBackend {
    async fn send(&self, history: &[ChatMessage], prompt: &str) -> Result<ScholarReply> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| Content {
                role: Some(wire_role(m.role).to_string()),
                parts: vec![Part {
                    text: m.text.clone(),
                }],
            })
            .collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        });

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: self.config.system_instruction.clone(),
                }],
            },
            contents,
            tools: if self.config.grounding {
                vec![Tool {
                    google_search: serde_json::Map::new(),
                }]
            } else {
                Vec::new()
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            API_BASE, self.config.model
        );
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, text));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let candidate = data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini returned no candidates"))?;

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Sorry, I could not generate a response.".to_string());

        let sources = candidate
            .grounding_metadata
            .map(|g| {
                g.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ScholarReply { text, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_the_wire_format() {
        assert_eq!(wire_role(MessageRole::User), "user");
        assert_eq!(wire_role(MessageRole::Assistant), "model");
    }

    #[test]
    fn grounded_response_parsing_collects_web_uris() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Zakat is "}, {"text": "an obligation."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://example.com/a"}},
                        {"web": {}},
                        {}
                    ]
                }
            }]
        }"#;

        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let candidate = parsed.candidates.into_iter().next().unwrap();
        let text: String = candidate
            .content
            .unwrap()
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(text, "Zakat is an obligation.");

        let sources: Vec<String> = candidate
            .grounding_metadata
            .unwrap()
            .grounding_chunks
            .into_iter()
            .filter_map(|c| c.web.and_then(|w| w.uri))
            .collect();
        assert_eq!(sources, vec!["https://example.com/a"]);
    }

    #[test]
    fn request_omits_tools_unless_grounding() {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: "You are a scholar.".to_string(),
                }],
            },
            contents: vec![],
            tools: Vec::new(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("tools"));
        assert!(json.contains("systemInstruction"));
    }
}
