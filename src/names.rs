//! Generated table names.
//!
//! Naming is optional: a failure here is reported to the user and never
//! touches seating.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NamesConfig;
use crate::model::fold_case;

/// Produces `count` distinct short names on a theme.
#[async_trait]
pub trait NameGenerator: Send + Sync {
    async fn generate(&self, theme: &str, count: usize) -> Result<Vec<String>, NameError>;
}

/// Errors from name generation.
#[derive(Debug, Error)]
pub enum NameError {
    #[error("no API key; set GEMINI_API_KEY to generate table names")]
    MissingApiKey,

    #[error("http error: {0}")]
    Http(String),

    #[error("response error: {0}")]
    Response(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Response shape requested from the model.
type TableNames = Vec<String>;

/// Name generator backed by the Gemini `generateContent` API.
pub struct GeminiNameGenerator {
    client: reqwest::Client,
    config: NamesConfig,
    api_key: String,
}

impl GeminiNameGenerator {
    pub fn new(config: NamesConfig, api_key: Option<String>) -> Result<Self, NameError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(NameError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NameError::Http(e.to_string()))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.api_key
        )
    }
}

fn prompt(theme: &str, count: usize) -> String {
    format!(
        "Generate a list of {count} creative and distinct table names based on the theme: \"{theme}\".\n\
         Return ONLY the list of names as a JSON array of strings. Do not include numbering."
    )
}

fn response_schema() -> Result<serde_json::Value, NameError> {
    let mut schema = schemars::schema_for!(TableNames);
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    serde_json::to_value(schema).map_err(|e| NameError::Serialization(e.to_string()))
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseJsonSchema")]
    response_json_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait]
impl NameGenerator for GeminiNameGenerator {
    async fn generate(&self, theme: &str, count: usize) -> Result<Vec<String>, NameError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt(theme, count),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
                response_json_schema: response_schema()?,
            },
        };

        tracing::debug!(theme, count, model = %self.config.model, "requesting table names");

        let response = self
            .client
            .post(self.build_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| NameError::Http(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(NameError::Response(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| NameError::Http(e.without_url().to_string()))?;

        let parsed: GeminiResponse =
            serde_json::from_str(&text).map_err(|e| NameError::Serialization(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(NameError::Response(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        let content = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| NameError::Response("No content in response".to_string()))?;

        parse_names(&content, count)
    }
}

/// Parse a model reply holding a JSON array of strings.
///
/// Code fences are tolerated. Blank and repeated (case-insensitive) names
/// are dropped and the list is cut to `count`.
pub fn parse_names(content: &str, count: usize) -> Result<Vec<String>, NameError> {
    let body = content.trim();
    let body = body
        .strip_prefix("```json")
        .or_else(|| body.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(body);

    let raw: TableNames =
        serde_json::from_str(body.trim()).map_err(|e| NameError::Serialization(e.to_string()))?;

    let mut seen = HashSet::new();
    Ok(raw
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(fold_case(n)))
        .take(count)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_reported() {
        let err = GeminiNameGenerator::new(NamesConfig::default(), None).err();
        assert!(matches!(err, Some(NameError::MissingApiKey)));

        let err = GeminiNameGenerator::new(NamesConfig::default(), Some("  ".into())).err();
        assert!(matches!(err, Some(NameError::MissingApiKey)));
    }

    #[test]
    fn url_includes_model_and_key() {
        let generator =
            GeminiNameGenerator::new(NamesConfig::default(), Some("test-key".into())).unwrap();
        let url = generator.build_url();
        assert!(url.contains("gemini-2.5-flash:generateContent"));
        assert!(url.ends_with("key=test-key"));
    }

    #[test]
    fn parse_trims_dedupes_and_truncates() {
        let names = parse_names(r#"["Rose", " Lily ", "rose", "", "Tulip", "Iris"]"#, 3).unwrap();
        assert_eq!(names, ["Rose", "Lily", "Tulip"]);
    }

    #[test]
    fn parse_accepts_code_fence() {
        let names = parse_names("```json\n[\"Orion\", \"Lyra\"]\n```", 5).unwrap();
        assert_eq!(names, ["Orion", "Lyra"]);
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(matches!(
            parse_names(r#"{"names": []}"#, 2),
            Err(NameError::Serialization(_))
        ));
    }

    #[test]
    fn schema_describes_string_array() {
        let schema = response_schema().unwrap();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["type"], "string");
        assert!(schema.get("$schema").is_none());
    }

    #[tokio::test]
    async fn zero_count_skips_the_request() {
        let config = NamesConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..NamesConfig::default()
        };
        let generator = GeminiNameGenerator::new(config, Some("k".into())).unwrap();
        assert!(generator.generate("Flowers", 0).await.unwrap().is_empty());
    }
}
