use std::sync::Arc;
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One request to the text generation service. Only the latest prompt
/// is sent, there is no conversation history.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionResponse {
    pub text: Option<String>,
}

impl CompletionResponse {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

/// A configured connection to a text completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate_content(&self, req: &CompletionRequest) -> Result<CompletionResponse, Error>;
}

/// Builds a client bound to a credential. Construction is async
/// because it may need to load or connect to the service first.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(&self, api_key: &str) -> Result<Arc<dyn CompletionClient>, Error>;
}

// {
//     "candidates": [{
//         "content": {
//             "parts": [{"text": "Hello"}],
//             "role": "model"
//         },
//         "finishReason": "STOP"
//     }],
//     "modelVersion": "gemini-3-flash-preview"
// }
#[derive(Debug, Deserialize, Serialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when there
    /// isn't any.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

pub async fn generate_content(
    http: &reqwest::Client,
    req: &CompletionRequest,
    api_hostname: &str,
    api_key: &str,
) -> Result<CompletionResponse, Error> {
    let payload = json!({
        "contents": [
            {"role": "user", "parts": [{"text": req.prompt}]}
        ],
        "systemInstruction": {
            "parts": [{"text": req.system_instruction}]
        },
    });
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        api_hostname.trim_end_matches("/"),
        req.model
    );
    let response = http
        .post(url)
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60))
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("Completion request failed with {}: {}", status, body));
    }

    let body: Value = response.json().await?;
    let parsed = serde_json::from_value::<GenerateContentResponse>(body.clone())
        .inspect_err(|e| tracing::error!("Parsing completion failed for {}\nError:{}", body, e))?;

    Ok(CompletionResponse {
        text: parsed.text(),
    })
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    api_hostname: String,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_hostname: &str, api_key: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate_content(&self, req: &CompletionRequest) -> Result<CompletionResponse, Error> {
        generate_content(&self.http, req, &self.api_hostname, &self.api_key).await
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClientFactory {
    api_hostname: String,
}

impl GeminiClientFactory {
    pub fn new(api_hostname: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
        }
    }
}

#[async_trait]
impl ClientFactory for GeminiClientFactory {
    async fn create(&self, api_key: &str) -> Result<Arc<dyn CompletionClient>, Error> {
        tracing::debug!("Creating Gemini client for {}", self.api_hostname);
        Ok(Arc::new(GeminiClient::new(&self.api_hostname, api_key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: "gemini-test".to_string(),
            prompt: prompt.to_string(),
            system_instruction: "Be brief.".to_string(),
        }
    }

    #[test]
    fn test_response_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"The library "},{"text":"is open."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), Some("The library is open.".to_string()));
    }

    #[test]
    fn test_response_text_missing() {
        let resp: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(resp.text(), None);

        let resp: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(resp.text(), None);

        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(resp.text(), None);
    }

    #[tokio::test]
    async fn test_generate_content_basic() {
        let mut server = mockito::Server::new_async().await;

        let response_body = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "The library is in building X."}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }"#;

        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Where is the library?"}]}],
                "systemInstruction": {"parts": [{"text": "Be brief."}]}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create();

        let client = GeminiClient::new(server.url().as_str(), "test-key");
        let result = client
            .generate_content(&request("Where is the library?"))
            .await;

        mock.assert();
        assert_eq!(
            result.unwrap(),
            CompletionResponse::new("The library is in building X.")
        );
    }

    #[tokio::test]
    async fn test_generate_content_empty_candidates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": []}"#)
            .create();

        let client = GeminiClient::new(server.url().as_str(), "test-key");
        let result = client.generate_content(&request("Hi")).await;

        mock.assert();
        assert_eq!(result.unwrap(), CompletionResponse::empty());
    }

    #[tokio::test]
    async fn test_generate_content_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(429)
            .with_body(r#"{"error": {"message": "quota"}}"#)
            .create();

        let client = GeminiClient::new(server.url().as_str(), "test-key");
        let result = client.generate_content(&request("Hi")).await;

        mock.assert();
        let err = result.unwrap_err().to_string();
        assert!(err.contains("429"));
    }

    #[tokio::test]
    async fn test_generate_content_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create();

        let client = GeminiClient::new(server.url().as_str(), "test-key");
        let result = client.generate_content(&request("Hi")).await;

        mock.assert();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_factory_builds_client() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "factory-key")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .create();

        let factory = GeminiClientFactory::new(&server.url());
        let client = factory.create("factory-key").await.unwrap();
        let result = client.generate_content(&request("Hi")).await.unwrap();

        mock.assert();
        assert_eq!(result.text.as_deref(), Some("ok"));
    }
}
