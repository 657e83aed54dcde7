use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, ScannerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    images: Vec<String>,
    options: &'a OllamaOptions,
}

#[derive(Debug, Deserialize)]
pub struct OllamaGenerateResponse {
    pub model: String,
    pub response: String,
    pub done: bool,
    pub total_duration: Option<i64>,
    pub eval_duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModel {
    pub name: String,
    pub size: i64,
    pub digest: String,
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModelsResponse {
    pub models: Vec<OllamaModel>,
}

/// Client for the Ollama generate API with image input
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    options: OllamaOptions,
}

impl OllamaClient {
    /// # Arguments
    /// * `base_url` - Base URL of Ollama API (e.g., "http://localhost:11434")
    /// * `model` - A vision capable model (e.g., "llava:7b")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        // Transcription wants the most literal output the model can give
        let options = OllamaOptions {
            temperature: Some(0.0),
            top_p: Some(0.9),
            top_k: Some(20),
            num_predict: Some(2048),
        };

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model about one base64 encoded image and return its raw answer
    pub async fn generate_from_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_base64: String,
    ) -> Result<String> {
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt: user_prompt,
            system: system_prompt,
            stream: false,
            images: vec![image_base64],
            options: &self.options,
        };

        tracing::info!(
            "Sending image to Ollama (model: {}, {} base64 chars)",
            self.model,
            request.images.iter().map(String::len).sum::<usize>()
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ScannerError::Recognizer(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScannerError::Recognizer(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let generated: OllamaGenerateResponse = response.json().await.map_err(|e| {
            ScannerError::Recognizer(format!("Failed to parse Ollama response: {}", e))
        })?;

        if let Some(total) = generated.total_duration {
            tracing::info!(
                "Ollama answered in {:.2}s with {} chars",
                total as f64 / 1_000_000_000.0,
                generated.response.len()
            );
        }

        Ok(generated.response)
    }

    pub async fn list_models(&self) -> Result<Vec<OllamaModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let models: OllamaModelsResponse = response.json().await?;
        Ok(models.models)
    }

    /// Check if Ollama service is available
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// Verify the configured model is pulled
    pub async fn verify_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.starts_with(&self.model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llava:7b").unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "llava:7b");
    }

    #[test]
    fn request_carries_the_image() {
        let options = OllamaOptions {
            temperature: Some(0.0),
            top_p: None,
            top_k: None,
            num_predict: None,
        };
        let request = OllamaGenerateRequest {
            model: "llava:7b",
            prompt: "read",
            system: "sys",
            stream: false,
            images: vec!["aGVsbG8=".to_string()],
            options: &options,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["images"][0], "aGVsbG8=");
        assert_eq!(json["stream"], false);
        assert!(json["options"].get("top_p").is_none());
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is running
    async fn test_ollama_health_check() {
        let client = OllamaClient::new("http://localhost:11434", "llava:7b").unwrap();
        assert!(client.health_check().await.unwrap());
    }
}
