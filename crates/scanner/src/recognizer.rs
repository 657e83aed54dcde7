use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;
use crate::ollama_client::OllamaClient;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llava:7b";

/// Turns a prepared scoreboard image into plain text, one row per line
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, png: &[u8]) -> Result<String>;
}

/// Characters a scoreboard transcript may contain
pub fn is_whitelisted(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '#' | '_' | ' ' | '\n')
}

/// Drop everything outside the whitelist, turning tabs into spaces
pub fn apply_whitelist(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| is_whitelisted(*c))
        .collect()
}

const SYSTEM_PROMPT: &str = r#"You transcribe game scoreboards.
The image shows white text on a black background, one player per row.
Copy every row exactly as written, left to right, one row per line.
Separate columns with a single space.
Only use letters, digits, '#', '_' and spaces.
Do not add explanations, headers or formatting."#;

const USER_PROMPT: &str = "Transcribe this scoreboard.";

pub struct OllamaRecognizer {
    client: OllamaClient,
}

impl OllamaRecognizer {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new(base_url, model)?,
        })
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }
}

#[async_trait]
impl TextRecognizer for OllamaRecognizer {
    async fn recognize(&self, png: &[u8]) -> Result<String> {
        let encoded = STANDARD.encode(png);
        let raw = self
            .client
            .generate_from_image(SYSTEM_PROMPT, USER_PROMPT, encoded)
            .await?;

        Ok(apply_whitelist(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_keeps_gamertag_characters() {
        assert_eq!(apply_whitelist("Kr4ken#1234 12 3 900"), "Kr4ken#1234 12 3 900");
        assert_eq!(apply_whitelist("snake_case\tNAME"), "snake_case NAME");
    }

    #[test]
    fn whitelist_strips_punctuation_but_keeps_rows() {
        assert_eq!(
            apply_whitelist("| Alpha | 5 | 1 | 300 |\n* Bravo: 2, 0, 100"),
            " Alpha  5  1  300 \n Bravo 2 0 100"
        );
    }
}
