use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of translating a single text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResult {
    pub text: String,
    /// Lower-cased language code detected by the provider, if any.
    pub detected_source_language: Option<String>,
    pub billed_characters: u64,
}

/// A text translation provider.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang`.
    ///
    /// `source_lang` of `None` asks the provider to detect the language.
    async fn translate_text(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Result<TextResult>;
}

/// DeepL translate request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: Vec<&'a str>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
    show_billed_characters: bool,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
    #[serde(default)]
    billed_characters: Option<u64>,
}

const DEEPL_PRO_URL: &str = "https://api.deepl.com";
const DEEPL_FREE_URL: &str = "https://api-free.deepl.com";

/// Default API base URL for a key: free-tier keys end in `:fx`.
pub fn default_api_url(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        DEEPL_FREE_URL
    } else {
        DEEPL_PRO_URL
    }
}

/// DeepL REST API client
pub struct DeeplTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl DeeplTranslator {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate_text(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Result<TextResult> {
        let request = TranslateRequest {
            text: vec![text],
            target_lang: target_lang.to_uppercase(),
            source_lang: source_lang.map(str::to_uppercase),
            show_billed_characters: true,
        };

        let response = self
            .client
            .post(format!("{}/v2/translate", self.api_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send translation request to DeepL API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("DeepL API error ({}): {}", status, body);
        }

        let translate_response: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse DeepL translation response")?;

        let translation = translate_response
            .translations
            .into_iter()
            .next()
            .context("DeepL translation response contained no translations")?;

        Ok(TextResult {
            text: translation.text,
            detected_source_language: translation
                .detected_source_language
                .map(|lang| lang.to_lowercase()),
            billed_characters: translation.billed_characters.unwrap_or(0),
        })
    }
}
