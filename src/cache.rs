//! Run-scoped translation cache.
//!
//! Memoizes translations per (text, target locale) so identical strings are
//! sent to the provider at most once per run, accumulates billed characters,
//! and, when the source language is auto-detected, checks that every
//! detection agrees with the first one.

use crate::error::TranslateError;
use crate::translation::Translator;
use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

pub struct TranslationCache<T> {
    translator: T,
    source_lang: Option<String>,
    /// target locale -> source text -> translated text
    entries: HashMap<String, HashMap<String, String>>,
    detected_source_lang: Option<String>,
    billed_characters: u64,
    api_calls: usize,
    cache_hits: usize,
}

impl<T: Translator> TranslationCache<T> {
    /// `source_lang` of `None` means auto-detect.
    pub fn new(translator: T, source_lang: Option<String>) -> Self {
        Self {
            translator,
            source_lang,
            entries: HashMap::new(),
            detected_source_lang: None,
            billed_characters: 0,
            api_calls: 0,
            cache_hits: 0,
        }
    }

    /// Translate `text` into `target_lang`, reusing earlier results.
    ///
    /// Fails with [`TranslateError::SourceLanguageMismatch`] when auto-detection
    /// reports a different language than the first detection of the run.
    pub async fn translate(&mut self, text: &str, target_lang: &str) -> Result<String> {
        if let Some(cached) = self.entries.get(target_lang).and_then(|e| e.get(text)) {
            self.cache_hits += 1;
            debug!("Cache hit for \"{}\" ({})", text, target_lang);
            return Ok(cached.clone());
        }

        let result = self
            .translator
            .translate_text(text, self.source_lang.as_deref(), target_lang)
            .await?;

        self.api_calls += 1;
        self.billed_characters += result.billed_characters;

        if self.source_lang.is_none() {
            if let Some(detected) = result.detected_source_language.as_deref() {
                match &self.detected_source_lang {
                    None => self.detected_source_lang = Some(detected.to_string()),
                    Some(previous) if previous != detected => {
                        return Err(TranslateError::SourceLanguageMismatch {
                            detected: detected.to_string(),
                            previous: previous.clone(),
                        }
                        .into());
                    }
                    Some(_) => {}
                }
            }
        }

        self.entries
            .entry(target_lang.to_string())
            .or_default()
            .insert(text.to_string(), result.text.clone());

        Ok(result.text)
    }

    /// Total characters billed by the provider during this run.
    pub fn billed_characters(&self) -> u64 {
        self.billed_characters
    }

    /// Number of requests sent to the provider.
    pub fn api_calls(&self) -> usize {
        self.api_calls
    }

    /// Number of translations served from the cache.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// First source language detected during this run, if auto-detecting.
    pub fn detected_source_lang(&self) -> Option<&str> {
        self.detected_source_lang.as_deref()
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }
}
