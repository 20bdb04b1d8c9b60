//! In-memory pipelines standing in for the inference service

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use transum::config::Config;
use transum::pipelines::{PipelineLoader, SummarizationPipeline, TranslationPipeline};
use transum::translate::Language;
use transum::{Result, ServeError};

pub const FOX: &str =
    "The quick brown fox jumps over the lazy dog many times each morning before breakfast.";

/// Keeps the first `max_length` words and records the bounds it was given
pub struct WordSummarizer {
    bounds: Arc<Mutex<Vec<(u32, u32)>>>,
}

#[async_trait]
impl SummarizationPipeline for WordSummarizer {
    async fn summarize(&self, text: &str, min_length: u32, max_length: u32) -> Result<String> {
        self.bounds.lock().unwrap().push((min_length, max_length));
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Err(ServeError::Inference("cannot summarize empty text".to_string()));
        }
        let take = (max_length as usize).min(words.len());
        Ok(words[..take].join(" "))
    }
}

/// Word-by-word dictionary translation; unknown words pass through
pub struct DictionaryTranslator {
    language: Language,
    delay: Option<Duration>,
}

fn lookup(language: Language, word: &str) -> Option<&'static str> {
    let table: &[(&str, &str)] = match language {
        Language::French => &[
            ("the", "le"),
            ("quick", "rapide"),
            ("brown", "brun"),
            ("fox", "renard"),
            ("jumps", "saute"),
            ("over", "par-dessus"),
            ("lazy", "paresseux"),
            ("dog", "chien"),
        ],
        Language::German => &[
            ("the", "der"),
            ("quick", "schnelle"),
            ("brown", "braune"),
            ("fox", "Fuchs"),
            ("jumps", "springt"),
            ("over", "über"),
            ("lazy", "faulen"),
            ("dog", "Hund"),
        ],
        Language::Romanian => &[
            ("the", "cel"),
            ("quick", "rapida"),
            ("brown", "maro"),
            ("fox", "vulpea"),
            ("jumps", "sare"),
            ("over", "peste"),
            ("lazy", "leneș"),
            ("dog", "câinele"),
        ],
    };
    let lower = word.to_lowercase();
    table.iter().find(|(en, _)| *en == lower).map(|(_, tr)| *tr)
}

#[async_trait]
impl TranslationPipeline for DictionaryTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(text
            .split_whitespace()
            .map(|word| lookup(self.language, word).unwrap_or(word))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

#[derive(Default, Clone)]
pub struct FakeLoader {
    loads: Arc<Mutex<Vec<String>>>,
    bounds: Arc<Mutex<Vec<(u32, u32)>>>,
    translation_delay: Option<Duration>,
    broken: Option<(Language, usize)>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation_delay(mut self, delay: Duration) -> Self {
        self.translation_delay = Some(delay);
        self
    }

    /// Loading this language fails
    pub fn with_broken_language(self, language: Language) -> Self {
        self.with_broken_language_after(language, 0)
    }

    /// Loading this language succeeds `successes` times, then fails
    pub fn with_broken_language_after(mut self, language: Language, successes: usize) -> Self {
        self.broken = Some((language, successes));
        self
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    /// `(min_length, max_length)` of every summarization call so far
    pub fn recorded_bounds(&self) -> Vec<(u32, u32)> {
        self.bounds.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineLoader for FakeLoader {
    async fn load_summarization(&self) -> Result<Arc<dyn SummarizationPipeline>> {
        self.loads.lock().unwrap().push("summarization".to_string());
        Ok(Arc::new(WordSummarizer {
            bounds: self.bounds.clone(),
        }))
    }

    async fn load_translation(&self, language: Language) -> Result<Arc<dyn TranslationPipeline>> {
        let task = language.pipeline_task();
        let mut loads = self.loads.lock().unwrap();
        if let Some((broken, successes)) = self.broken {
            let loaded = loads.iter().filter(|t| *t == task).count();
            if broken == language && loaded >= successes {
                return Err(ServeError::Inference(format!(
                    "failed to load pipeline {}",
                    task
                )));
            }
        }
        loads.push(task.to_string());
        Ok(Arc::new(DictionaryTranslator {
            language,
            delay: self.translation_delay,
        }))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translator.request_timeout_ms = 2_000;
    config.summarizer.request_timeout_ms = 5_000;
    config
}
