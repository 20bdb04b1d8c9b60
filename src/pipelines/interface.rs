use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::translate::Language;

/// A loaded summarization model
#[async_trait]
pub trait SummarizationPipeline: Send + Sync {
    /// Summarize `text`, returning the first candidate's summary
    async fn summarize(&self, text: &str, min_length: u32, max_length: u32) -> Result<String>;
}

/// A loaded English-to-X translation model
#[async_trait]
pub trait TranslationPipeline: Send + Sync {
    /// Translate `text`, returning the first candidate's translation
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Loads pipelines for deployments. Loading may be slow (weights are
/// fetched and initialised), so deployments call it only at startup and on
/// reconfiguration.
#[async_trait]
pub trait PipelineLoader: Send + Sync {
    async fn load_summarization(&self) -> Result<Arc<dyn SummarizationPipeline>>;

    async fn load_translation(&self, language: Language) -> Result<Arc<dyn TranslationPipeline>>;

    /// Whether the backing inference runtime is reachable
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
