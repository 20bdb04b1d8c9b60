use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::interface::{PipelineLoader, SummarizationPipeline, TranslationPipeline};
use crate::config::InferenceServiceConfig;
use crate::error::{Result, ServeError};
use crate::inference_service::{
    InferenceServiceClient, LoadPipelineRequest, SummarizationRequest, TranslationRequest,
};
use crate::translate::Language;

const SUMMARIZATION_TASK: &str = "summarization";

/// Summarization pipeline hosted by the inference service
pub struct RemoteSummarizationPipeline {
    client: Arc<InferenceServiceClient>,
    model: String,
}

#[async_trait]
impl SummarizationPipeline for RemoteSummarizationPipeline {
    async fn summarize(&self, text: &str, min_length: u32, max_length: u32) -> Result<String> {
        let request = SummarizationRequest {
            model: self.model.clone(),
            text: text.to_string(),
            min_length,
            max_length,
        };
        let candidates = self.client.summarize(request).await?;
        let first = candidates
            .into_iter()
            .next()
            .ok_or_else(|| ServeError::Inference("summarization returned no candidates".to_string()))?;
        debug!("Summary: {}", first.summary_text);
        Ok(first.summary_text)
    }
}

/// Translation pipeline hosted by the inference service
pub struct RemoteTranslationPipeline {
    client: Arc<InferenceServiceClient>,
    model: String,
    language: Language,
}

#[async_trait]
impl TranslationPipeline for RemoteTranslationPipeline {
    async fn translate(&self, text: &str) -> Result<String> {
        let request = TranslationRequest {
            task: self.language.pipeline_task().to_string(),
            model: self.model.clone(),
            text: text.to_string(),
        };
        let candidates = self.client.translate(request).await?;
        candidates
            .into_iter()
            .next()
            .map(|c| c.translation_text)
            .ok_or_else(|| {
                ServeError::Inference(format!("{} returned no candidates", self.language.pipeline_task()))
            })
    }
}

/// Loads pipelines by asking the inference service to initialise them
pub struct RemotePipelineLoader {
    client: Arc<InferenceServiceClient>,
    model: String,
}

impl RemotePipelineLoader {
    pub fn new(config: &InferenceServiceConfig) -> Result<Self> {
        info!(
            "Using inference service at {} with model {}",
            config.base_url, config.model
        );
        Ok(Self {
            client: Arc::new(InferenceServiceClient::new(config)?),
            model: config.model.clone(),
        })
    }

    async fn load(&self, task: &str) -> Result<()> {
        self.client
            .load_pipeline(LoadPipelineRequest {
                task: task.to_string(),
                model: self.model.clone(),
            })
            .await?;
        info!("Loaded pipeline {} ({})", task, self.model);
        Ok(())
    }
}

#[async_trait]
impl PipelineLoader for RemotePipelineLoader {
    async fn load_summarization(&self) -> Result<Arc<dyn SummarizationPipeline>> {
        self.load(SUMMARIZATION_TASK).await?;
        Ok(Arc::new(RemoteSummarizationPipeline {
            client: self.client.clone(),
            model: self.model.clone(),
        }))
    }

    async fn load_translation(&self, language: Language) -> Result<Arc<dyn TranslationPipeline>> {
        self.load(language.pipeline_task()).await?;
        Ok(Arc::new(RemoteTranslationPipeline {
            client: self.client.clone(),
            model: self.model.clone(),
            language,
        }))
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }
}
