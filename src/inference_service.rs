use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::InferenceServiceConfig;
use crate::error::{Result, ServeError};

/// HTTP client for the sidecar that hosts the pretrained pipelines
#[derive(Debug, Clone)]
pub struct InferenceServiceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadPipelineRequest {
    pub task: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadPipelineResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizationRequest {
    pub model: String,
    pub text: String,
    pub min_length: u32,
    pub max_length: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizationCandidate {
    pub summary_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub task: String,
    pub model: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationCandidate {
    pub translation_text: String,
}

impl InferenceServiceClient {
    pub fn new(config: &InferenceServiceConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn load_pipeline(&self, request: LoadPipelineRequest) -> Result<()> {
        let url = format!("{}/pipelines/load", self.base_url);
        debug!("Loading pipeline {} ({})", request.task, request.model);
        let response: LoadPipelineResponse = self.post(&url, &request).await?;
        if response.success {
            Ok(())
        } else {
            Err(ServeError::Inference(format!(
                "failed to load pipeline {}: {}",
                request.task,
                response.error.unwrap_or_else(|| "Unknown error".to_string())
            )))
        }
    }

    pub async fn summarize(&self, request: SummarizationRequest) -> Result<Vec<SummarizationCandidate>> {
        let url = format!("{}/pipelines/summarization", self.base_url);
        self.post(&url, &request).await
    }

    pub async fn translate(&self, request: TranslationRequest) -> Result<Vec<TranslationCandidate>> {
        let url = format!("{}/pipelines/translation", self.base_url);
        self.post(&url, &request).await
    }

    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServeError::Inference(format!(
                "{} returned {}: {}",
                url, status, text
            )));
        }
        Ok(response.json().await?)
    }
}
