use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::options::{SummarizerOptions, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use crate::error::{Result, ServeError};
use crate::pipelines::{PipelineLoader, SummarizationPipeline};
use crate::serve::{Replica, Reply};
use crate::translate::TranslatorHandle;

/// Owns one summarization pipeline and forwards summaries to the translator
pub struct Summarizer {
    translator: TranslatorHandle,
    pipeline: Arc<dyn SummarizationPipeline>,
    min_length: u32,
    max_length: u32,
    forwards: JoinSet<()>,
}

impl Summarizer {
    pub async fn new(translator: TranslatorHandle, loader: &dyn PipelineLoader) -> Result<Self> {
        let pipeline = loader.load_summarization().await?;
        Ok(Self {
            translator,
            pipeline,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            forwards: JoinSet::new(),
        })
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        self.pipeline
            .summarize(text, self.min_length, self.max_length)
            .await
    }

    /// Store the new bounds as given; they are not cross-checked
    pub fn reconfigure(&mut self, options: SummarizerOptions) {
        let (min_length, max_length) = options.bounds();
        if min_length > max_length {
            warn!(
                "Summarizer min_length {} exceeds max_length {}",
                min_length, max_length
            );
        }
        info!(
            "Summarizer length bounds set to {}..={}",
            min_length, max_length
        );
        self.min_length = min_length;
        self.max_length = max_length;
    }

    /// Decode a request body into the English source text
    pub fn decode_body(body: &[u8]) -> Result<String> {
        if body.is_empty() {
            return Err(ServeError::InvalidRequest("request body is empty".to_string()));
        }
        serde_json::from_slice::<String>(body).map_err(|e| {
            ServeError::InvalidRequest(format!("body must be a JSON string: {}", e))
        })
    }
}

pub enum SummarizerCommand {
    Summarize {
        text: String,
        reply: Reply<String>,
    },
    Reconfigure {
        options: SummarizerOptions,
        reply: Reply<()>,
    },
    Handle {
        request_id: Uuid,
        body: Bytes,
        reply: Reply<String>,
    },
}

#[async_trait]
impl Replica for Summarizer {
    type Command = SummarizerCommand;

    async fn handle(&mut self, command: SummarizerCommand) {
        match command {
            SummarizerCommand::Summarize { text, reply } => {
                let _ = reply.send(self.summarize(&text).await);
            }
            SummarizerCommand::Reconfigure { options, reply } => {
                self.reconfigure(options);
                let _ = reply.send(Ok(()));
            }
            SummarizerCommand::Handle {
                request_id,
                body,
                reply,
            } => {
                let span = info_span!("summarize_and_translate", %request_id);
                let summary = async {
                    let text = Self::decode_body(&body)?;
                    self.summarize(&text).await
                }
                .instrument(span.clone())
                .await;

                let summary = match summary {
                    Ok(summary) => summary,
                    Err(e) => {
                        let _ = reply.send(Err(e));
                        return;
                    }
                };

                // The translator call runs off the replica so the next
                // request can be summarized while this one is in flight.
                while self.forwards.try_join_next().is_some() {}
                let translator = self.translator.clone();
                self.forwards.spawn(
                    async move {
                        debug!("Forwarding summary to translator");
                        let _ = reply.send(translator.translate(summary).await);
                    }
                    .instrument(span),
                );
            }
        }
    }

    async fn drain(&mut self) {
        if !self.forwards.is_empty() {
            debug!("Waiting for {} forwarded translation(s)", self.forwards.len());
        }
        while self.forwards.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_must_be_a_json_string() {
        assert_eq!(
            Summarizer::decode_body(br#""The quick brown fox""#).unwrap(),
            "The quick brown fox"
        );
        assert!(matches!(
            Summarizer::decode_body(b""),
            Err(ServeError::InvalidRequest(_))
        ));
        assert!(matches!(
            Summarizer::decode_body(b"not json"),
            Err(ServeError::InvalidRequest(_))
        ));
        assert!(matches!(
            Summarizer::decode_body(br#"{"text": "hi"}"#),
            Err(ServeError::InvalidRequest(_))
        ));
    }
}
