use std::time::Duration;

use axum::body::Bytes;
use uuid::Uuid;

use super::deployment::SummarizerCommand;
use super::options::SummarizerOptions;
use crate::error::Result;
use crate::serve::ReplicaSet;

/// Cloneable reference to the summarizer deployment
#[derive(Clone)]
pub struct SummarizerHandle {
    replicas: ReplicaSet<SummarizerCommand>,
    translator_timeout: Duration,
}

impl SummarizerHandle {
    /// `translator_timeout` is the bound the summarizer's replicas apply to
    /// their translator calls.
    pub fn new(replicas: ReplicaSet<SummarizerCommand>, translator_timeout: Duration) -> Self {
        Self {
            replicas,
            translator_timeout,
        }
    }

    /// Bound on `handle`: the summarizer's own request timeout plus the
    /// translator's, so a slow translator is reported as a translator timeout.
    pub fn handle_timeout(&self) -> Duration {
        self.replicas.request_timeout() + self.translator_timeout
    }

    pub fn num_replicas(&self) -> usize {
        self.replicas.num_replicas()
    }

    pub async fn summarize(&self, text: impl Into<String>) -> Result<String> {
        let text = text.into();
        self.replicas
            .call(|reply| SummarizerCommand::Summarize { text, reply })
            .await
    }

    pub async fn reconfigure(&self, options: SummarizerOptions) -> Result<()> {
        self.replicas
            .broadcast(|reply| SummarizerCommand::Reconfigure {
                options: options.clone(),
                reply,
            })
            .await?;
        Ok(())
    }

    /// Summarize a raw request body and return the translated summary
    pub async fn handle(&self, request_id: Uuid, body: Bytes) -> Result<String> {
        self.replicas
            .call_with_timeout(self.handle_timeout(), |reply| SummarizerCommand::Handle {
                request_id,
                body,
                reply,
            })
            .await
    }
}
