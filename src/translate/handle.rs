use std::time::Duration;

use tracing::warn;

use super::deployment::TranslatorCommand;
use super::language::{Language, TranslatorOptions};
use crate::error::Result;
use crate::serve::ReplicaSet;

/// Cloneable reference to the translator deployment
#[derive(Clone)]
pub struct TranslatorHandle {
    replicas: ReplicaSet<TranslatorCommand>,
}

impl TranslatorHandle {
    pub fn new(replicas: ReplicaSet<TranslatorCommand>) -> Self {
        Self { replicas }
    }

    pub fn num_replicas(&self) -> usize {
        self.replicas.num_replicas()
    }

    pub fn request_timeout(&self) -> Duration {
        self.replicas.request_timeout()
    }

    pub async fn translate(&self, text: impl Into<String>) -> Result<String> {
        let text = text.into();
        self.replicas
            .call(|reply| TranslatorCommand::Translate { text, reply })
            .await
    }

    /// Apply `options` to every replica. Each replica loads the new pipeline
    /// first; the switch happens only once all of them have loaded it, so the
    /// replicas never disagree on the language after this returns.
    pub async fn reconfigure(&self, options: TranslatorOptions) -> Result<()> {
        let language = options.resolve()?;
        let prepared = self
            .replicas
            .broadcast(|reply| TranslatorCommand::Prepare { language, reply })
            .await;
        if let Err(e) = prepared {
            warn!("Translator reconfiguration to {} failed: {}", language, e);
            if let Err(abort) = self
                .replicas
                .broadcast(|reply| TranslatorCommand::Abort { reply })
                .await
            {
                warn!("Translator abort failed: {}", abort);
            }
            return Err(e);
        }
        self.replicas
            .broadcast(|reply| TranslatorCommand::Commit { reply })
            .await?;
        Ok(())
    }

    /// Language of the replica that serves this call
    pub async fn language(&self) -> Result<Language> {
        self.replicas
            .call(|reply| TranslatorCommand::Language { reply })
            .await
    }
}
