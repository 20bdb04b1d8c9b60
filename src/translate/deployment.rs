use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::language::Language;
use crate::error::Result;
use crate::pipelines::{PipelineLoader, TranslationPipeline};
use crate::serve::{Replica, Reply};

/// Owns one translation pipeline. The loaded pipeline always matches
/// `language`: a new language is staged by `prepare` and only takes effect
/// on `commit`, so a failed load or an unsupported language leaves both as
/// they were.
pub struct Translator {
    language: Language,
    pipeline: Arc<dyn TranslationPipeline>,
    loader: Arc<dyn PipelineLoader>,
    staged: Option<(Language, Arc<dyn TranslationPipeline>)>,
}

impl Translator {
    pub async fn new(loader: Arc<dyn PipelineLoader>) -> Result<Self> {
        let language = Language::default();
        let pipeline = loader.load_translation(language).await?;
        Ok(Self {
            language,
            pipeline,
            loader,
            staged: None,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn translate(&self, text: &str) -> Result<String> {
        self.pipeline.translate(text).await
    }

    /// Load the pipeline for `language` without switching to it. Selecting
    /// the current language stages nothing.
    pub async fn prepare(&mut self, language: Language) -> Result<()> {
        self.staged = None;
        if language == self.language {
            debug!("Translator already configured for {}", language);
            return Ok(());
        }
        let pipeline = self.loader.load_translation(language).await?;
        debug!("Translator staged {}", language);
        self.staged = Some((language, pipeline));
        Ok(())
    }

    /// Switch to the staged pipeline, if any
    pub fn commit(&mut self) {
        if let Some((language, pipeline)) = self.staged.take() {
            info!("Translator switched from {} to {}", self.language, language);
            self.language = language;
            self.pipeline = pipeline;
        }
    }

    /// Drop the staged pipeline, if any
    pub fn abort(&mut self) {
        if let Some((language, _)) = self.staged.take() {
            debug!("Translator dropped staged {}", language);
        }
    }
}

pub enum TranslatorCommand {
    Translate {
        text: String,
        reply: Reply<String>,
    },
    Prepare {
        language: Language,
        reply: Reply<()>,
    },
    Commit {
        reply: Reply<()>,
    },
    Abort {
        reply: Reply<()>,
    },
    Language {
        reply: Reply<Language>,
    },
}

#[async_trait]
impl Replica for Translator {
    type Command = TranslatorCommand;

    async fn handle(&mut self, command: TranslatorCommand) {
        match command {
            TranslatorCommand::Translate { text, reply } => {
                let _ = reply.send(self.translate(&text).await);
            }
            TranslatorCommand::Prepare { language, reply } => {
                let _ = reply.send(self.prepare(language).await);
            }
            TranslatorCommand::Commit { reply } => {
                self.commit();
                let _ = reply.send(Ok(()));
            }
            TranslatorCommand::Abort { reply } => {
                self.abort();
                let _ = reply.send(Ok(()));
            }
            TranslatorCommand::Language { reply } => {
                let _ = reply.send(Ok(self.language));
            }
        }
    }
}
