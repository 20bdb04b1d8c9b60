use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::replica::{CallOptions, ReplicaSet};
use crate::config::{Config, DeploymentConfig};
use crate::error::{Result, ServeError};
use crate::pipelines::PipelineLoader;
use crate::state::AppState;
use crate::summarize::{Summarizer, SummarizerHandle, SummarizerOptions};
use crate::translate::{Translator, TranslatorHandle, TranslatorOptions};

/// The running deployment graph: translator replicas, summarizer replicas
/// bound to the translator, and the tasks hosting them.
pub struct ServeRuntime {
    translator: TranslatorHandle,
    summarizer: SummarizerHandle,
    loader: Arc<dyn PipelineLoader>,
    translator_tasks: Tasks,
    summarizer_tasks: Tasks,
}

/// Replica tasks of one deployment and the signal that stops them
struct Tasks {
    deployment: &'static str,
    shutdown: watch::Sender<bool>,
    set: JoinSet<()>,
}

impl Tasks {
    fn new(deployment: &'static str) -> (Self, watch::Receiver<bool>) {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let tasks = Self {
            deployment,
            shutdown,
            set: JoinSet::new(),
        };
        (tasks, shutdown_rx)
    }

    async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        while let Some(joined) = self.set.join_next().await {
            if let Err(e) = joined {
                warn!("{} replica task ended abnormally: {}", self.deployment, e);
            }
        }
        debug!("{} stopped", self.deployment);
    }
}

impl ServeRuntime {
    /// Build both deployments and apply their configured `user_config`
    pub async fn start(config: &Config, loader: Arc<dyn PipelineLoader>) -> Result<Self> {
        check_replicas("translator", &config.translator)?;
        check_replicas("summarizer", &config.summarizer)?;

        let mut translators = Vec::with_capacity(config.translator.num_replicas);
        for _ in 0..config.translator.num_replicas {
            translators.push(Translator::new(loader.clone()).await?);
        }
        let (mut translator_tasks, shutdown_rx) = Tasks::new("translator");
        let translator = TranslatorHandle::new(ReplicaSet::start(
            "translator",
            translators,
            CallOptions::from(&config.translator),
            shutdown_rx,
            &mut translator_tasks.set,
        ));
        if let Some(user_config) = &config.translator.user_config {
            translator
                .reconfigure(TranslatorOptions::from_value(user_config.clone())?)
                .await?;
        }

        let mut summarizers = Vec::with_capacity(config.summarizer.num_replicas);
        for _ in 0..config.summarizer.num_replicas {
            summarizers.push(Summarizer::new(translator.clone(), loader.as_ref()).await?);
        }
        let (mut summarizer_tasks, shutdown_rx) = Tasks::new("summarizer");
        let summarizer = SummarizerHandle::new(
            ReplicaSet::start(
                "summarizer",
                summarizers,
                CallOptions::from(&config.summarizer),
                shutdown_rx,
                &mut summarizer_tasks.set,
            ),
            translator.request_timeout(),
        );
        if let Some(user_config) = &config.summarizer.user_config {
            summarizer
                .reconfigure(SummarizerOptions::from_value(user_config.clone())?)
                .await?;
        }

        info!("Deployments ready");
        Ok(Self {
            translator,
            summarizer,
            loader,
            translator_tasks,
            summarizer_tasks,
        })
    }

    pub fn translator(&self) -> &TranslatorHandle {
        &self.translator
    }

    pub fn summarizer(&self) -> &SummarizerHandle {
        &self.summarizer
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            summarizer: self.summarizer.clone(),
            translator: self.translator.clone(),
            loader: self.loader.clone(),
        }
    }

    /// Stop every replica. A command already being processed runs to
    /// completion; queued commands are dropped and their callers see
    /// `DeploymentUnavailable`. Summarizers stop first and wait for the
    /// translations they forwarded, so translators stop last.
    pub async fn shutdown(self) {
        info!("Stopping deployments");
        self.summarizer_tasks.stop().await;
        self.translator_tasks.stop().await;
        info!("Deployments stopped");
    }
}

fn check_replicas(deployment: &str, config: &DeploymentConfig) -> Result<()> {
    if config.num_replicas == 0 {
        return Err(ServeError::InvalidConfiguration(format!(
            "{} needs at least one replica",
            deployment
        )));
    }
    Ok(())
}
