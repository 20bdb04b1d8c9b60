use std::sync::Arc;

use crate::pipelines::PipelineLoader;
use crate::summarize::SummarizerHandle;
use crate::translate::TranslatorHandle;

#[derive(Clone)]
pub struct AppState {
    pub summarizer: SummarizerHandle,
    pub translator: TranslatorHandle,
    pub loader: Arc<dyn PipelineLoader>,
}
