pub mod interface;
pub mod remote;

pub use interface::{PipelineLoader, SummarizationPipeline, TranslationPipeline};
pub use remote::{RemotePipelineLoader, RemoteSummarizationPipeline, RemoteTranslationPipeline};
