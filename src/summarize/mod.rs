pub mod deployment;
pub mod handle;
pub mod options;

pub use deployment::{Summarizer, SummarizerCommand};
pub use handle::SummarizerHandle;
pub use options::SummarizerOptions;
