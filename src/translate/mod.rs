pub mod deployment;
pub mod handle;
pub mod language;

pub use deployment::{Translator, TranslatorCommand};
pub use handle::TranslatorHandle;
pub use language::{Language, TranslatorOptions};
