//! Summarize English text and translate the summary, served over HTTP.
//!
//! Two deployments run as replica tasks: a translator and a summarizer that
//! holds a handle to the translator. Model inference happens in an external
//! inference service reached through [`pipelines::PipelineLoader`].

pub mod config;
pub mod error;
pub mod inference_service;
pub mod pipelines;
pub mod routes;
pub mod serve;
pub mod state;
pub mod summarize;
pub mod translate;

pub use crate::config::Config;
pub use crate::error::{Result, ServeError};
pub use crate::serve::ServeRuntime;
