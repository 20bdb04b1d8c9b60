use serde::{Deserialize, Serialize};

use crate::error::{Result, ServeError};

pub const DEFAULT_MIN_LENGTH: u32 = 5;
pub const DEFAULT_MAX_LENGTH: u32 = 15;

/// Options accepted by the summarizer's `reconfigure`. Unset bounds fall back
/// to the defaults rather than keeping the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerOptions {
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
}

impl SummarizerOptions {
    pub fn new(min_length: u32, max_length: u32) -> Self {
        Self {
            min_length: Some(min_length),
            max_length: Some(max_length),
        }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ServeError::InvalidConfiguration(format!("summarizer options: {}", e)))
    }

    /// `(min_length, max_length)` with defaults applied
    pub fn bounds(&self) -> (u32, u32) {
        (
            self.min_length.unwrap_or(DEFAULT_MIN_LENGTH),
            self.max_length.unwrap_or(DEFAULT_MAX_LENGTH),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bounds_use_defaults() {
        let options = SummarizerOptions::from_value(serde_json::json!({"max_length": 40})).unwrap();
        assert_eq!(options.bounds(), (5, 40));
        assert_eq!(SummarizerOptions::default().bounds(), (5, 15));
    }

    #[test]
    fn negative_lengths_are_rejected() {
        let err = SummarizerOptions::from_value(serde_json::json!({"min_length": -1})).unwrap_err();
        assert!(matches!(err, ServeError::InvalidConfiguration(_)));
    }
}
