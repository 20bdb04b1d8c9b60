use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServeError};

/// Target languages the translator can be configured for. Source text is
/// always English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    French,
    German,
    Romanian,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::French => "french",
            Language::German => "german",
            Language::Romanian => "romanian",
        }
    }

    /// Name of the pretrained pipeline task for English to this language
    pub fn pipeline_task(&self) -> &'static str {
        match self {
            Language::French => "translation_en_to_fr",
            Language::German => "translation_en_to_de",
            Language::Romanian => "translation_en_to_ro",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ServeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "french" => Ok(Language::French),
            "german" => Ok(Language::German),
            "romanian" => Ok(Language::Romanian),
            other => Err(ServeError::InvalidConfiguration(format!(
                "unsupported language '{}', expected one of french, german, romanian",
                other
            ))),
        }
    }
}

/// Options accepted by the translator's `reconfigure`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslatorOptions {
    #[serde(default)]
    pub language: Option<String>,
}

impl TranslatorOptions {
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
        }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ServeError::InvalidConfiguration(format!("translator options: {}", e)))
    }

    /// Resolve the requested language, defaulting to French when unset
    pub fn resolve(&self) -> Result<Language> {
        match &self.language {
            Some(name) => name.parse(),
            None => Ok(Language::default()),
        }
    }
}
