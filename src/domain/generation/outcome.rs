//! Result wrapper for question generation.

use serde::Serialize;
use std::fmt;

use crate::domain::questionnaire::QuestionSet;

/// Where a question set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    /// Produced by the provider and validated.
    Provider,
    /// Static catalog data.
    Fallback,
}

impl fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionSource::Provider => f.write_str("provider"),
            QuestionSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// A degradation observed while generating a set.
///
/// None of these reach the caller as an error; they ride along with the
/// outcome so callers can tell a degraded result from a clean one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// No provider credential; the provider was never called.
    ConfigurationAbsent,
    /// The provider call failed.
    ProviderFailure { message: String },
    /// The provider text could not be parsed as a JSON array.
    MalformedResponse { message: String },
    /// One candidate was dropped.
    SchemaViolation { index: usize, reason: String },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::ConfigurationAbsent => f.write_str("provider not configured"),
            GenerationWarning::ProviderFailure { message } => {
                write!(f, "provider failure: {}", message)
            }
            GenerationWarning::MalformedResponse { message } => {
                write!(f, "malformed response: {}", message)
            }
            GenerationWarning::SchemaViolation { index, reason } => {
                write!(f, "candidate {} dropped: {}", index, reason)
            }
        }
    }
}

/// What `generate` returns: always a question set, plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub questions: QuestionSet,
    pub source: QuestionSource,
    /// True when served from the session cache without I/O.
    pub from_cache: bool,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationOutcome {
    /// A freshly validated provider result.
    pub fn provider(questions: QuestionSet, warnings: Vec<GenerationWarning>) -> Self {
        Self {
            questions,
            source: QuestionSource::Provider,
            from_cache: false,
            warnings,
        }
    }

    /// A cache hit.
    pub fn cached(questions: QuestionSet) -> Self {
        Self {
            questions,
            source: QuestionSource::Provider,
            from_cache: true,
            warnings: Vec::new(),
        }
    }

    /// A fallback result with the warnings that led to it.
    pub fn fallback(questions: QuestionSet, warnings: Vec<GenerationWarning>) -> Self {
        Self {
            questions,
            source: QuestionSource::Fallback,
            from_cache: false,
            warnings,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == QuestionSource::Fallback
    }

    /// True when the provider path ran cleanly or the set came from cache.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && !self.is_fallback()
    }
}
