//! Turns raw provider text into validated questions.
//!
//! The provider is asked for a bare JSON array but frequently wraps it in a
//! fenced code block or surrounds it with prose. Every step here is pure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::domain::foundation::QuestionId;
use crate::domain::questionnaire::{Question, QuestionKind, QuestionSet};

use super::outcome::GenerationWarning;

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("valid leading fence regex"));

static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?```\s*$").expect("valid trailing fence regex"));

static ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("valid array regex"));

/// Everything the sanitizer learned about one raw response.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeReport {
    /// Text after fence removal.
    pub stripped: String,
    /// The array substring handed to the JSON parser.
    pub extracted: String,
    /// Number of array elements found before validation.
    pub candidates: usize,
    /// Surviving questions in original order.
    pub questions: QuestionSet,
    pub warnings: Vec<GenerationWarning>,
}

impl SanitizeReport {
    pub fn has_survivors(&self) -> bool {
        !self.questions.is_empty()
    }
}

/// Removes a leading and a trailing code fence, each independently.
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_leading = LEADING_FENCE.replace(trimmed, "");
    TRAILING_FENCE
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

/// Greedy match from the first `[` to the last `]`; the whole text when none.
pub fn extract_array(text: &str) -> &str {
    ARRAY.find(text).map(|m| m.as_str()).unwrap_or(text)
}

/// Parses the extracted text as a JSON array of arbitrary values.
pub fn parse_candidates(text: &str) -> Result<Vec<Value>, GenerationWarning> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(GenerationWarning::MalformedResponse {
            message: format!("expected a JSON array, found {}", json_type_name(&other)),
        }),
        Err(e) => Err(GenerationWarning::MalformedResponse {
            message: e.to_string(),
        }),
    }
}

/// Validates one candidate object; the error is a human-readable reason.
pub fn validate_candidate(candidate: &Value) -> Result<Question, String> {
    let object = candidate
        .as_object()
        .ok_or_else(|| format!("expected an object, found {}", json_type_name(candidate)))?;

    let id = non_empty_string(object, "id")?;
    let prompt = non_empty_string(object, "question")?;

    let required = match object.get("required") {
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(format!(
                "'required' must be a boolean, found {}",
                json_type_name(other)
            ))
        }
        None => return Err("missing 'required'".to_string()),
    };

    let kind = match object.get("type") {
        Some(Value::String(s)) => s
            .parse::<QuestionKind>()
            .map_err(|_| format!("unrecognized type '{}'", s))?,
        Some(other) => {
            return Err(format!(
                "'type' must be a string, found {}",
                json_type_name(other)
            ))
        }
        None => return Err("missing 'type'".to_string()),
    };

    let options = if kind.is_choice() {
        choice_options(object)?
    } else {
        Vec::new()
    };

    let id = QuestionId::new(id).map_err(|e| e.to_string())?;
    Question::new(id, prompt, kind, required, options).map_err(|e| e.to_string())
}

/// Runs the full pipeline: fence strip, array extraction, parse, validation.
///
/// Never fails. A parse failure yields zero questions and a
/// `MalformedResponse` warning; each dropped candidate adds a
/// `SchemaViolation`.
pub fn sanitize_response(raw: &str) -> SanitizeReport {
    let stripped = strip_code_fence(raw);
    let extracted = extract_array(&stripped).to_string();

    let mut warnings = Vec::new();
    let candidates = match parse_candidates(&extracted) {
        Ok(items) => items,
        Err(warning) => {
            warnings.push(warning);
            Vec::new()
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut questions = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.iter().enumerate() {
        match validate_candidate(candidate) {
            Ok(question) => {
                if seen.insert(question.id.as_str().to_string()) {
                    questions.push(question);
                } else {
                    warnings.push(GenerationWarning::SchemaViolation {
                        index,
                        reason: format!("duplicate id '{}'", question.id),
                    });
                }
            }
            Err(reason) => warnings.push(GenerationWarning::SchemaViolation { index, reason }),
        }
    }

    SanitizeReport {
        stripped,
        extracted,
        candidates: candidates.len(),
        questions: QuestionSet::new(questions),
        warnings,
    }
}

fn non_empty_string(object: &Map<String, Value>, field: &str) -> Result<String, String> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("'{}' is empty", field)),
        Some(other) => Err(format!(
            "'{}' must be a string, found {}",
            field,
            json_type_name(other)
        )),
        None => Err(format!("missing '{}'", field)),
    }
}

fn choice_options(object: &Map<String, Value>) -> Result<Vec<String>, String> {
    let items = match object.get("options") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(Value::Array(_)) => return Err("'options' is empty".to_string()),
        Some(other) => {
            return Err(format!(
                "'options' must be an array, found {}",
                json_type_name(other)
            ))
        }
        None => return Err("choice question without 'options'".to_string()),
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(format!(
                "options must be strings, found {}",
                json_type_name(other)
            )),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
