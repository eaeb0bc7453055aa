//! Response values aligned to question kinds.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::foundation::QuestionId;

use super::question::QuestionKind;

/// A user's answer, tagged by the kind of question it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Text(String),
    Number(f64),
    Select(String),
    /// Selected options; a set, so members can never repeat.
    MultiSelect(BTreeSet<String>),
    /// Tri-state: yes, no, or not answered yet.
    Boolean(Option<bool>),
}

impl ResponseValue {
    /// Creates a text answer.
    pub fn text(value: impl Into<String>) -> Self {
        ResponseValue::Text(value.into())
    }

    /// Creates a single-choice answer.
    pub fn select(option: impl Into<String>) -> Self {
        ResponseValue::Select(option.into())
    }

    /// Creates a multi-choice answer from any iterator of options.
    pub fn multi_select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResponseValue::MultiSelect(options.into_iter().map(Into::into).collect())
    }

    /// Creates an answered yes/no value.
    pub fn yes_no(value: bool) -> Self {
        ResponseValue::Boolean(Some(value))
    }

    /// Returns an empty value of the given kind.
    pub fn empty(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Text => ResponseValue::Text(String::new()),
            QuestionKind::Number => ResponseValue::Number(0.0),
            QuestionKind::Select => ResponseValue::Select(String::new()),
            QuestionKind::MultiSelect => ResponseValue::MultiSelect(BTreeSet::new()),
            QuestionKind::Boolean => ResponseValue::Boolean(None),
        }
    }

    /// Returns the question kind this value answers.
    pub fn kind(&self) -> QuestionKind {
        match self {
            ResponseValue::Text(_) => QuestionKind::Text,
            ResponseValue::Number(_) => QuestionKind::Number,
            ResponseValue::Select(_) => QuestionKind::Select,
            ResponseValue::MultiSelect(_) => QuestionKind::MultiSelect,
            ResponseValue::Boolean(_) => QuestionKind::Boolean,
        }
    }

    /// Returns true if the value carries an actual answer.
    pub fn is_answered(&self) -> bool {
        match self {
            ResponseValue::Text(s) | ResponseValue::Select(s) => !s.trim().is_empty(),
            ResponseValue::Number(n) => n.is_finite(),
            ResponseValue::MultiSelect(set) => !set.is_empty(),
            ResponseValue::Boolean(b) => b.is_some(),
        }
    }

    /// Adds `option` when absent, removes it when present.
    ///
    /// Returns whether the option is selected afterwards.
    pub fn toggle_option(&mut self, option: &str) -> Result<bool, ResponseError> {
        match self {
            ResponseValue::MultiSelect(set) => {
                if set.remove(option) {
                    Ok(false)
                } else {
                    set.insert(option.to_string());
                    Ok(true)
                }
            }
            other => Err(ResponseError::NotMultiSelect {
                actual: other.kind(),
            }),
        }
    }

    /// Plain JSON form: string, number, array, bool or null.
    pub fn to_json(&self) -> Value {
        match self {
            ResponseValue::Text(s) | ResponseValue::Select(s) => Value::String(s.clone()),
            ResponseValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ResponseValue::MultiSelect(set) => {
                Value::Array(set.iter().cloned().map(Value::String).collect())
            }
            ResponseValue::Boolean(b) => b.map(Value::Bool).unwrap_or(Value::Null),
        }
    }

    /// Short human-readable rendering used in reports.
    pub fn display(&self) -> String {
        match self {
            ResponseValue::Text(s) | ResponseValue::Select(s) => s.clone(),
            ResponseValue::Number(n) => n.to_string(),
            ResponseValue::MultiSelect(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
            ResponseValue::Boolean(Some(true)) => "Yes".to_string(),
            ResponseValue::Boolean(Some(false)) => "No".to_string(),
            ResponseValue::Boolean(None) => String::new(),
        }
    }
}

impl Serialize for ResponseValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Errors raised when a response does not fit its question.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    #[error("question {question_id} expects a {expected} answer, got {actual}")]
    KindMismatch {
        question_id: QuestionId,
        expected: QuestionKind,
        actual: QuestionKind,
    },

    #[error("'{option}' is not an option of question {question_id}")]
    OptionNotAllowed {
        question_id: QuestionId,
        option: String,
    },

    #[error("question {question_id} needs a finite number")]
    InvalidNumber { question_id: QuestionId },

    #[error("options can only be toggled on multiselect answers, got {actual}")]
    NotMultiSelect { actual: QuestionKind },

    #[error("question {0} is not part of any generated set")]
    UnknownQuestion(String),
}
