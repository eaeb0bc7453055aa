//! Question, QuestionKind and QuestionSet.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::foundation::{QuestionId, ValidationError};

use super::response::{ResponseError, ResponseValue};

/// The five recognized answer kinds.
///
/// Wire names are exactly `text`, `number`, `select`, `multiselect`, `boolean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Number,
    Select,
    MultiSelect,
    Boolean,
}

impl QuestionKind {
    /// Returns all recognized kinds.
    pub fn all() -> &'static [QuestionKind] {
        &[
            QuestionKind::Text,
            QuestionKind::Number,
            QuestionKind::Select,
            QuestionKind::MultiSelect,
            QuestionKind::Boolean,
        ]
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Number => "number",
            QuestionKind::Select => "select",
            QuestionKind::MultiSelect => "multiselect",
            QuestionKind::Boolean => "boolean",
        }
    }

    /// Returns true for kinds answered by picking from `options`.
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::Select | QuestionKind::MultiSelect)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = ValidationError;

    /// Parses an exact wire name; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("type", format!("unrecognized kind '{}'", s))
            })
    }
}

/// A single question in a generated set.
///
/// Deserialization goes through [`Question::new`], so decoded questions obey
/// the same structural rules as constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuestionWire")]
pub struct Question {
    pub id: QuestionId,
    /// Question text shown to the user.
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub required: bool,
    /// Present only for choice kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Wire shape of a question before validation.
#[derive(Deserialize)]
struct QuestionWire {
    id: QuestionId,
    question: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    required: bool,
    #[serde(default)]
    options: Vec<String>,
}

impl TryFrom<QuestionWire> for Question {
    type Error = ValidationError;

    fn try_from(wire: QuestionWire) -> Result<Self, Self::Error> {
        Question::new(wire.id, wire.question, wire.kind, wire.required, wire.options)
    }
}

impl Question {
    /// Creates a question after checking its structural rules.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        kind: QuestionKind,
        required: bool,
        options: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let question = Self {
            id,
            prompt: prompt.into(),
            kind,
            required,
            options: if kind.is_choice() { options } else { Vec::new() },
        };
        question.validate()?;
        Ok(question)
    }

    /// Checks the structural rules: non-empty text and options for choice kinds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::empty_field("question"));
        }
        if self.kind.is_choice() && self.options.is_empty() {
            return Err(ValidationError::empty_field("options"));
        }
        if !self.kind.is_choice() && !self.options.is_empty() {
            return Err(ValidationError::invalid_format(
                "options",
                format!("{} questions take no options", self.kind),
            ));
        }
        Ok(())
    }

    /// Returns true if `option` is one of this question's options.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Checks that a response is acceptable for this question.
    ///
    /// The response tag must match the question kind; choice answers must
    /// come from the question's options.
    pub fn check_response(&self, value: &ResponseValue) -> Result<(), ResponseError> {
        if value.kind() != self.kind {
            return Err(ResponseError::KindMismatch {
                question_id: self.id.clone(),
                expected: self.kind,
                actual: value.kind(),
            });
        }

        match value {
            ResponseValue::Number(n) if !n.is_finite() => Err(ResponseError::InvalidNumber {
                question_id: self.id.clone(),
            }),
            ResponseValue::Select(choice) if !choice.is_empty() && !self.has_option(choice) => {
                Err(ResponseError::OptionNotAllowed {
                    question_id: self.id.clone(),
                    option: choice.clone(),
                })
            }
            ResponseValue::MultiSelect(choices) => {
                match choices.iter().find(|c| !self.has_option(c)) {
                    Some(bad) => Err(ResponseError::OptionNotAllowed {
                        question_id: self.id.clone(),
                        option: bad.clone(),
                    }),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Ordered, immutable set of questions for one `(category, step)` pair.
///
/// Clones share the same allocation, so a cached set handed out twice is
/// the identical value both times (see [`QuestionSet::ptr_eq`]).
#[derive(Debug, Clone, Default)]
pub struct QuestionSet(Arc<[Question]>);

impl QuestionSet {
    /// Wraps questions into a set.
    pub fn new(questions: Vec<Question>) -> Self {
        Self(questions.into())
    }

    /// Returns true if both handles point at the same allocation.
    pub fn ptr_eq(a: &QuestionSet, b: &QuestionSet) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Finds a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.0.iter().find(|q| q.id.as_str() == id)
    }

    /// Returns the question ids in order.
    pub fn ids(&self) -> Vec<&QuestionId> {
        self.0.iter().map(|q| &q.id).collect()
    }
}

impl Deref for QuestionSet {
    type Target = [Question];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for QuestionSet {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl FromIterator<Question> for QuestionSet {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Serialize for QuestionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for QuestionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Question>::deserialize(deserializer).map(QuestionSet::new)
    }
}
