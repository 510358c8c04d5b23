use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::questions::Question;

/// Tri-state questionnaire answer, carried on the wire as -1 / 0 / 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum AnswerValue {
    #[default]
    Unknown,
    No,
    Yes,
}

impl AnswerValue {
    pub const ALL: [AnswerValue; 3] = [AnswerValue::Unknown, AnswerValue::No, AnswerValue::Yes];

    pub fn label(&self) -> &'static str {
        match self {
            AnswerValue::Unknown => "Unknown",
            AnswerValue::No => "No",
            AnswerValue::Yes => "Yes",
        }
    }

    /// Badge variant used when rendering the answer.
    pub fn badge_class(&self) -> &'static str {
        match self {
            AnswerValue::Unknown => "secondary",
            AnswerValue::No => "destructive",
            AnswerValue::Yes => "default",
        }
    }

    pub fn is_answered(&self) -> bool {
        *self != AnswerValue::Unknown
    }
}

impl TryFrom<i8> for AnswerValue {
    type Error = AnswerError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(AnswerValue::Unknown),
            0 => Ok(AnswerValue::No),
            1 => Ok(AnswerValue::Yes),
            other => Err(AnswerError::InvalidValue(other)),
        }
    }
}

impl From<AnswerValue> for i8 {
    fn from(value: AnswerValue) -> Self {
        match value {
            AnswerValue::Unknown => -1,
            AnswerValue::No => 0,
            AnswerValue::Yes => 1,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("invalid answer value {0}, expected -1, 0 or 1")]
    InvalidValue(i8),
    #[error("unknown question key '{0}'")]
    UnknownKey(String),
    #[error("received {got} answers for {expected} questions")]
    TooManyAnswers { expected: usize, got: usize },
}

/// Which wire shape the prediction endpoint expects for answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerShape {
    /// `{ "question_key": -1 | 0 | 1, ... }`
    #[default]
    Keyed,
    /// `[-1 | 0 | 1, ...]`, index-aligned to the active question list.
    Ordered,
}

/// Per-question answers for the active mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<String, AnswerValue>);

impl AnswerSheet {
    /// Every question starts out as `Unknown`.
    pub fn for_questions(questions: &[Question]) -> Self {
        Self(
            questions
                .iter()
                .map(|q| (q.key.clone(), AnswerValue::Unknown))
                .collect(),
        )
    }

    /// Rebuilds a sheet from an index-aligned answer list. Short lists are
    /// padded with `Unknown`; long lists are rejected.
    pub fn from_ordered(questions: &[Question], values: &[AnswerValue]) -> Result<Self, AnswerError> {
        if values.len() > questions.len() {
            return Err(AnswerError::TooManyAnswers {
                expected: questions.len(),
                got: values.len(),
            });
        }
        let mut sheet = Self::for_questions(questions);
        for (question, value) in questions.iter().zip(values) {
            sheet.0.insert(question.key.clone(), *value);
        }
        Ok(sheet)
    }

    pub fn get(&self, key: &str) -> AnswerValue {
        self.0.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: AnswerValue) -> Result<(), AnswerError> {
        match self.0.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AnswerError::UnknownKey(key.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|v| v.is_answered()).count()
    }

    pub fn yes_no_counts(&self) -> (usize, usize) {
        self.0.values().fold((0, 0), |(yes, no), v| match v {
            AnswerValue::Yes => (yes + 1, no),
            AnswerValue::No => (yes, no + 1),
            AnswerValue::Unknown => (yes, no),
        })
    }

    /// Index-aligned to `questions`; keys absent from the sheet become `Unknown`.
    pub fn to_ordered(&self, questions: &[Question]) -> Vec<AnswerValue> {
        questions.iter().map(|q| self.get(&q.key)).collect()
    }

    pub fn to_wire(&self, shape: AnswerShape, questions: &[Question]) -> serde_json::Value {
        match shape {
            AnswerShape::Keyed => {
                let map = questions
                    .iter()
                    .map(|q| (q.key.clone(), serde_json::Value::from(i8::from(self.get(&q.key)))))
                    .collect();
                serde_json::Value::Object(map)
            }
            AnswerShape::Ordered => self
                .to_ordered(questions)
                .into_iter()
                .map(|v| serde_json::Value::from(i8::from(v)))
                .collect(),
        }
    }
}
