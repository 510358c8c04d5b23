use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::mode::Mode;

/// Upper bound on questions per mode; the upstream model takes at most this many answers.
pub const MAX_QUESTIONS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub key: String,
    pub text: String,
}

impl Question {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Ordered questionnaire for one mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref, From)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Question>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub disease: QuestionSet,
    pub pest: QuestionSet,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question set for {0} is empty")]
    Empty(Mode),
    #[error("question set for {mode} has {count} questions, at most 15 are supported")]
    TooMany { mode: Mode, count: usize },
    #[error("duplicate question key '{key}' in {mode} set")]
    DuplicateKey { mode: Mode, key: String },
}

impl QuestionBank {
    pub fn for_mode(&self, mode: Mode) -> &QuestionSet {
        match mode {
            Mode::Disease => &self.disease,
            Mode::Pest => &self.pest,
        }
    }

    pub fn validate(&self) -> Result<(), QuestionError> {
        for (mode, set) in [(Mode::Disease, &self.disease), (Mode::Pest, &self.pest)] {
            if set.is_empty() {
                return Err(QuestionError::Empty(mode));
            }
            if set.len() > MAX_QUESTIONS {
                return Err(QuestionError::TooMany {
                    mode,
                    count: set.len(),
                });
            }
            let mut seen = HashSet::new();
            for question in set.iter() {
                if !seen.insert(question.key.as_str()) {
                    return Err(QuestionError::DuplicateKey {
                        mode,
                        key: question.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
