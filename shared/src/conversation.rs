use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::AnswerSheet;
use crate::mode::Mode;
use crate::predict::{PredictResponse, SubmissionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessagePayload {
    Submission {
        mode: Mode,
        kind: SubmissionKind,
        image_preview: Option<String>,
        answers: AnswerSheet,
    },
    Pending {
        status: String,
    },
    Prediction(Box<PredictResponse>),
    Failed {
        status: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub payload: MessagePayload,
}

impl Message {
    fn new(role: Role, payload: MessagePayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            payload,
        }
    }
}

/// In-memory turn list for one browser session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends the user turn and a pending assistant turn; returns the pending turn's id.
    pub fn begin(&mut self, mode: Mode, kind: SubmissionKind, image_preview: Option<String>, answers: AnswerSheet) -> String {
        self.messages.push(Message::new(
            Role::User,
            MessagePayload::Submission {
                mode,
                kind,
                image_preview,
                answers,
            },
        ));
        let pending = Message::new(
            Role::Assistant,
            MessagePayload::Pending {
                status: format!("Running {} analysis...", kind.label()),
            },
        );
        let id = pending.id.clone();
        self.messages.push(pending);
        id
    }

    /// Replaces the pending turn `id` in place. Returns false if no pending turn has that id.
    pub fn resolve(&mut self, id: &str, outcome: Result<PredictResponse, String>) -> bool {
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == id && matches!(m.payload, MessagePayload::Pending { .. }))
        else {
            return false;
        };
        message.payload = match outcome {
            Ok(response) => MessagePayload::Prediction(Box::new(response)),
            Err(error) => MessagePayload::Failed {
                status: "Analysis failed".to_string(),
                error,
            },
        };
        true
    }

    pub fn has_pending(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.payload, MessagePayload::Pending { .. }))
    }
}
