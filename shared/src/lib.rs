pub mod answers;
pub mod conversation;
pub mod mode;
pub mod predict;
pub mod progress;
pub mod questions;
pub mod upload;

pub use answers::{AnswerError, AnswerShape, AnswerSheet, AnswerValue};
pub use conversation::{Conversation, Message, MessagePayload, Role};
pub use mode::{Mode, REFERENCE_PLACEHOLDER};
pub use predict::{
    extract_error_message, ErrorEnvelope, FusionResult, HealthStatus, PredictRequest,
    PredictResponse, SubmissionKind, TabNetResult, YoloResult,
};
pub use progress::{progress_hint, progress_percentage, Readiness};
pub use questions::{Question, QuestionBank, QuestionError, QuestionSet, MAX_QUESTIONS};
pub use upload::{validate_upload, UploadError, ACCEPTED_IMAGE_TYPES, MAX_UPLOAD_BYTES};
