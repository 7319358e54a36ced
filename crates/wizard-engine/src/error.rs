use thiserror::Error;

/// Host programming errors raised by the wizard state machine. User
/// input problems are never surfaced here; they live in the error map.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("question '{0}' is not a list")]
    NotAList(String),
    #[error("list '{question_id}' is full (max {max} items)")]
    ListFull { question_id: String, max: usize },
    #[error("index {index} is out of range for list '{question_id}' (len {len})")]
    IndexOutOfRange {
        question_id: String,
        index: usize,
        len: usize,
    },
    #[error("already at the first visible group")]
    AtFirstGroup,
    #[error("backward navigation is disabled for this questionnaire")]
    BackwardDisabled,
    #[error("the wizard has already completed")]
    AlreadyComplete,
    #[error("preset belongs to questionnaire '{found}', expected '{expected}'")]
    PresetMismatch { expected: String, found: String },
}

/// Persistence failures from the preset store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid preset envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("unsupported preset envelope version {0}")]
    UnsupportedVersion(u32),
}
