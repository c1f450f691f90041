use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("question index {index} out of range (session has {len} questions)")]
    InvalidIndex { index: usize, len: usize },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("insufficient content: requested {requested}, available {available}")]
    InsufficientContent { requested: usize, available: usize },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "INVALID_STATE",
            Self::InvalidIndex { .. } => "INVALID_INDEX",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::InsufficientContent { .. } => "INSUFFICIENT_CONTENT",
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Io(_) => "IO",
        }
    }
}
