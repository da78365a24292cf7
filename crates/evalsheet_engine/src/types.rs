use std::fmt;

pub type RecordId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Noun endings (~함, ~임).
    #[default]
    Descriptive,
    /// Polite formal endings (~합니다, ~습니다).
    Formal,
}

/// Input for a single evaluation, fallbacks already applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub name: String,
    pub category: String,
    pub keywords: String,
    pub tone: Tone,
    pub target_length: u32,
    pub custom_instruction: String,
    pub reference_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    GenerationCompleted {
        record_id: RecordId,
        result: Result<String, GenerationError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MissingCredential,
    InvalidCredential,
    HttpStatus(u16),
    Timeout,
    EmptyResponse,
    InvalidResponse,
    Network,
}

impl FailureKind {
    /// True when the user has to supply a (new) API key.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            FailureKind::MissingCredential | FailureKind::InvalidCredential
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingCredential => write!(f, "API key missing"),
            FailureKind::InvalidCredential => write!(f, "API key rejected"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::EmptyResponse => write!(f, "no content generated"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
