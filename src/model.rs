use std::error::Error;
use std::fmt;
use std::path::PathBuf;

pub const RESPONSE_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A file accepted by the remote files API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: String,
    pub turns: Vec<Turn>,
    pub files: Vec<UploadedFile>,
    pub response_mime_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    Unauthenticated(String),
    UploadFailed { path: PathBuf, reason: String },
    Network(String),
    Other(String),
}

impl GenerateError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::UploadFailed { .. } => "upload_failed",
            Self::Network(_) => "network",
            Self::Other(_) => "other",
        }
    }

    pub(crate) fn upload_failed(path: impl Into<PathBuf>, cause: &GenerateError) -> Self {
        Self::UploadFailed {
            path: path.into(),
            reason: cause.to_string(),
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated(message) => write!(f, "authentication failed: {message}"),
            Self::UploadFailed { path, reason } => {
                write!(f, "failed to upload file {}: {reason}", path.display())
            }
            Self::Network(message) => write!(f, "{message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for GenerateError {}

pub type GenerateResult<T> = std::result::Result<T, GenerateError>;
