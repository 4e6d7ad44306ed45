//! Error types for MindScan

/// Result type alias using MindScan's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MindScan operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing corpus columns, invalid thresholds, labels outside the trained class set
    #[error("configuration error: {0}")]
    Config(String),

    /// Corpus or post batch is empty after normalization
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Failure of an external collaborator (translation, post source)
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Malformed corpus file
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Model artifact is unreadable, tampered with, or inconsistent
    #[error("model error: {0}")]
    Model(String),

    /// Classifier training or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new empty input error
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Create a new collaborator error
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    /// Create a new corpus error
    pub fn corpus(msg: impl Into<String>) -> Self {
        Self::Corpus(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error only affects a single item of a batch
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Collaborator(_))
    }
}
