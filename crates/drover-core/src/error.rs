//! Unified error types for Drover

use thiserror::Error;

/// Unified error type for all Drover operations
#[derive(Error, Debug)]
pub enum DroverError {
    // Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    // Model service errors
    #[error("Model API error: {0}")]
    Api(String),

    #[error("Model API rate limit: {0}")]
    ApiLimit(String),

    // Provisioning and session surface errors
    #[error("Instance error: {0}")]
    Instance(String),

    #[error("Browser error: {0}")]
    Browser(String),

    // Tool invocation errors (expected failures travel inside ToolOutcome,
    // this variant covers transport and malformed-argument conditions)
    #[error("Tool error: {0}")]
    Tool(String),

    // Structured extraction errors
    #[error("No JSON object found in agent answer")]
    NoJsonObject,

    #[error("Malformed JSON in agent answer: {0}")]
    MalformedJson(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using DroverError
pub type Result<T> = std::result::Result<T, DroverError>;
