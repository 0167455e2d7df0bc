//! Error types for pushlatest-core

use thiserror::Error;

/// Result type alias using pushlatest-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating references or talking to the container runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Source reference carries no explicit tag
    #[error("The source image {reference} must have an explicit tag (for example {reference}:1.0)")]
    MissingTag { reference: String },

    /// Source and resolved target name the same image
    #[error("The source and target images are the same: {reference}. Pass a different --target")]
    SameReference { reference: String },

    /// Reference string is structurally malformed
    #[error("Invalid image reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// Run option holds a value that cannot be used
    #[error("Invalid {option}: {reason}")]
    InvalidConfig { option: String, reason: String },

    /// Image does not exist locally or in the registry
    #[error("The image {reference} was not found")]
    NotFound { reference: String },

    /// Container runtime binary is not installed
    #[error("{tool} not found in PATH. Install it or pass its location explicitly")]
    ToolNotFound { tool: String },

    /// Container runtime could not be started
    #[error("Failed to run `{command}`: {source}")]
    Transport {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Container runtime ran but exited unsuccessfully
    #[error("`{command}` failed ({status}):\n{stderr}")]
    Execution {
        command: String,
        status: String,
        stderr: String,
    },

    /// Runtime output could not be interpreted
    #[error("Unexpected output from {context}: {message}")]
    Parse { context: String, message: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing tag error
    pub fn missing_tag(reference: impl Into<String>) -> Self {
        Self::MissingTag {
            reference: reference.into(),
        }
    }

    /// Create a same reference error
    pub fn same_reference(reference: impl Into<String>) -> Self {
        Self::SameReference {
            reference: reference.into(),
        }
    }

    /// Create an invalid reference error
    pub fn invalid_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(reference: impl Into<String>) -> Self {
        Self::NotFound {
            reference: reference.into(),
        }
    }

    /// Create a tool not found error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create an execution error from a failed command
    pub fn execution(
        command: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Execution {
            command: command.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a parse error
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether this error reports a missing image
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
