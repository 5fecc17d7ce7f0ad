//! Error handling for the tagbridge service
//!
//! This module defines the crate-wide error type for address-space access,
//! configuration and I/O, plus a Result alias used throughout the crate.
//! Operator evaluation has its own error type in [`crate::operators`].

use thiserror::Error;

/// Main error type for tagbridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The address-space client could not complete a browse or read
    #[error("Address space error: {0}")]
    Collaborator(String),

    /// The address-space client has no live session
    #[error("Not connected to address space server")]
    NotConnected,

    /// A node id did not resolve to a node
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A node exists but has no readable value
    #[error("Node {node_id} has no value: {message}")]
    NoValue { node_id: String, message: String },

    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<BridgeError>,
    },
}

impl BridgeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        BridgeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True when the error means the session is gone rather than a single bad node
    pub fn is_connection_fault(&self) -> bool {
        match self {
            BridgeError::NotConnected => true,
            BridgeError::WithContext { source, .. } => source.is_connection_fault(),
            _ => false,
        }
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

/// Result type alias for tagbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
