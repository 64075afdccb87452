//! Core error types for diagram auditing
//!
//! This module defines the fatal error taxonomy. Structural findings
//! (lint issues, schema errors, pattern hits) are collected into result
//! lists instead and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by the audit pipeline
#[derive(Error, Debug)]
pub enum FlowgateError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("XML error: {source}")]
    Xml {
        #[from]
        source: xmltree::ParseError,
    },

    #[error("Serialization error: {source}")]
    Serialize {
        #[from]
        source: xmltree::Error,
    },

    #[error("Path {} escapes workspace root {}", path.display(), root.display())]
    Containment { path: PathBuf, root: PathBuf },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FlowgateError {
    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, FlowgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error() {
        let error = FlowgateError::parse_error("no process element");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Parse error"));
        assert!(error_msg.contains("no process element"));
    }

    #[test]
    fn test_containment_error() {
        let error = FlowgateError::Containment {
            path: PathBuf::from("/etc/passwd"),
            root: PathBuf::from("/workspace"),
        };
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("escapes workspace root"));
        assert!(error_msg.contains("/workspace"));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: FlowgateError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
