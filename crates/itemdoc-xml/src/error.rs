//! Errors that abort a whole load or save.
//!
//! Problems confined to one element are not errors; they are recorded in the
//! [`itemdoc_model::Report`] returned alongside the parsed snapshot.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote location could not be materialized as a local file.
    #[error("Failed to transfer {location}: {message}")]
    Transfer { location: String, message: String },

    /// The text is not a well formed document.
    #[error("Could not parse XML: {message}")]
    Format { message: String },

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Writing into the output buffer failed.
    #[error("Failed to write document: {0}")]
    Write(#[from] std::io::Error),

    /// The temp file could not be moved over the target.
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the file at {}", operation, path.display()),
            Self::Transfer { location, message } => {
                format!("Could not download {location}: {message}")
            }
            Self::Format { message } => format!("The document is not valid XML:\n{message}"),
            Self::Xml(_) | Self::Write(_) => {
                "An error occurred while writing the document.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the file to {}. Please check disk space and permissions.",
                target_path.display()
            ),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" || *operation == "open" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::Transfer { .. } => {
                Some("Check the address and your network connection, or download the file first.".into())
            }
            Self::Format { .. } => Some("Make sure you selected a circuit or flowcode document.".into()),
            Self::Xml(_) | Self::Write(_) => None,
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Result type alias for document I/O.
pub type Result<T> = std::result::Result<T, DocumentError>;
