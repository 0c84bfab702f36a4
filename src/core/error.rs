//! Error handling for stepref
//!
//! This module provides the error types and user-friendly error reporting used by
//! the library and the `stepref` CLI. The error system is designed around two
//! principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`StepRefError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Schema**: [`StepRefError::UnknownType`], [`StepRefError::DuplicateType`],
//!   [`StepRefError::InvalidBase`], [`StepRefError::CyclicBase`]
//! - **Content**: [`StepRefError::TypeMismatch`], [`StepRefError::InvalidValue`],
//!   [`StepRefError::ValueShapeMismatch`], [`StepRefError::UnknownNode`]
//! - **Files**: [`StepRefError::SchemaParseError`], [`StepRefError::SettingsParseError`],
//!   [`StepRefError::IoError`], [`StepRefError::JsonError`]
//!
//! Problems that never abort a pass (unresolved references, duplicate identities)
//! are not errors at all; they are recorded as
//! [`Diagnostic`](crate::serialization::Diagnostic)s instead.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stepref::core::{StepRefError, user_friendly_error};
//!
//! let error = StepRefError::UnknownType {
//!     name: "Delay".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for stepref operations
///
/// Each variant names one failure mode and carries enough context (type names,
/// element names, offending values) to explain the problem without a debugger.
#[derive(Error, Debug)]
pub enum StepRefError {
    /// A type name was referenced that the schema does not declare
    #[error("Unknown type '{name}'")]
    UnknownType {
        /// The unresolved type name
        name: String,
    },

    /// Two schema declarations share a name
    #[error("Type '{name}' is declared more than once")]
    DuplicateType {
        /// The duplicated type name
        name: String,
    },

    /// A type names a base that is not an object type
    #[error("Type '{name}' cannot derive from '{base}': base must be an object type")]
    InvalidBase {
        /// The derived type
        name: String,
        /// The rejected base
        base: String,
    },

    /// The base chain of a type loops back onto itself
    #[error("Cyclic base chain: {chain}")]
    CyclicBase {
        /// Arrow-joined chain of type names
        chain: String,
    },

    /// An element declares a runtime type that does not descend to the expected type
    #[error("Element '{element}' has type '{actual}', which is not a '{expected}'")]
    TypeMismatch {
        /// Name of the offending element
        element: String,
        /// The expected (declared) type
        expected: String,
        /// The type found on the element
        actual: String,
    },

    /// A scalar element's text could not be parsed as its declared type
    #[error("Element '{element}' holds '{value}', which is not a valid {expected}")]
    InvalidValue {
        /// Name of the offending element
        element: String,
        /// The declared scalar type
        expected: String,
        /// The raw text
        value: String,
    },

    /// A value does not have the shape its declared type requires
    #[error("Cannot serialize {found} as '{expected}'")]
    ValueShapeMismatch {
        /// The declared type
        expected: String,
        /// Description of the value found
        found: String,
    },

    /// A node handle does not belong to the document
    #[error("Node #{index} does not exist in this document")]
    UnknownNode {
        /// Arena index of the missing node
        index: usize,
    },

    /// A schema file could not be parsed
    #[error("Invalid schema file {file}: {reason}")]
    SchemaParseError {
        /// Path of the schema file
        file: String,
        /// Parser message
        reason: String,
    },

    /// A settings file could not be parsed
    #[error("Invalid settings file {file}: {reason}")]
    SettingsParseError {
        /// Path of the settings file
        file: String,
        /// Parser message
        reason: String,
    },

    /// IO error from the standard library
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for StepRefError {
    fn clone(&self) -> Self {
        match self {
            Self::UnknownType {
                name,
            } => Self::UnknownType {
                name: name.clone(),
            },
            Self::DuplicateType {
                name,
            } => Self::DuplicateType {
                name: name.clone(),
            },
            Self::InvalidBase {
                name,
                base,
            } => Self::InvalidBase {
                name: name.clone(),
                base: base.clone(),
            },
            Self::CyclicBase {
                chain,
            } => Self::CyclicBase {
                chain: chain.clone(),
            },
            Self::TypeMismatch {
                element,
                expected,
                actual,
            } => Self::TypeMismatch {
                element: element.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::InvalidValue {
                element,
                expected,
                value,
            } => Self::InvalidValue {
                element: element.clone(),
                expected: expected.clone(),
                value: value.clone(),
            },
            Self::ValueShapeMismatch {
                expected,
                found,
            } => Self::ValueShapeMismatch {
                expected: expected.clone(),
                found: found.clone(),
            },
            Self::UnknownNode {
                index,
            } => Self::UnknownNode {
                index: *index,
            },
            Self::SchemaParseError {
                file,
                reason,
            } => Self::SchemaParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::SettingsParseError {
                file,
                reason,
            } => Self::SettingsParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            // io::Error and serde_json::Error are not Clone; keep kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`StepRefError`] with an optional suggestion and details. Displayed
/// in color by the CLI:
/// - Error message: Red and bold
/// - Details: Yellow
/// - Suggestion: Green
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: StepRefError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: StepRefError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`StepRefError`], [`std::io::Error`], [`serde_json::Error`] and
/// [`toml::de::Error`]; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(stepref_error) = error.downcast_ref::<StepRefError>() {
        return create_error_context(stepref_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let kind = io_error.kind();
        let ctx = ErrorContext::new(StepRefError::IoError(std::io::Error::new(
            kind,
            io_error.to_string(),
        )));
        return match kind {
            std::io::ErrorKind::NotFound => ctx
                .with_suggestion("Check that the file exists and the path is correct"),
            std::io::ErrorKind::PermissionDenied => {
                ctx.with_suggestion("Check file ownership and permissions")
            }
            _ => ctx,
        };
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(StepRefError::Other {
            message: format!("Invalid document: {json_error}"),
        })
        .with_suggestion("Documents are JSON element trees: { \"name\", \"attributes\", \"text\", \"children\" }");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(StepRefError::Other {
            message: format!("Invalid TOML: {toml_error}"),
        })
        .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and table headers");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(StepRefError::Other {
        message,
    })
}

fn create_error_context(error: StepRefError) -> ErrorContext {
    match &error {
        StepRefError::UnknownType {
            name,
        } => {
            let suggestion = format!("Declare '{name}' in the schema file with a [[types]] table");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Built-in types are bool, int, float, string, Step and StepList")
        }
        StepRefError::DuplicateType {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Rename or remove one of the declarations; type names are global"),
        StepRefError::InvalidBase {
            ..
        }
        | StepRefError::CyclicBase {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Object types may only derive from other object types, without loops"),
        StepRefError::TypeMismatch {
            expected,
            ..
        } => {
            let suggestion = format!("Change the element's 'type' attribute to a type that derives from '{expected}'");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        StepRefError::InvalidValue {
            ..
        } => ErrorContext::new(error).with_suggestion("Fix the element text to match its declared type"),
        StepRefError::SchemaParseError {
            ..
        }
        | StepRefError::SettingsParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and table headers"),
        _ => ErrorContext::new(error),
    }
}
