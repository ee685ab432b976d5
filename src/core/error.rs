//! Error handling for pfs-finder
//!
//! This module provides the error taxonomy shared by every layer of the crate and the
//! user-facing rendering used by the `pfsfind` binary. The error system follows two rules:
//! 1. **Strongly-typed errors** so that callers can tell a failed `locate` (zero or many
//!    matches) apart from a malformed query or a broken filesystem listing
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`FinderError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Propagation
//!
//! Parse failures of *discovered* candidates never surface as errors: the discovery
//! engine drops such candidates and keeps scanning. Parse failures of *caller-supplied*
//! file names propagate as [`FinderError::Parse`]. Everything else propagates
//! immediately; nothing in the crate retries.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pfs_finder::core::{FinderError, user_friendly_error};
//!
//! let error = FinderError::NotFound {
//!     product: "pfsConfig".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// The main error type for pfs-finder operations
///
/// # Error Categories
///
/// ## Query and Input
/// - [`InvalidQuery`] - Contradictory or malformed query (several query modes at once,
///   both or neither of file name and identity, value of the wrong type)
/// - [`Formatting`] - A value could not be rendered with a filter's print format
/// - [`Parse`] - A captured token is not a valid value for its filter
///
/// ## Matching
/// - [`FormatMismatch`] - A path did not match the expected regex when a match was required
/// - [`NotFound`] - `locate` produced zero results
/// - [`AmbiguousResult`] - `locate` produced more than one result
///
/// ## Environment
/// - [`DirectoryInference`] - No data root could be determined
/// - [`InvalidPattern`] - A regex, glob or path template is unusable
/// - [`Config`] - The configuration file is invalid
/// - [`Io`] - Filesystem listing failed
///
/// [`InvalidQuery`]: FinderError::InvalidQuery
/// [`Formatting`]: FinderError::Formatting
/// [`Parse`]: FinderError::Parse
/// [`FormatMismatch`]: FinderError::FormatMismatch
/// [`NotFound`]: FinderError::NotFound
/// [`AmbiguousResult`]: FinderError::AmbiguousResult
/// [`DirectoryInference`]: FinderError::DirectoryInference
/// [`InvalidPattern`]: FinderError::InvalidPattern
/// [`Config`]: FinderError::Config
/// [`Io`]: FinderError::Io
#[derive(Error, Debug)]
pub enum FinderError {
    /// The caller supplied a malformed or contradictory query
    ///
    /// Raised when more than one query mode is given for the same field, when a range
    /// has `min > max`, when a value does not belong to the filter's domain, or when
    /// `load` receives both or neither of a file name and an identity.
    #[error("Invalid query: {reason}")]
    InvalidQuery {
        /// Why the query was rejected
        reason: String,
    },

    /// A value could not be rendered into a path
    #[error("Cannot format value for field '{field}': {reason}")]
    Formatting {
        /// Name of the filter that rejected the value
        field: String,
        /// Why the value could not be rendered
        reason: String,
    },

    /// A file name or path did not match the expected regular expression
    #[error("File name does not match expected format: {path}")]
    FormatMismatch {
        /// The offending path
        path: String,
    },

    /// A captured token could not be converted to the filter's value type
    #[error("Cannot parse '{raw}' as a value for field '{field}': {reason}")]
    Parse {
        /// Name of the filter that failed to parse
        field: String,
        /// The raw token taken from the file name
        raw: String,
        /// Parser diagnostic
        reason: String,
    },

    /// No data root could be determined
    #[error("Cannot determine {root} directory: {reason}")]
    DirectoryInference {
        /// Which root was being resolved ("data" or "rerun")
        root: String,
        /// Why inference failed
        reason: String,
    },

    /// `locate` found no file
    #[error("No {product} file found matching the query")]
    NotFound {
        /// Product kind that was searched
        product: String,
    },

    /// `locate` found more than one file
    #[error("Multiple {product} files found matching the query ({count} matches)")]
    AmbiguousResult {
        /// Product kind that was searched
        product: String,
        /// Number of matching files
        count: usize,
    },

    /// A regex, glob expression or path template is unusable
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text
        pattern: String,
        /// Why it is unusable
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Filesystem error while listing candidates
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinderError {
    /// Shorthand for [`FinderError::InvalidQuery`].
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Whether this error is a soft-failure candidate: it can be downgraded to a warning
    /// when the caller marked the operation as not required.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::FormatMismatch { .. } | Self::DirectoryInference { .. })
    }

    /// Return the error when `required` or when it is not soft; otherwise log it as a
    /// warning and yield `Ok(None)`.
    pub fn soften<T>(self, required: bool) -> Result<Option<T>, Self> {
        if required || !self.is_soft() {
            return Err(self);
        }
        warn!("{self}");
        Ok(None)
    }
}

impl Clone for FinderError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidQuery {
                reason,
            } => Self::InvalidQuery {
                reason: reason.clone(),
            },
            Self::Formatting {
                field,
                reason,
            } => Self::Formatting {
                field: field.clone(),
                reason: reason.clone(),
            },
            Self::FormatMismatch {
                path,
            } => Self::FormatMismatch {
                path: path.clone(),
            },
            Self::Parse {
                field,
                raw,
                reason,
            } => Self::Parse {
                field: field.clone(),
                raw: raw.clone(),
                reason: reason.clone(),
            },
            Self::DirectoryInference {
                root,
                reason,
            } => Self::DirectoryInference {
                root: root.clone(),
                reason: reason.clone(),
            },
            Self::NotFound {
                product,
            } => Self::NotFound {
                product: product.clone(),
            },
            Self::AmbiguousResult {
                product,
                count,
            } => Self::AmbiguousResult {
                product: product.clone(),
                count: *count,
            },
            Self::InvalidPattern {
                pattern,
                reason,
            } => Self::InvalidPattern {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            Self::Config {
                message,
            } => Self::Config {
                message: message.clone(),
            },
            // io::Error is not Clone; keep kind and message
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Displayed by the binary in three colors: red for the error, yellow for details and
/// green for the suggestion.
///
/// ```rust,no_run
/// use pfs_finder::core::{ErrorContext, FinderError};
///
/// let context = ErrorContext::new(FinderError::NotFound { product: "pfsDesign".into() })
///     .with_suggestion("Relax the query or check --datadir")
///     .with_details("locate requires exactly one matching file");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: FinderError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: FinderError) -> Self {
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
/// Recognizes [`FinderError`] (anywhere in the `anyhow` chain), [`std::io::Error`] and
/// [`toml::de::Error`]; everything else is wrapped as a configuration-free message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for (depth, cause) in error.chain().enumerate() {
        if let Some(finder_error) = cause.downcast_ref::<FinderError>() {
            let ctx = create_error_context(finder_error.clone());
            // Outer context messages are kept as details
            return if depth == 0 {
                ctx
            } else {
                ctx.with_details(error.to_string())
            };
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(FinderError::Config {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your pfsfind configuration file");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let kind = io_error.kind();
        let ctx =
            ErrorContext::new(FinderError::Io(std::io::Error::new(kind, io_error.to_string())))
                .with_suggestion("Check that the data directory exists and is readable");
        let outer = error.to_string();
        return if outer == io_error.to_string() {
            ctx
        } else {
            ctx.with_details(outer)
        };
    }

    ErrorContext::new(FinderError::Config {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: FinderError) -> ErrorContext {
    match &error {
        FinderError::InvalidQuery {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Give each field a single value, a comma-separated set or a 'min..max' range",
        ),
        FinderError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Relax the query, or check --datadir / --rerundir")
            .with_details("locate requires exactly one matching file"),
        FinderError::AmbiguousResult {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add more fields to the query, or use 'find' to list all matches")
            .with_details("locate never picks one of several matching files"),
        FinderError::DirectoryInference {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Set GAPIPE_DATADIR or pass --datadir")
            .with_details(
                "The data root is taken from the explicit argument, the reference path, \
                 then the configured default",
            ),
        FinderError::FormatMismatch {
            ..
        }
        | FinderError::Parse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the file name follows the product's naming convention"),
        FinderError::Config {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Fix the configuration file, or point PFSFIND_CONFIG at another one",
        ),
        _ => ErrorContext::new(error),
    }
}
