//! Error handling for mcp-gate
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`GateError`]) for every failure the engine can report,
//!    so callers can match on the exact failure mode.
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for
//!    the CLI, produced by [`user_friendly_error`].
//!
//! # Error Categories
//!
//! - **Parsing**: [`GateError::MalformedConfig`]
//! - **Lookup**: [`GateError::NotFound`], [`GateError::NotBlocked`]
//! - **Durability**: [`GateError::WriteFailure`], [`GateError::Io`]
//! - **Input**: [`GateError::ValidationFailure`], [`GateError::InvalidMigration`]
//!
//! Lookup and input errors are always surfaced to the caller immediately. A
//! [`GateError::WriteFailure`] is only returned after the atomic write protocol has
//! restored the previous file contents, so on-disk state is never worse than before
//! the failed call.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for mcp-gate operations.
///
/// Every variant names the entry, file, or selection that failed so the
/// interactive layer can report exactly what went wrong.
#[derive(Error, Debug)]
pub enum GateError {
    /// A config file exists but cannot be parsed or fails shape validation.
    #[error("Malformed config file {}: {reason}", path.display())]
    MalformedConfig {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying parse diagnostic
        reason: String,
    },

    /// The target of a block/unblock operation does not exist.
    ///
    /// `kind` is one of `"server"`, `"override"`, or `"memory file"`.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was being looked up
        kind: &'static str,
        /// Name or path of the missing entry
        name: String,
    },

    /// An original definition was requested from an entry that is not blocked.
    #[error("Server '{name}' is not blocked")]
    NotBlocked {
        /// Name of the server entry
        name: String,
    },

    /// The atomic write protocol failed.
    ///
    /// `restored` is `true` when a backup was put back over the live file.
    #[error("Failed to write {}: {reason}", path.display())]
    WriteFailure {
        /// Live config path that was being written
        path: PathBuf,
        /// Description of the failing step
        reason: String,
        /// Whether the prior content was restored from backup
        restored: bool,
    },

    /// An input record violates a model invariant.
    #[error("Invalid {subject}: {reason}")]
    ValidationFailure {
        /// The record or field that failed
        subject: String,
        /// Why it failed
        reason: String,
    },

    /// A migration selection or conflict resolution is not acceptable.
    #[error("Invalid migration: {reason}")]
    InvalidMigration {
        /// Why the migration was rejected
        reason: String,
    },

    /// Plain I/O failure outside the atomic write protocol.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl GateError {
    /// Shorthand for a [`GateError::ValidationFailure`].
    pub fn validation(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailure {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`GateError::InvalidMigration`].
    pub fn invalid_migration(reason: impl Into<String>) -> Self {
        Self::InvalidMigration {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`GateError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for [`GateError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used by the library.
pub type Result<T, E = GateError> = std::result::Result<T, E>;

/// Error wrapper with user-facing details and a suggestion.
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

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
        write!(f, "{}", self.message)?;

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

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`GateError`] anywhere in the `anyhow` chain and attaches a
/// tailored suggestion; other errors keep their full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let top = error.to_string();

    if let Some(gate_error) = error.chain().find_map(|e| e.downcast_ref::<GateError>()) {
        let ctx = create_error_context(gate_error);
        // Keep the caller's context line when it adds information
        return if top == gate_error.to_string() {
            ctx
        } else {
            ErrorContext {
                message: top,
                details: Some(gate_error.to_string()),
                suggestion: ctx.suggestion,
            }
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(top)
            .with_suggestion("Check file ownership and permissions of the config directory");
    }

    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    let ctx = ErrorContext::new(top);
    if causes.is_empty() { ctx } else { ctx.with_details(causes.join("\n")) }
}

fn create_error_context(error: &GateError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        GateError::MalformedConfig { path, .. } => ctx
            .with_suggestion(format!("Fix the JSON syntax in {}", path.display()))
            .with_details("The file was left untouched; other scopes are still readable"),
        GateError::NotFound { kind: "server", .. } => ctx.with_suggestion(
            "Run 'mcp-gate list' to see which servers are defined in the local scope",
        ),
        GateError::NotFound { kind: "override", .. } => {
            ctx.with_suggestion("Only inherited servers blocked from this directory can be unblocked here")
        }
        GateError::NotFound { .. } => ctx,
        GateError::NotBlocked { .. } => {
            ctx.with_details("Only entries carrying the `_blocked` marker hold an original definition")
        }
        GateError::WriteFailure { restored, .. } => {
            let details = if *restored {
                "The previous file contents were restored from backup"
            } else {
                "No previous file existed; nothing was changed"
            };
            ctx.with_details(details)
                .with_suggestion("Check disk space and write permissions, then retry")
        }
        GateError::ValidationFailure { .. } | GateError::InvalidMigration { .. } => ctx,
        GateError::Io { .. } => {
            ctx.with_suggestion("Check that the path exists and is accessible")
        }
    }
}
