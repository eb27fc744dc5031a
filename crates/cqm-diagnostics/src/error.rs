//! Measure processing error types

use crate::{CQM0100, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - processing cannot proceed
    Error,
    /// Warning - potential issue but processing continues
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message raised while processing a measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Library the diagnostic refers to
    pub library: Option<String>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create a new informational diagnostic
    pub fn info(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            library: None,
            help: None,
        }
    }

    /// Set the library
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".cyan(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(library) = &self.library {
            write!(f, " (library {})", library)?;
        }
        Ok(())
    }
}

/// Main measure processing error type
#[derive(Debug, Clone, Error)]
pub enum CqmError {
    /// Malformed ELM or HQMF input
    #[error("{code}: {message}")]
    Input {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Library, alias or statement resolution failure
    #[error("{code}: {message}")]
    Resolution {
        code: ErrorCode,
        message: String,
        library: Option<String>,
        statement: Option<String>,
    },

    /// Logic extraction or diff failure
    #[error("{code}: {message}")]
    Logic {
        code: ErrorCode,
        message: String,
        reference: Option<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl CqmError {
    /// Create an input error
    pub fn input(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Input {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create an unexpected structure error for a library statement
    pub fn unexpected_structure(
        message: impl Into<String>,
        library: Option<String>,
        statement: Option<String>,
    ) -> Self {
        Self::Resolution {
            code: CQM0100,
            message: message.into(),
            library,
            statement,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Input { code, .. } => *code,
            Self::Resolution { code, .. } => *code,
            Self::Logic { code, .. } => *code,
            Self::System { code, .. } => *code,
        }
    }

    /// Library named by the error, if any
    pub fn library(&self) -> Option<&str> {
        match self {
            Self::Resolution { library, .. } => library.as_deref(),
            _ => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Input { code, message, context } | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
            Self::Resolution { code, message, library, .. } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(library) = library {
                    diag = diag.with_library(library.clone());
                }
                if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
            Self::Logic { code, message, .. } => Diagnostic::error(*code, message.clone()),
        }
    }
}
