//! Measure processing error codes following a structured numbering system
//!
//! Error code ranges:
//! - CQM0001-CQM0099: Input errors (ELM / HQMF documents)
//! - CQM0100-CQM0199: Resolution errors (libraries, aliases, statements)
//! - CQM0200-CQM0299: Terminology errors (codes, value sets)
//! - CQM0300-CQM0399: Logic errors (extraction, diff)
//! - CQM0400-CQM0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is an input error (0001-0099)
    pub const fn is_input_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a resolution error (0100-0199)
    pub const fn is_resolution_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a terminology error (0200-0299)
    pub const fn is_terminology_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a logic error (0300-0399)
    pub const fn is_logic_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CQM{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Input errors (0001-0099)
    map.insert(1, ErrorInfo::new("Invalid ELM JSON document"));
    map.insert(2, ErrorInfo::new("ELM library has no identifier"));
    map.insert(3, ErrorInfo::new("Invalid HQMF measure document"));
    map.insert(4, ErrorInfo::new("Invalid measure logic document"));

    // Resolution errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unexpected ELM structure"));
    map.insert(
        101,
        ErrorInfo::new("Unknown library alias")
            .with_help("Check the includes section of the referencing library"),
    );
    map.insert(
        102,
        ErrorInfo::new("Referenced library is not loaded")
            .with_help("A supporting library may be missing from the measure package"),
    );
    map.insert(103, ErrorInfo::new("Referenced statement not found"));
    map.insert(104, ErrorInfo::new("Maximum statement resolution depth exceeded"));
    map.insert(
        110,
        ErrorInfo::new("Library declared by more than one component measure")
            .with_help("Two versions of a shared library may be shadowing each other"),
    );

    // Terminology errors (0200-0299)
    map.insert(200, ErrorInfo::new("Inline code has no direct reference code identity"));
    map.insert(201, ErrorInfo::new("Code references an undeclared code system"));

    // Logic errors (0300-0399)
    map.insert(300, ErrorInfo::new("Measure logic extraction failed"));
    map.insert(301, ErrorInfo::new("Referenced data criteria not found"));
    map.insert(302, ErrorInfo::new("Unknown temporal relationship"));
    map.insert(303, ErrorInfo::new("Maximum logic nesting depth exceeded"));
    map.insert(304, ErrorInfo::new("Satisfies criteria without children"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("I/O error"));
    map.insert(401, ErrorInfo::new("Configuration error"));

    map
});

// Input errors
pub const CQM0001: ErrorCode = ErrorCode::new(1);
pub const CQM0002: ErrorCode = ErrorCode::new(2);
pub const CQM0003: ErrorCode = ErrorCode::new(3);
pub const CQM0004: ErrorCode = ErrorCode::new(4);

// Resolution errors
pub const CQM0100: ErrorCode = ErrorCode::new(100);
pub const CQM0101: ErrorCode = ErrorCode::new(101);
pub const CQM0102: ErrorCode = ErrorCode::new(102);
pub const CQM0103: ErrorCode = ErrorCode::new(103);
pub const CQM0104: ErrorCode = ErrorCode::new(104);
pub const CQM0110: ErrorCode = ErrorCode::new(110);

// Terminology errors
pub const CQM0200: ErrorCode = ErrorCode::new(200);
pub const CQM0201: ErrorCode = ErrorCode::new(201);

// Logic errors
pub const CQM0300: ErrorCode = ErrorCode::new(300);
pub const CQM0301: ErrorCode = ErrorCode::new(301);
pub const CQM0302: ErrorCode = ErrorCode::new(302);
pub const CQM0303: ErrorCode = ErrorCode::new(303);
pub const CQM0304: ErrorCode = ErrorCode::new(304);

// System errors
pub const CQM0400: ErrorCode = ErrorCode::new(400);
pub const CQM0401: ErrorCode = ErrorCode::new(401);
