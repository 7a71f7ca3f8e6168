// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types for the Anim64 compiler.
//!
//! Every failure of the pipeline (recording, freezing the dictionary,
//! compiling scripts, laying out memory, reading recordings) is reported as
//! an [`AnimError`] carrying a stable [`ErrorCode`]. None of them is retried:
//! the same input always reproduces the same failure.

use std::ops::Range;
use thiserror::Error;

/// A source span representing a range in a recording text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of this span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Error codes for the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Recording errors (E001-E009)
    InvalidObjectIndex,
    AttributeCountMismatch,
    TooManySteps,

    // Configuration errors (E010-E019)
    InvalidConfig,

    // Script errors (E020-E029)
    NeverVisible,
    DeltaIndexOutOfRange,
    StateOutOfRange,

    // Layout errors (E030-E039)
    BinCapacityExceeded,
    AddressOverflow,
    InvalidBins,

    // Input errors (E040-E049)
    InvalidRecording,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidObjectIndex => "E001",
            ErrorCode::AttributeCountMismatch => "E002",
            ErrorCode::TooManySteps => "E003",

            ErrorCode::InvalidConfig => "E010",

            ErrorCode::NeverVisible => "E020",
            ErrorCode::DeltaIndexOutOfRange => "E021",
            ErrorCode::StateOutOfRange => "E022",

            ErrorCode::BinCapacityExceeded => "E030",
            ErrorCode::AddressOverflow => "E031",
            ErrorCode::InvalidBins => "E032",

            ErrorCode::InvalidRecording => "E040",
        }
    }
}

/// A compiler error.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct AnimError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// The object the error is about, if any.
    pub object: Option<usize>,
    /// Location inside a recording text, for input errors.
    pub span: Option<Span>,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl AnimError {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            object: None,
            span: None,
            hint: None,
        }
    }

    /// Attach the offending object.
    pub fn for_object(mut self, object: usize) -> Self {
        self.object = Some(object);
        self
    }

    /// Attach a location inside the recording text.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add a hint to this error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the error code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// A block did not fit into any bin.
    ///
    /// `remaining` lists every bin as `(address, free bytes)` so the caller
    /// can resize its address ranges.
    pub fn bin_capacity_exceeded(block: &str, size: usize, remaining: &[(u16, usize)]) -> Self {
        let free = remaining
            .iter()
            .map(|(address, free)| format!("${:04X}: {} bytes", address, free))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorCode::BinCapacityExceeded,
            format!(
                "Block '{}' ({} bytes) does not fit into any bin (free: {})",
                block,
                size,
                if free.is_empty() { "none" } else { &free }
            ),
        )
        .with_hint("Enlarge an address range or add another bin")
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, AnimError>;

/// Source location with line and column information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// The content of the line.
    pub line_content: String,
}

impl SourceLocation {
    /// Calculate line and column from a byte offset in source text.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];

        let line = before.chars().filter(|&c| c == '\n').count() + 1;

        let last_newline = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[last_newline..].chars().count() + 1;

        let line_end = source[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(source.len());
        let line_content = source[last_newline..line_end].to_string();

        Self {
            line,
            column,
            line_content,
        }
    }
}

/// Format an error for the terminal.
///
/// Errors that point into a recording are shown with the offending line
/// underlined; all others print the message, the object and the hint.
pub fn format_error(error: &AnimError, source: &str, filename: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str(&format!("error[{}]: {}\n", error.code_str(), error.message));

    let mut width = 1;

    if let Some(span) = &error.span {
        let loc = SourceLocation::from_offset(source, span.start);
        let filename = filename.unwrap_or("<input>");
        width = loc.line.to_string().len();

        output.push_str(&format!("  --> {}:{}:{}\n", filename, loc.line, loc.column));
        output.push_str(&format!("{:>width$} |\n", "", width = width));
        output.push_str(&format!(
            "{:>width$} | {}\n",
            loc.line,
            loc.line_content,
            width = width
        ));

        let underline_start = loc.column - 1;
        let underline_len = span
            .len()
            .max(1)
            .min(loc.line_content.len().saturating_sub(underline_start).max(1));
        output.push_str(&format!(
            "{:>width$} | {:>start$}{}\n",
            "",
            "",
            "^".repeat(underline_len),
            width = width,
            start = underline_start
        ));
    }

    if let Some(object) = error.object {
        output.push_str(&format!("{:>width$} = object: {}\n", "", object, width = width));
    }

    if let Some(hint) = &error.hint {
        output.push_str(&format!("{:>width$} = hint: {}\n", "", hint, width = width));
    }

    output
}
