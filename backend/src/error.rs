//! Error types for the census pipeline.
//!
//! One error type per stage, in the order the pipeline runs them:
//!
//! - [`InputError`] - input file missing, not XML, or unreadable
//! - [`ParseError`] - malformed XML
//! - [`DataError`] - nothing left to report after cleaning
//! - [`OutputError`] - report or chart could not be written
//! - [`PipelineError`] - top-level wrapper returned by the pipeline
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! stage boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Input Errors
// =============================================================================

/// Errors raised before any XML is parsed.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input path does not carry an `.xml` extension.
    #[error("Input file is not an XML file: {}", .0.display())]
    NotXml(PathBuf),

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors while parsing the XML document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML reader rejected the document.
    #[error("Malformed XML in {origin} at byte {position}: {message}")]
    Malformed {
        origin: String,
        position: u64,
        message: String,
    },

    /// The document ended while elements were still open.
    #[error("Malformed XML in {origin}: unexpected end of document ({open} unclosed element(s))")]
    UnexpectedEof { origin: String, open: usize },

    /// The document contains no root element at all.
    #[error("Malformed XML in {origin}: no root element")]
    NoRoot { origin: String },
}

// =============================================================================
// Data Errors
// =============================================================================

/// Errors about the content of an otherwise well-formed input.
#[derive(Debug, Error)]
pub enum DataError {
    /// Every extracted record was dropped by validation.
    #[error("No valid records remain ({extracted} extracted, all rejected)")]
    NoValidRecords { extracted: usize },
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing report artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output directory does not exist.
    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Creating, writing or renaming a file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// The chart backend failed to draw or encode the image.
    #[error("Failed to render chart {}: {message}", path.display())]
    Chart { path: PathBuf, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline error.
///
/// Returned by [`crate::transform::pipeline::generate_reports`]. The
/// [`stage`](PipelineError::stage) names where the run stopped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl PipelineError {
    /// Short name of the failing stage, used in user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Input(_) => "input",
            PipelineError::Parse(_) => "parse",
            PipelineError::Data(_) => "data",
            PipelineError::Output(_) => "output",
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Input(_) => 2,
            PipelineError::Parse(_) => 3,
            PipelineError::Data(_) => 4,
            PipelineError::Output(_) => 5,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for input checks.
pub type InputResult<T> = Result<T, InputError>;

/// Result type for XML parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for artifact output.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
