//! # Census - Per-city age reports from XML people records
//!
//! Census reads a `<people>` XML document, cleans the records, classifies
//! each person as adult or child and writes a per-city JSON report, plus an
//! optional bar chart of the average age per city.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  XML File   │────▶│   Parser    │────▶│  Transform  │────▶│   Report    │
//! │ (any enc.)  │     │ (auto-enc)  │     │ (dob, USA)  │     │ (JSON, PNG) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use census::{generate_reports, ReportOptions};
//! use std::path::Path;
//!
//! let options = ReportOptions { output_dir: "out".into(), ..ReportOptions::default() };
//! let summary = generate_reports(Path::new("people.xml"), &options).unwrap();
//! println!("Reported on {} cities", summary.counts.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Progress logging helpers
//! - [`models`] - Domain models (RawPerson, PersonRecord, Category)
//! - [`parser`] - XML extraction with encoding detection
//! - [`transform`] - Normalization, inference and pipeline
//! - [`validation`] - Required-field filtering
//! - [`report`] - Aggregation, JSON and chart output

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Reporting
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    DataError,
    InputError,
    OutputError,
    ParseError,
    PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AgePolicy,
    Category,
    CityCounts,
    ClassifiedPerson,
    PersonRecord,
    RawPerson,
    ADULT_AGE,
};

// =============================================================================
// Re-exports - XML Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_encoding,
    is_xml_file,
    parse_people_str,
    read_people,
    Extraction,
};

// =============================================================================
// Re-exports - Cleaning
// =============================================================================

pub use transform::{
    infer_countries,
    normalize_all,
    normalize_dob,
};

pub use validation::{drop_invalid, is_valid, missing_fields, RejectedRecord, ValidationOutcome};

// =============================================================================
// Re-exports - Reports
// =============================================================================

pub use report::{
    average_age_by_city,
    classify_and_count,
    BarChart,
    CityAverages,
    CityReport,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    clean_people,
    clean_records,
    generate_reports,
    CleanResult,
    CleanStats,
    ReportOptions,
    ReportSummary,
};
