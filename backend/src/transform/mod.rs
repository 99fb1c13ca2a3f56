//! Transformation module.
//!
//! This module turns extracted people into clean records and reports:
//! - Normalize: date-of-birth coercion
//! - Infer: country from US ZIP codes
//! - Pipeline: Main reporting pipeline

pub mod infer;
pub mod normalize;
pub mod pipeline;

pub use infer::{infer_countries, infer_country, is_us_zipcode, INFERRED_COUNTRY};
pub use normalize::{normalize, normalize_all, normalize_dob};
pub use pipeline::*;
