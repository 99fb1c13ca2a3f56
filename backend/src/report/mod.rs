//! Report generation.
//!
//! - Aggregate: age classification, per-city counts and averages
//! - JSON: report serialization
//! - Chart: average-age bar chart
//! - Output: date-stamped names and all-or-nothing writes

pub mod aggregate;
pub mod chart;
pub mod json;
pub mod output;

pub use aggregate::{
    average_age_by_city, classify, classify_and_count, count_by_city, CityAverages, CityReport,
};
pub use chart::BarChart;
pub use json::to_pretty_json;
pub use output::{artifact_path, date_stamp, OutputStage, CHART_PREFIX, REPORT_PREFIX};
