//! High-level pipeline API: XML file to reports.
//!
//! Combines every stage: extraction, date coercion, country inference,
//! validation, aggregation and artifact output.
//!
//! # Example
//!
//! ```rust,no_run
//! use census::{generate_reports, ReportOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ReportOptions {
//!         output_dir: "reports".into(),
//!         output_graph: true,
//!         ..ReportOptions::default()
//!     };
//!     let summary = generate_reports(Path::new("people.xml"), &options)?;
//!     println!("{} cities", summary.counts.len());
//!     Ok(())
//! }
//! ```

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{DataError, PipelineResult};
use crate::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::models::{AgePolicy, PersonRecord, RawPerson};
use crate::parser::read_people;
use crate::report::{
    artifact_path, average_age_by_city, classify_and_count, BarChart, CityAverages, CityReport,
    OutputStage, CHART_PREFIX, REPORT_PREFIX,
};
use crate::validation::{drop_invalid, RejectedRecord};
use super::infer::infer_countries;
use super::normalize::normalize_all;

/// Options for a reporting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Directory receiving the artifacts (must exist)
    pub output_dir: PathBuf,

    /// Also render the average-age chart
    pub output_graph: bool,

    /// How ages are derived from birth dates
    pub age_policy: AgePolicy,

    /// Write an empty report instead of failing when no record is valid
    pub allow_empty: bool,

    /// Font file for chart text
    pub font_path: Option<PathBuf>,

    /// Reference date for ages and file names (default: local today)
    pub today: Option<NaiveDate>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_graph: false,
            age_policy: AgePolicy::default(),
            allow_empty: false,
            font_path: None,
            today: None,
        }
    }
}

/// Per-stage statistics of a cleaning pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanStats {
    /// Records extracted from XML
    pub extracted: usize,

    /// Records whose date of birth could not be coerced
    pub dob_missing: usize,

    /// Records whose country was inferred from the ZIP code
    pub countries_inferred: usize,

    /// Records dropped by validation
    pub rejected: Vec<RejectedRecord>,
}

/// Valid records plus how they were obtained
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub records: Vec<PersonRecord>,
    pub stats: CleanStats,
    /// Encoding the input was decoded with
    pub encoding: String,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    /// Adult/child counts per city
    pub counts: CityReport,

    /// Rounded average age per city, when the chart was requested
    pub averages: Option<CityAverages>,

    /// Number of valid records reported on
    pub valid_count: usize,

    pub stats: CleanStats,

    /// Date used for ages and file names
    pub today: NaiveDate,

    /// Written JSON report
    pub report_path: PathBuf,

    /// Written chart, if any
    pub chart_path: Option<PathBuf>,
}

/// Run normalization, inference and validation on extracted records.
pub fn clean_records(raw: Vec<RawPerson>) -> (Vec<PersonRecord>, CleanStats) {
    let extracted = raw.len();

    let normalized = normalize_all(raw);
    let dob_missing = normalized.iter().filter(|r| r.dob.is_none()).count();

    let (inferred, countries_inferred) = infer_countries(normalized);
    let outcome = drop_invalid(inferred);

    let stats = CleanStats {
        extracted,
        dob_missing,
        countries_inferred,
        rejected: outcome.rejected,
    };
    (outcome.valid, stats)
}

/// Read an XML file and return its valid records.
pub fn clean_people(path: &Path) -> PipelineResult<CleanResult> {
    log_info(format!("Reading {}", path.display()));
    let extraction = read_people(path)?;

    let (records, stats) = clean_records(extraction.records);
    print_clean_stats(&stats, records.len());

    Ok(CleanResult {
        records,
        stats,
        encoding: extraction.encoding,
    })
}

/// Run the whole pipeline and write the artifacts.
///
/// Nothing is written unless every artifact was produced.
///
/// # Errors
/// - `Input` / `Parse` errors from reading the file
/// - [`DataError::NoValidRecords`] when nothing survives cleaning and
///   `allow_empty` is off
/// - `Output` errors when the directory is missing or a write fails
pub fn generate_reports(input: &Path, options: &ReportOptions) -> PipelineResult<ReportSummary> {
    let today = options.today.unwrap_or_else(|| Local::now().date_naive());
    let cleaned = clean_people(input)?;

    if cleaned.records.is_empty() {
        if options.allow_empty {
            log_warning("No valid records; writing an empty report");
        } else {
            return Err(DataError::NoValidRecords { extracted: cleaned.stats.extracted }.into());
        }
    }

    let valid_count = cleaned.records.len();
    log_info(format!("Classifying {} record(s) as of {}", valid_count, today));
    let (counts, classified) = classify_and_count(cleaned.records, today, options.age_policy);

    let mut stage = OutputStage::new(&options.output_dir)?;

    let report_path = artifact_path(stage.dir(), REPORT_PREFIX, today, "json");
    stage.stage_json(report_path.clone(), &counts)?;

    let mut averages = None;
    let mut chart_path = None;
    if options.output_graph {
        let by_city = average_age_by_city(&classified);
        if by_city.is_empty() {
            log_warning("No cities to chart; skipping graph");
        } else {
            let path = artifact_path(stage.dir(), CHART_PREFIX, today, "png");
            let chart = BarChart::average_age(&by_city).with_font(options.font_path.clone());
            stage.stage_with(path.clone(), |tmp| chart.render(tmp))?;
            chart_path = Some(path);
        }
        averages = Some(by_city);
    }

    for written in stage.commit()? {
        log_success(format!("Wrote {}", written.display()));
    }

    Ok(ReportSummary {
        counts,
        averages,
        valid_count,
        stats: cleaned.stats,
        today,
        report_path,
        chart_path,
    })
}

/// Print cleaning statistics
fn print_clean_stats(stats: &CleanStats, valid: usize) {
    if stats.dob_missing > 0 {
        log_warning(format!("{} date(s) of birth could not be parsed", stats.dob_missing));
    }
    if stats.countries_inferred > 0 {
        log_info(format!("Inferred country for {} record(s) from ZIP code", stats.countries_inferred));
    }

    if stats.rejected.is_empty() {
        log_success(format!("All {} records valid", valid));
        return;
    }

    log_warning(format!(
        "{} of {} record(s) dropped (missing fields)",
        stats.rejected.len(),
        stats.extracted
    ));

    // Group by reason
    let mut reasons: HashMap<String, Vec<usize>> = HashMap::new();
    for rejected in &stats.rejected {
        reasons.entry(rejected.missing.join(", ")).or_default().push(rejected.index);
    }
    let mut reasons: Vec<_> = reasons.into_iter().collect();
    reasons.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

    for (reason, rows) in reasons.iter().take(5) {
        let sample: Vec<String> = rows.iter().take(5).map(|r| r.to_string()).collect();
        let more = if rows.len() > 5 { format!(" ... +{}", rows.len() - 5) } else { String::new() };
        log_warning_indent(format!("Missing {} (records: {}{})", reason, sample.join(", "), more), 1);
    }
}
