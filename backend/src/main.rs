//! Census CLI - Per-city age reports from XML people records
//!
//! ```bash
//! census people.xml out/                    # JSON report only
//! census people.xml out/ --output_graph     # JSON report + average-age chart
//! census people.xml out/ --date 20250101    # Fixed reference date
//! ```

use chrono::NaiveDate;
use clap::Parser;
use census::logs::{init_logging, log_error};
use census::{generate_reports, normalize_dob, AgePolicy, ReportOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "census")]
#[command(about = "Classify people from an XML file into per-city adult/child reports", long_about = None)]
struct Cli {
    /// Input XML file
    input_file: PathBuf,

    /// Existing directory receiving the reports
    output_path: PathBuf,

    /// Also render the average-age-by-city bar chart
    #[arg(long = "output_graph")]
    output_graph: bool,

    /// How ages are computed from birth dates
    #[arg(long, value_enum, default_value_t = AgePolicy::Calendar, env = "CENSUS_AGE_POLICY")]
    age_policy: AgePolicy,

    /// Write an empty report when no record is valid
    #[arg(long)]
    allow_empty: bool,

    /// Font file (TTF/OTF) for chart text
    #[arg(long, env = "CENSUS_CHART_FONT")]
    font: Option<PathBuf>,

    /// Reference date for ages and file names (default: today)
    #[arg(long, value_name = "YYYYMMDD", value_parser = parse_date, env = "CENSUS_TODAY")]
    date: Option<NaiveDate>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    normalize_dob(raw).ok_or_else(|| format!("not a date: '{}'", raw))
}

fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ReportOptions {
        output_dir: cli.output_path,
        output_graph: cli.output_graph,
        age_policy: cli.age_policy,
        allow_empty: cli.allow_empty,
        font_path: cli.font,
        today: cli.date,
    };

    match generate_reports(&cli.input_file, &options) {
        Ok(summary) => {
            for (city, counts) in &summary.counts {
                println!("City: {}, Adults: {}, Children: {}", city, counts.adult, counts.child);
            }
            println!("reports generated");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error(format!("{} stage failed", e.stage()));
            eprintln!("Error [{}]: {}", e.stage(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
