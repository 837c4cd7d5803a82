//! Run a batch of scenario requests from a JSON file
//!
//! Writes one summary row per request to CSV and, optionally, the full
//! results to JSON. Failed requests are reported in the summary and do not
//! stop the batch.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use pension_engine::{EngineResult, ScenarioRequest, ScenarioResult, ScenarioRunner};

#[derive(Debug, Parser)]
#[command(name = "run_batch", about = "Evaluate a JSON array of scenario requests")]
struct Args {
    /// JSON file holding an array of scenario requests
    input: PathBuf,

    /// Summary CSV output
    #[arg(long, default_value = "batch_summary.csv")]
    summary: PathBuf,

    /// Full results JSON output
    #[arg(long)]
    results: Option<PathBuf>,

    /// Directory with mortality CSVs and optional statutory.json
    #[arg(long)]
    assumptions: Option<PathBuf>,
}

/// One line of the summary CSV
#[derive(Debug, Serialize)]
struct SummaryRow {
    #[serde(rename = "Index")]
    index: usize,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Modality")]
    modality: String,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "MonthlyBenefit")]
    monthly_benefit: f64,
    #[serde(rename = "IndexUnits")]
    index_units: f64,
    #[serde(rename = "AnnualBenefit")]
    annual_benefit: f64,
    #[serde(rename = "CNU")]
    cnu: f64,
    #[serde(rename = "LifeExpectancy")]
    life_expectancy: f64,
    #[serde(rename = "Notes")]
    notes: String,
}

impl SummaryRow {
    fn new(index: usize, request: &ScenarioRequest, result: &EngineResult<ScenarioResult>) -> Self {
        let mut row = Self {
            index,
            category: request.category.to_string(),
            modality: request.modality.to_string(),
            status: "error",
            monthly_benefit: 0.0,
            index_units: 0.0,
            annual_benefit: 0.0,
            cnu: 0.0,
            life_expectancy: 0.0,
            notes: String::new(),
        };

        match result {
            Ok(result) => {
                let summary = result.summary();
                row.status = if result.is_usable() { "ok" } else { "unavailable" };
                row.monthly_benefit = summary.monthly_benefit;
                row.index_units = summary.benefit_in_index_units;
                row.annual_benefit = summary.annual_benefit;
                row.cnu = summary.necessary_unit_capital;
                row.life_expectancy = summary.life_expectancy_years;
                row.notes = summary.advisories.join("; ");
            }
            Err(e) => row.notes = e.to_string(),
        }

        row
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let runner = match &args.assumptions {
        Some(dir) => ScenarioRunner::from_csv_path(dir)
            .with_context(|| format!("failed to load assumptions from {}", dir.display()))?,
        None => ScenarioRunner::new(),
    };

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let requests: Vec<ScenarioRequest> = serde_json::from_reader(file)
        .with_context(|| format!("failed to parse requests in {}", args.input.display()))?;
    println!("Loaded {} requests in {:?}", requests.len(), start.elapsed());

    let results = runner.run_batch(&requests);
    println!("Evaluated {} scenarios in {:?}", results.len(), start.elapsed());

    let mut writer = csv::Writer::from_path(&args.summary)
        .with_context(|| format!("failed to create {}", args.summary.display()))?;
    for (index, (request, result)) in requests.iter().zip(&results).enumerate() {
        writer.serialize(SummaryRow::new(index, request, result))?;
    }
    writer.flush()?;
    println!("Summary written to: {}", args.summary.display());

    let failed = results.iter().filter(|r| r.is_err()).count();
    let unavailable = results
        .iter()
        .filter(|r| matches!(r, Ok(result) if !result.is_usable()))
        .count();

    if let Some(path) = &args.results {
        let successful: Vec<&ScenarioResult> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &successful)?;
        println!("Results written to: {}", path.display());
    }

    println!(
        "\n{} ok, {} unavailable, {} rejected",
        results.len() - failed - unavailable,
        unavailable,
        failed
    );

    Ok(())
}
