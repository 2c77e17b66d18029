//! Job file checker
//!
//! Loads a `job.ini`, builds and validates it, and reports the outcome.
//!
//! Usage:
//!   cargo run --features cli --bin oq_check -- job.ini
//!   cargo run --features cli --bin oq_check -- job.ini --to-ini
//!   cargo run --features cli --bin oq_check -- job.ini --json --risk-imt PGA --risk-imt "SA(1.0)"

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use oq_config::{Imt, JobIniLoader};

/// Validate a seismic hazard job file
#[derive(Parser, Debug)]
#[command(name = "oq_check")]
#[command(about = "Validate a job.ini and print the normalized configuration")]
struct Args {
    /// Path to the job file
    job_ini: PathBuf,

    /// Print the normalized job file
    #[arg(long)]
    to_ini: bool,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,

    /// IMTs implied by the risk model (can be specified multiple times)
    #[arg(long, value_parser = parse_imt)]
    risk_imt: Vec<Imt>,
}

fn parse_imt(s: &str) -> Result<Imt, String> {
    Imt::from_string(s).map_err(|e| format!("Unknown IMT {}", e))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut oq = JobIniLoader::new(&args.job_ini).load_validated()?;
    if !args.risk_imt.is_empty() {
        let risk_imtls: BTreeMap<Imt, Vec<f64>> = args
            .risk_imt
            .iter()
            .map(|imt| (imt.clone(), Vec::new()))
            .collect();
        oq.set_risk_imts(&risk_imtls)
            .context("Risk IMTs are not compatible with the job")?;
    }

    if args.json {
        let report = json!({
            "job_ini": args.job_ini.display().to_string(),
            "calculation_mode": oq.calculation_mode().as_str(),
            "imts": oq.imtls().names(),
            "gsims": oq.gsim_names(),
            "tectonic_region_types": oq.tectonic_region_types(),
            "diagnostics": oq.diagnostics(),
            "inputs": oq.inputs,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.to_ini {
        print!("{}", oq.to_ini());
    } else {
        println!(
            "{}: valid {} job, {} warning(s)",
            args.job_ini.display(),
            oq.calculation_mode(),
            oq.warnings().len()
        );
        for warning in oq.warnings() {
            println!("  warning: {}", warning.message);
        }
    }
    Ok(())
}
