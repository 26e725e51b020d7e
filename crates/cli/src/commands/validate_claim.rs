use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use fra_portal::{ApplicationForm, DEFAULT_RADIUS_KM, analyze, validate_claim};
use log::warn;

use super::ExitCode;

#[derive(clap::Args)]
pub struct Args {
    /// JSON file holding the claim form
    #[arg(short, long)]
    pub file: PathBuf,

    /// Cross-check the claim against a simulated asset analysis of its coordinates
    #[arg(long)]
    pub analyze: bool,
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    let contents = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Reading {}", args.file.display()))?;
    let form: ApplicationForm = serde_json::from_str(&contents)
        .with_context(|| format!("Parsing claim form in {}", args.file.display()))?;

    let analysis = match (args.analyze, form.coordinates) {
        (true, Some(center)) => Some(analyze(center, DEFAULT_RADIUS_KM, Utc::now())?),
        (true, None) => {
            warn!("The claim has no coordinates; skipping asset analysis");
            None
        }
        (false, _) => None,
    };

    let report = validate_claim(&form, analysis);
    println!(
        "Score: {}/100 ({:?} confidence, {:.0}%)",
        report.score,
        report.band(),
        report.confidence * 100.0
    );
    for issue in &report.issues {
        println!(" ! {}", issue);
    }
    for recommendation in &report.recommendations {
        println!(" - {}", recommendation);
    }

    Ok(if report.is_valid {
        ExitCode::Ok
    } else {
        ExitCode::RequestUnsatisfied
    })
}
