use fra_portal::{StatusSummary, Village, VillageFilter, VillageOverlay, approval_rate};

use super::ExitCode;

#[derive(clap::Args)]
pub struct Args {
    /// Only villages in this state
    #[arg(short, long)]
    pub state: Option<String>,

    /// Only villages in this district
    #[arg(short, long)]
    pub district: Option<String>,

    /// Claim status: Approved, Pending or Rejected
    #[arg(long)]
    pub status: Option<String>,

    /// Claim type: IFR or CFR
    #[arg(long)]
    pub fra_type: Option<String>,

    /// Print the villages as JSON
    #[arg(long)]
    pub json: bool,
}

fn print_villages(villages: &[Village]) {
    println!(
        "{:<3} | {:<18} | {:<16} | {:<12} | {:<4} | {:<8} | {}",
        "ID", "Name", "State", "District", "Type", "Status", "Land (ha)"
    );
    for v in villages {
        println!(
            "{:<3} | {:<18} | {:<16} | {:<12} | {:<4} | {:<8} | {}",
            v.id.0, v.name, v.state, v.district, v.claim_type, v.status, v.land_area
        );
    }

    let summary = StatusSummary::of(villages);
    println!(
        "{} approved, {} pending, {} rejected ({}% approved)",
        summary.approved,
        summary.pending,
        summary.rejected,
        approval_rate(summary.approved, summary.total())
    );
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    let filter = VillageFilter::from_choices(
        args.state.as_deref(),
        args.district.as_deref(),
        args.status.as_deref(),
        args.fra_type.as_deref(),
    )?;

    let mut villages = VillageOverlay::new().all(fra_portal_data::villages::ALL);
    villages.retain(|v| filter.matches(v));
    if villages.is_empty() {
        eprintln!("No village matches the given filters");
        return Ok(ExitCode::RequestUnsatisfied);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&villages)?);
    } else {
        print_villages(&villages);
    }
    Ok(ExitCode::Ok)
}
