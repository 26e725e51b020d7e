use fra_portal::StaticForestArea;

use super::ExitCode;

#[derive(clap::Args)]
pub struct Args {
    /// Filter forest areas by state name
    #[arg(short, long)]
    pub state: Option<String>,
}

fn print_forest_areas(mut areas: Vec<&'static StaticForestArea>) {
    println!(
        "{:<3} | {:<32} | {:<16} | {:<20} | {}",
        "ID", "Name", "State", "Type", "Protection"
    );
    areas.sort_by(|a, b| Ord::cmp(a.state, b.state).then(Ord::cmp(a.name, b.name)));

    for area in areas {
        println!(
            "{:<3} | {:<32} | {:<16} | {:<20} | {}",
            area.id.0, area.name, area.state, area.kind, area.protection_status
        );
    }
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    let mut areas: Vec<_> = fra_portal_data::forest_areas::ALL.to_vec();
    if let Some(state) = args.state {
        let state = state.to_lowercase();
        areas.retain(|area| area.state.to_lowercase() == state);
    }

    if areas.is_empty() {
        eprintln!("No forest area matches the given state");
        return Ok(ExitCode::RequestUnsatisfied);
    }
    print_forest_areas(areas);
    Ok(ExitCode::Ok)
}
