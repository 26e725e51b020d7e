use fra_portal::VillageId;

use super::ExitCode;

#[derive(clap::Args)]
pub struct Args {
    /// Village ID to get information about
    #[arg(short, long)]
    pub id: u32,
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    let Some(village) = fra_portal_data::village(VillageId(args.id)) else {
        eprintln!("Unknown village: {}", args.id);
        return Ok(ExitCode::RequestUnsatisfied);
    };

    println!("Village Information:");
    println!(" - ID: {}", village.id.0);
    println!(" - Name: {}", village.name);
    println!(" - Location: {}, {}", village.district, village.state);
    println!(
        " - Coordinates: {:.4}, {:.4}",
        village.coordinates.lat, village.coordinates.lng
    );
    println!(" - FRA type: {}", village.claim_type);
    println!(" - Claim status: {}", village.status);
    println!(" - Land area: {} ha", village.land_area);
    println!(" - Population: {}", village.population);
    println!(" - Forest cover: {}%", village.forest_cover);
    println!(" - Last updated: {}", village.last_updated);

    let nearby: Vec<_> = fra_portal_data::forest_areas::ALL
        .iter()
        .filter(|f| f.district == village.district)
        .collect();
    if !nearby.is_empty() {
        println!(" - Forest areas in {}:", village.district);
        for area in nearby {
            println!("  - {} ({}, {} ha)", area.name, area.kind, area.area);
        }
    }

    Ok(ExitCode::Ok)
}
