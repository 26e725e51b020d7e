use clap::{Parser, Subcommand};
use log::LevelFilter;
mod commands;

#[derive(Parser)]
#[command(name = "fra-portal")]
#[command(about = "Serve and query the Forest Rights Act portal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    subcommand: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the portal's HTTP API and chat proxy
    Serve(commands::serve::Args),
    /// List villages, optionally filtered
    ListVillages(commands::list_villages::Args),
    /// Get information about a specific village
    VillageInfo(commands::village_info::Args),
    /// List forest areas
    ListForestAreas(commands::list_forest_areas::Args),
    /// Show what a role may do and which tabs it sees
    Permissions(commands::permissions::Args),
    /// Score a claim form the way the review screen does
    ValidateClaim(commands::validate_claim::Args),
    /// Ask the portal assistant a question
    Chat(commands::chat::Args),
}

#[tokio::main]
async fn main() -> anyhow::Result<commands::ExitCode> {
    dotenvy::dotenv().ok();
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    Ok(match cli.subcommand {
        Commands::Serve(args) => commands::serve::main(args).await?,
        Commands::ListVillages(args) => commands::list_villages::main(args).await?,
        Commands::VillageInfo(args) => commands::village_info::main(args).await?,
        Commands::ListForestAreas(args) => commands::list_forest_areas::main(args).await?,
        Commands::Permissions(args) => commands::permissions::main(args).await?,
        Commands::ValidateClaim(args) => commands::validate_claim::main(args).await?,
        Commands::Chat(args) => commands::chat::main(args).await?,
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["fra-portal", "serve"]).unwrap();
        let Commands::Serve(args) = cli.subcommand else {
            panic!("expected serve");
        };
        if std::env::var_os("API_PORT").is_none() {
            assert_eq!(args.port, 3001);
        }
        if std::env::var_os("API_HOST").is_none() {
            assert_eq!(args.host.to_string(), "127.0.0.1");
        }
    }
}
