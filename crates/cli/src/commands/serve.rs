use std::net::IpAddr;

use fra_portal_server::ServerConfig;

use super::{ExitCode, GeminiArgs};

#[derive(clap::Args)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "API_PORT", default_value_t = 3001)]
    pub port: u16,

    #[command(flatten)]
    pub gemini: GeminiArgs,
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    fra_portal_server::serve(ServerConfig {
        host: args.host,
        port: args.port,
        gemini: args.gemini.config()?,
    })
    .await?;
    Ok(ExitCode::Ok)
}
