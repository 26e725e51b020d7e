use fra_portal::{ChatMessage, ChatRequest, GeminiSession};
use reqwest::ClientBuilder;

use super::{ExitCode, GeminiArgs};

#[derive(clap::Args)]
pub struct Args {
    /// What to ask the portal assistant
    #[arg(short, long)]
    pub message: String,

    /// Replace the default system instruction
    #[arg(short, long)]
    pub system: Option<String>,

    #[command(flatten)]
    pub gemini: GeminiArgs,
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    let sess = GeminiSession::new(ClientBuilder::new(), args.gemini.config()?)?;
    let request = ChatRequest {
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: args.message,
        }],
        system: args.system,
    };

    let reply = sess.chat(&request).await?;
    if reply.is_empty() {
        eprintln!("The assistant returned no answer");
        return Ok(ExitCode::RequestUnsatisfied);
    }
    println!("{}", reply);
    Ok(ExitCode::Ok)
}
