use std::process::Termination;

pub mod chat;
pub mod list_forest_areas;
pub mod list_villages;
pub mod permissions;
pub mod serve;
pub mod validate_claim;
pub mod village_info;

#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    FaultOrArgsError = 1,
    RequestUnsatisfied = 2,
}

impl Termination for ExitCode {
    fn report(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }
}

/// Gemini settings shared by `serve` and `chat`.
#[derive(clap::Args)]
pub struct GeminiArgs {
    /// API key for Gemini's generateContent endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Override the Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL")]
    pub gemini_base_url: Option<String>,

    /// Model to ask
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,
}

impl GeminiArgs {
    pub fn config(self) -> anyhow::Result<fra_portal::GeminiConfig> {
        Ok(fra_portal::GeminiConfig::new(
            self.gemini_api_key,
            self.gemini_base_url.as_deref(),
            self.gemini_model,
        )?)
    }
}
