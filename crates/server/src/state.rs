//! Shared state for the portal's HTTP service.

use std::sync::Arc;

use fra_portal::{
    AlertBoard, ApplicationRegistry, ComplaintBook, DEMO_ACCOUNTS, GeminiConfig, GeminiError,
    GeminiSession, SessionStore, VillageOverlay,
};
use tokio::sync::Mutex;

/// Everything the portal keeps between requests. Lost on restart.
pub struct Portal {
    pub sessions: SessionStore,
    pub overlay: VillageOverlay,
    pub applications: ApplicationRegistry,
    pub complaints: ComplaintBook,
    pub alerts: AlertBoard,
    pub signups: usize,
}

impl Portal {
    pub fn seeded() -> Self {
        Portal {
            sessions: SessionStore::new(),
            overlay: VillageOverlay::new(),
            applications: ApplicationRegistry::new(),
            complaints: ComplaintBook::seeded(),
            alerts: AlertBoard::seeded(fra_portal_data::alerts::ALL),
            signups: 0,
        }
    }

    /// Demo accounts plus everyone who signed up since startup.
    pub fn known_users(&self) -> usize {
        DEMO_ACCOUNTS.len() + self.signups
    }
}

pub struct AppState {
    pub gemini: GeminiSession,
    pub portal: Mutex<Portal>,
}

impl AppState {
    pub fn new(gemini: GeminiConfig) -> Result<Self, GeminiError> {
        Ok(AppState {
            gemini: GeminiSession::new(reqwest::ClientBuilder::new(), gemini)?,
            portal: Mutex::new(Portal::seeded()),
        })
    }
}

pub type SharedState = Arc<AppState>;
