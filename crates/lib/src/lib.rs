mod alert;
mod analysis;
mod application;
mod auth;
mod complaint;
mod error;
mod gemini;
mod geojson;
mod model;
mod role;
mod stats;
mod validation;
mod village;

pub use alert::*;
pub use analysis::*;
pub use application::*;
pub use auth::*;
pub use complaint::*;
pub use error::*;
pub use gemini::*;
pub use geojson::*;
pub use model::*;
pub use role::*;
pub use stats::*;
pub use validation::*;
pub use village::*;
