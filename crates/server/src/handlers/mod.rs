//! HTTP handlers, grouped by portal area.

pub mod alerts;
pub mod applications;
pub mod auth;
pub mod chat;
pub mod complaints;
pub mod insights;
pub mod places;
pub mod roles;
