//! ReConectaTec donated equipment tracking
//!
//! REST JSON API that follows donated computers from intake through
//! refurbishment to delivery at receiving institutions, with support
//! tickets and email notifications along the way.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
