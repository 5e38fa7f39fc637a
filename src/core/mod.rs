//! Core Module - infrastructure shared by the whole service:
//! configuration, errors, logging, database pool and application state.

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod state;

pub use config::Config;
pub use database::DatabaseStatus;
pub use error::{AppError, ExtractError};
pub use state::AppState;
