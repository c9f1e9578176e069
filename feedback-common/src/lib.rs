//! # Feedback Common Library
//!
//! Shared code for the feedback services including:
//! - Database initialization and row models
//! - Configuration loading (root folder, TOML file)
//! - Common error type
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
