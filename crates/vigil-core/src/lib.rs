//! Vigil Core - Foundation crate for the Vigil listing watcher.
//!
//! This crate provides shared error handling, configuration management,
//! and the fixed marketplace section vocabulary that the other Vigil
//! crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`sections`] - Section label to site code vocabulary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod sections;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, PollingConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, Result, VigilError};
pub use sections::{section_code, section_labels};
