// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Confab marketplace.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = confab_config::load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ConfabConfig;
pub use validation::validate_config;

use confab_core::ConfabError;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<ConfabConfig, ConfabError> {
    let config = load_config().map_err(|e| ConfabError::Config(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<ConfabConfig, ConfabError> {
    let config =
        load_config_from_str(toml_content).map_err(|e| ConfabError::Config(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}
