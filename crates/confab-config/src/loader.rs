// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./confab.toml` > `~/.config/confab/confab.toml`
//! > `/etc/confab/confab.toml`, with environment variable overrides via the
//! `CONFAB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConfabConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/confab/confab.toml` (system-wide)
/// 3. `~/.config/confab/confab.toml` (user XDG config)
/// 4. `./confab.toml` (local directory)
/// 5. `CONFAB_*` environment variables
pub fn load_config() -> Result<ConfabConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConfabConfig::default()))
        .merge(Toml::file("/etc/confab/confab.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("confab/confab.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("confab.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ConfabConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConfabConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConfabConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConfabConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CONFAB_AUTH_TOKEN_SECRET` must map to
/// `auth.token_secret`, not `auth.token.secret`.
fn env_provider() -> Env {
    Env::prefixed("CONFAB_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("rtc_", "rtc.", 1)
            .replacen("notifications_", "notifications.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [server]
            port = 9090
            verbose_errors = true

            [auth]
            token_secret = "test-secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(config.server.verbose_errors);
        assert_eq!(config.auth.token_secret.as_deref(), Some("test-secret"));
        // Untouched sections keep their defaults.
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [server]
            prot = 9090
            "#,
        );
        assert!(result.is_err(), "typo'd key should fail extraction");
    }

    #[test]
    fn rtc_turn_settings_parse() {
        let config = load_config_from_str(
            r#"
            [rtc]
            turn_url = "turn:turn.example.com:3478"
            turn_username = "confab"
            turn_credential = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.rtc.turn_url.as_deref(),
            Some("turn:turn.example.com:3478")
        );
        assert_eq!(config.rtc.stun_servers.len(), 2);
    }
}
