// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Confab marketplace.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Confab configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfabConfig {
    /// HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Credential verification settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// WebRTC ICE server settings handed to clients.
    #[serde(default)]
    pub rtc: RtcConfig,

    /// Lifecycle notification settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// HTTP/WebSocket server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Development posture: include internal error detail in 500 bodies.
    /// Leave off in production.
    #[serde(default)]
    pub verbose_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            verbose_errors: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("confab").join("confab.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "confab.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Credential verification configuration.
///
/// Confab never issues tokens; it verifies tokens minted by the external
/// identity service against this shared secret. When unset, every request
/// is rejected (fail-closed).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared HMAC secret for bearer token verification.
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl std::fmt::Display for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AuthConfig {{ token_secret: {} }}",
            if self.token_secret.is_some() {
                "[redacted]"
            } else {
                "none"
            }
        )
    }
}

/// WebRTC ICE configuration returned by the public RTC config endpoint.
///
/// Media never touches the server; clients use these to negotiate a
/// direct peer link.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RtcConfig {
    /// STUN server URLs.
    #[serde(default = "default_stun_servers")]
    pub stun_servers: Vec<String>,

    /// Optional TURN relay URL (`turn:` scheme).
    #[serde(default)]
    pub turn_url: Option<String>,

    #[serde(default)]
    pub turn_username: Option<String>,

    #[serde(default)]
    pub turn_credential: Option<String>,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            stun_servers: default_stun_servers(),
            turn_url: None,
            turn_username: None,
            turn_credential: None,
        }
    }
}

fn default_stun_servers() -> Vec<String> {
    vec![
        "stun:stun.l.google.com:19302".to_string(),
        "stun:stun1.l.google.com:19302".to_string(),
    ]
}

/// Lifecycle notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// Emit lifecycle events to the configured notifier.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ConfabConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, "info");
        assert!(!config.server.verbose_errors);
        assert!(config.storage.wal_mode);
        assert!(config.auth.token_secret.is_none());
        assert_eq!(config.rtc.stun_servers.len(), 2);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn auth_config_display_redacts_secret() {
        let auth = AuthConfig {
            token_secret: Some("super-secret".to_string()),
        };
        let rendered = auth.to_string();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
