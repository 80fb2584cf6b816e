// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for values figment cannot check.

use confab_core::ConfabError;

use crate::model::ConfabConfig;

/// Validate cross-field constraints after a successful parse.
pub fn validate_config(config: &ConfabConfig) -> Result<(), ConfabError> {
    if config.server.host.trim().is_empty() {
        return Err(ConfabError::Config("server.host must not be empty".into()));
    }

    let level = config.server.log_level.as_str();
    if !matches!(level, "trace" | "debug" | "info" | "warn" | "error") {
        return Err(ConfabError::Config(format!(
            "server.log_level must be one of trace/debug/info/warn/error, got {level:?}"
        )));
    }

    if let Some(ref secret) = config.auth.token_secret {
        if secret.len() < 16 {
            return Err(ConfabError::Config(
                "auth.token_secret must be at least 16 characters".into(),
            ));
        }
    }

    // TURN credentials without a TURN URL are a config mistake, not a
    // harmless extra.
    if config.rtc.turn_url.is_none()
        && (config.rtc.turn_username.is_some() || config.rtc.turn_credential.is_some())
    {
        return Err(ConfabError::Config(
            "rtc.turn_username/turn_credential require rtc.turn_url".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn default_config_validates() {
        let config = ConfabConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = load_config_from_str("[server]\nlog_level = \"verbose\"").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let config = load_config_from_str("[auth]\ntoken_secret = \"short\"").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn orphan_turn_credentials_are_rejected() {
        let config = load_config_from_str("[rtc]\nturn_username = \"u\"").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
