use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Sonarr and Real-Debrid API keys are set
/// - Jellyfin API key is set when the section is present
/// - Scheduler interval is not 0
/// - Server port is not 0 when the server is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.sonarr.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "sonarr.api_key cannot be empty".to_string(),
        ));
    }

    if config.real_debrid.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "real_debrid.api_key cannot be empty".to_string(),
        ));
    }

    if let Some(jellyfin) = &config.jellyfin {
        if jellyfin.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "jellyfin.api_key cannot be empty when [jellyfin] is configured".to_string(),
            ));
        }
    }

    if config.scheduler.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.interval_secs cannot be 0".to_string(),
        ));
    }

    if config.server.enabled && config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[sonarr]
api_key = "sonarr-key"

[real_debrid]
api_key = "rd-key"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_sonarr_key_fails() {
        let mut config = valid_config();
        config.sonarr.api_key = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_interval_fails() {
        let mut config = valid_config();
        config.scheduler.interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_port_zero_only_matters_when_enabled() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());

        config.server.enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
