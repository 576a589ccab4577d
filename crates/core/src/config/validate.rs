use super::{types::Config, ConfigError};

/// Validate configuration semantics beyond presence:
/// - required string values must be non-empty
/// - steering lists must hold at least one entry
/// - run parameters must describe a usable run (duration, track range, retries)
/// - a platform section that is present must be complete
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    non_empty("generator.api_key", &config.generator.api_key)?;
    non_empty("generator.model", &config.generator.model)?;

    if config.content.adjectives.is_empty() {
        return Err(ConfigError::Validation(
            "content.adjectives must contain at least one entry".to_string(),
        ));
    }
    if config.content.themes.is_empty() {
        return Err(ConfigError::Validation(
            "content.themes must contain at least one entry".to_string(),
        ));
    }
    non_empty("content.language", &config.content.language)?;

    non_empty(
        "drive.service_account_json",
        &config.drive.service_account_json,
    )?;
    non_empty("drive.folder_link", &config.drive.folder_link)?;

    non_empty("storage.access_key", &config.storage.access_key)?;
    non_empty("storage.secret_key", &config.storage.secret_key)?;
    non_empty("storage.region", &config.storage.region)?;
    non_empty("storage.bucket", &config.storage.bucket)?;

    if config.run.video_duration_secs == 0 {
        return Err(ConfigError::Validation(
            "run.video_duration_secs cannot be 0".to_string(),
        ));
    }
    if config.run.track_min > config.run.track_max {
        return Err(ConfigError::Validation(format!(
            "run.track_min ({}) exceeds run.track_max ({})",
            config.run.track_min, config.run.track_max
        )));
    }
    if config.run.retry_max_attempts == 0 {
        return Err(ConfigError::Validation(
            "run.retry_max_attempts cannot be 0".to_string(),
        ));
    }
    non_empty("run.archive_object", &config.run.archive_object)?;

    if let Some(ref youtube) = config.youtube {
        non_empty("youtube.client_id", &youtube.client_id)?;
        non_empty("youtube.client_secret", &youtube.client_secret)?;
        non_empty("youtube.refresh_token", &youtube.refresh_token)?;
    }
    if let Some(ref facebook) = config.facebook {
        non_empty("facebook.api_version", &facebook.api_version)?;
        non_empty("facebook.page_id", &facebook.page_id)?;
        non_empty("facebook.page_token", &facebook.page_token)?;
    }
    if let Some(ref instagram) = config.instagram {
        non_empty("instagram.api_version", &instagram.api_version)?;
        non_empty("instagram.user_id", &instagram.user_id)?;
        non_empty("instagram.access_token", &instagram.access_token)?;
    }
    if let Some(ref threads) = config.threads {
        non_empty("threads.api_version", &threads.api_version)?;
        non_empty("threads.user_id", &threads.user_id)?;
        non_empty("threads.access_token", &threads.access_token)?;
    }

    Ok(())
}

fn non_empty(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ContentConfig, DriveConfig, FacebookConfig, GeneratorConfig, RunConfig, StorageConfig,
    };

    fn base_config() -> Config {
        Config {
            generator: GeneratorConfig {
                api_key: "key".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_base: "https://generativelanguage.googleapis.com".to_string(),
                timeout_secs: 60,
            },
            content: ContentConfig {
                adjectives: vec!["calm".to_string()],
                themes: vec!["hope".to_string()],
                language: "en".to_string(),
            },
            drive: DriveConfig {
                service_account_json: "{}".to_string(),
                folder_link: "https://drive.google.com/drive/folders/abc".to_string(),
                timeout_secs: 60,
            },
            storage: StorageConfig {
                access_key: "ak".to_string(),
                secret_key: "sk".to_string(),
                region: "eu-west-1".to_string(),
                bucket: "quotes".to_string(),
                endpoint: None,
                public_url: None,
            },
            youtube: None,
            facebook: None,
            instagram: None,
            threads: None,
            run: RunConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_empty_api_key_fails() {
        let mut config = base_config();
        config.generator.api_key = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("generator.api_key"));
    }

    #[test]
    fn test_empty_steering_list_fails() {
        let mut config = base_config();
        config.content.themes.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("content.themes"));
    }

    #[test]
    fn test_inverted_track_range_fails() {
        let mut config = base_config();
        config.run.track_min = 120;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_duration_fails() {
        let mut config = base_config();
        config.run.video_duration_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_incomplete_platform_section_fails() {
        let mut config = base_config();
        config.facebook = Some(FacebookConfig {
            api_version: "v19.0".to_string(),
            page_id: "1234".to_string(),
            page_token: "".to_string(),
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("facebook.page_token"));
    }
}
