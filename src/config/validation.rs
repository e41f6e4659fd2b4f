//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_range(config.options.min_episode, config.options.max_episode)?;
    validate_at_least_one("episodes_per_file", config.options.episodes_per_file)?;
    validate_at_least_one("episode_concurrency", config.options.episode_concurrency)?;
    validate_at_least_one("series_concurrency", config.options.series_concurrency)?;
    validate_header("user_agent", &config.http.user_agent)?;
    validate_header("referer", &config.http.referer)?;

    Ok(())
}

/// Validate the requested episode range.
pub fn validate_range(min_episode: u32, max_episode: u32) -> Result<()> {
    if min_episode > max_episode {
        return Err(Error::ConfigValidation {
            field: "min_episode".to_string(),
            message: format!(
                "min-ep ({}) must be less than or equal to max-ep ({})",
                min_episode, max_episode
            ),
        });
    }

    Ok(())
}

fn validate_at_least_one(field: &str, value: usize) -> Result<()> {
    if value < 1 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "must be greater than or equal to 1".to_string(),
        });
    }

    Ok(())
}

fn validate_header(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::MissingConfig(field.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_inverted_range() {
        assert!(validate_range(5, 5).is_ok());
        assert!(validate_range(6, 5).is_err());
    }

    #[test]
    fn test_zero_episodes_per_file() {
        let mut config = Config::default();
        config.options.episodes_per_file = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, Error::ConfigValidation { ref field, .. } if field == "episodes_per_file")
        );
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = Config::default();
        config.options.episode_concurrency = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_referer() {
        let mut config = Config::default();
        config.http.referer = "  ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(Error::MissingConfig(_))
        ));
    }
}
