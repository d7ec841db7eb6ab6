use crate::config::types::{Config, CrawlerConfig, RenderConfig, TimeoutConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_timeouts(&config.timeouts)?;
    validate_render_config(&config.render)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.recursion_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "recursion_threshold must be >= 1, got {}",
            config.recursion_threshold
        )));
    }

    if config
        .low_quality_patterns
        .iter()
        .any(|p| p.trim().is_empty())
    {
        return Err(ConfigError::InvalidPattern(
            "low_quality_patterns cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates timeouts; anything below 100ms would fail every request
fn validate_timeouts(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("render_ms", config.render_ms),
        ("probe_ms", config.probe_ms),
        ("download_ms", config.download_ms),
    ] {
        if value < 100 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 100ms, got {}ms",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates renderer options
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    for tag in &config.excluded_tags {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ConfigError::InvalidPattern(format!(
                "Excluded tag '{}' is not a valid tag name",
                tag
            )));
        }
    }

    for selector in config.excluded_selectors() {
        if selector.parse::<lol_html::Selector>().is_err() {
            return Err(ConfigError::InvalidPattern(format!(
                "Excluded selector '{}' cannot be parsed",
                selector
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.concurrency = 65;
        assert!(validate(&config).is_err());

        config.crawler.concurrency = 64;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_short_timeout_rejected() {
        let mut config = Config::default();
        config.timeouts.probe_ms = 50;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("probe_ms"));
    }

    #[test]
    fn test_empty_low_quality_pattern_rejected() {
        let mut config = Config::default();
        config.crawler.low_quality_patterns.push("  ".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = Config::default();
        config.render.excluded_selector = "#ads, [[[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let mut config = Config::default();
        config.render.excluded_tags.push("nav bar".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name_validation() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "Bad Name!".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_contact_url() {
        let mut config = Config::default();
        config.user_agent.contact_url = Some("not a url".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }
}
