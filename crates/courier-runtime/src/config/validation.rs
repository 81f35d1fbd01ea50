//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ApiConfig, CourierConfig, RequestConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_request_config(&config.request)?;
    validate_api_config(&config.api)?;
    Ok(())
}

/// Validates the transport settings.
fn validate_request_config(request: &RequestConfig) -> ConfigResult<()> {
    if request.pool_size == 0 {
        return Err(ConfigError::validation(
            "request.pool_size must be at least 1",
        ));
    }

    if let Some(proxy) = &request.proxy_url {
        if proxy.is_empty() {
            return Err(ConfigError::invalid_url(proxy, "proxy url is empty"));
        }
        if !proxy.contains("://") {
            return Err(ConfigError::invalid_url(proxy, "missing scheme"));
        }
    }

    // Timeouts and the proxy scheme are checked by the conversion itself.
    request.to_transport_config()?;
    Ok(())
}

/// Validates the remote API settings. A missing token is allowed here.
fn validate_api_config(api: &ApiConfig) -> ConfigResult<()> {
    if !api.base_url.starts_with("http://") && !api.base_url.starts_with("https://") {
        return Err(ConfigError::invalid_url(
            &api.base_url,
            "URL must start with http:// or https://",
        ));
    }

    if let Some(token) = &api.token
        && token.chars().any(char::is_whitespace)
    {
        return Err(ConfigError::validation("api.token must not contain whitespace"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_proxy() {
        let mut config = CourierConfig::default();
        config.request.proxy_url = Some("localhost:3128".into());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));

        config.request.proxy_url = Some("ftp://localhost".into());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Transport(_))
        ));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = CourierConfig::default();
        config.api.base_url = "api.telegram.org/bot".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_rejects_whitespace_token() {
        let mut config = CourierConfig::default();
        config.api.token = Some("123 abc".into());
        assert!(validate_config(&config).is_err());
    }
}
