//! Checkout engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VENDORA_API_BASE_URL` - Base URL of the commerce API
//! - `VENDORA_API_TOKEN` - Bearer token for the commerce API
//!
//! ## Optional
//! - `VENDORA_SHIPPING_METHOD` - Shipping tier identifier (default: standard)
//! - `VENDORA_ADDRESS_CACHE_TTL_SECS` - Saved-address cache TTL (default: 60)

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_TOKEN_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Commerce API configuration for the checkout engine.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Base URL of the commerce API (no trailing slash)
    pub base_url: String,
    /// Bearer token for the commerce API
    pub api_token: SecretString,
    /// Shipping tier identifier sent with shipping-quote and order requests
    pub shipping_method: String,
    /// TTL for the saved-address list cache, in seconds
    pub address_cache_ttl_secs: u64,
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("shipping_method", &self.shipping_method)
            .field("address_cache_ttl_secs", &self.address_cache_ttl_secs)
            .finish()
    }
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or the API
    /// token fails placeholder/length validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_required_env("VENDORA_API_BASE_URL")?)?;
        let api_token = get_validated_secret("VENDORA_API_TOKEN")?;
        let shipping_method = get_env_or_default("VENDORA_SHIPPING_METHOD", "standard");
        let address_cache_ttl_secs = get_env_or_default("VENDORA_ADDRESS_CACHE_TTL_SECS", "60")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "VENDORA_ADDRESS_CACHE_TTL_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            base_url,
            api_token,
            shipping_method,
            address_cache_ttl_secs,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalize the API base URL (absolute, no trailing slash).
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("VENDORA_API_BASE_URL".to_string(), e.to_string())
    })?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a secret is not a placeholder and is long enough to be a
/// real token.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if secret.len() < MIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_TOKEN_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        let url = parse_base_url("https://api.vendora.test/v1/").unwrap();
        assert_eq!(url, "https://api.vendora.test/v1");
    }

    #[test]
    fn test_parse_base_url_rejects_relative() {
        let result = parse_base_url("api.vendora.test");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidEnvVar(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-token-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_too_short() {
        let result = validate_secret_strength("abc123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("vk_live_9f2c41d88ab07e31", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = CommerceConfig {
            base_url: "https://api.vendora.test".to_string(),
            api_token: SecretString::from("vk_live_9f2c41d88ab07e31"),
            shipping_method: "standard".to_string(),
            address_cache_ttl_secs: 60,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://api.vendora.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("vk_live_9f2c41d88ab07e31"));
    }
}
