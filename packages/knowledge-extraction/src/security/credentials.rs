//! API keys that never show up in logs.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Read a non-blank secret from the environment.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::new(v.trim()))
    }

    /// Only call this when building the outbound request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Credentials for a programmable search engine: an API key plus the
/// engine identifier the key is allowed to query.
#[derive(Clone)]
pub struct SearchCredentials {
    pub api_key: SecretString,
    pub engine_id: String,
}

impl SearchCredentials {
    pub fn new(api_key: impl Into<SecretString>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"[REDACTED]")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::new("AIza-super-secret");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "AIza-super-secret");
    }

    #[test]
    fn test_from_env_skips_blank() {
        std::env::set_var("KX_TEST_BLANK_SECRET", "   ");
        assert!(SecretString::from_env("KX_TEST_BLANK_SECRET").is_none());
        assert!(SecretString::from_env("KX_TEST_MISSING_SECRET").is_none());

        std::env::set_var("KX_TEST_SET_SECRET", " key-123 ");
        let secret = SecretString::from_env("KX_TEST_SET_SECRET").unwrap();
        assert_eq!(secret.expose(), "key-123");
    }

    #[test]
    fn test_search_credentials_debug() {
        let creds = SearchCredentials::new("AIza-secret", "engine-42");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("engine-42"));
    }
}
