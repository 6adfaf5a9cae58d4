//! Configuration resolved from the process environment.
//!
//! The library never reads `.env` files itself; the binary loads them into
//! the environment first and the runner only asks whether a key is present.

use crate::error::{ImageGenError, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// API key for the image service. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a key, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ImageGenError::Configuration(format!("{API_KEY_ENV} is empty")));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Reads the key from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the key through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = lookup(API_KEY_ENV).ok_or_else(|| {
            ImageGenError::Configuration(format!(
                "{API_KEY_ENV} not found in .env file or environment variables"
            ))
        })?;
        Self::new(value)
    }

    /// Returns the raw key for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything the runner needs from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key.
    pub api_key: Secret,
    /// Base URL override for the API, if any.
    pub base_url: Option<String>,
}

impl Settings {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = Secret::from_lookup(&lookup)?;
        let base_url = lookup(BASE_URL_ENV)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self { api_key, base_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key() {
        let err = Secret::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ImageGenError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_empty_key() {
        for value in ["", "   ", "\n"] {
            let err = Secret::from_lookup(lookup(&[(API_KEY_ENV, value)])).unwrap_err();
            assert!(matches!(err, ImageGenError::Configuration(_)));
        }
    }

    #[test]
    fn test_key_is_trimmed() {
        let secret = Secret::from_lookup(lookup(&[(API_KEY_ENV, " sk-test \n")])).unwrap();
        assert_eq!(secret.expose(), "sk-test");
    }

    #[test]
    fn test_debug_redacts() {
        let secret = Secret::new("sk-very-secret").unwrap();
        let shown = format!("{secret:?}");
        assert!(!shown.contains("very-secret"));
    }

    #[test]
    fn test_settings_base_url() {
        let settings = Settings::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (BASE_URL_ENV, "http://localhost:8080/v1/"),
        ]))
        .unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:8080/v1"));

        let settings =
            Settings::from_lookup(lookup(&[(API_KEY_ENV, "sk-test"), (BASE_URL_ENV, " ")]))
                .unwrap();
        assert!(settings.base_url.is_none());
    }
}
