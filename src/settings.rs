//! Client settings from the environment.

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq)]
pub struct ClientSettings {
    pub api_url: String,
    pub timeout: Duration,
    /// Bearer token sent with every request, if the user is signed in.
    pub token: Option<String>,
    pub stale_time: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
            stale_time: DEFAULT_STALE_TIME,
        }
    }
}

impl ClientSettings {
    /// Read `LIFEPULSE_API_URL`, `LIFEPULSE_API_TIMEOUT_SECS`, `LIFEPULSE_API_TOKEN` and
    /// `LIFEPULSE_CACHE_STALE_SECS`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(url) = lookup("LIFEPULSE_API_URL").filter(|s| !s.trim().is_empty()) {
            settings.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("LIFEPULSE_API_TIMEOUT_SECS") {
            settings.timeout = parse_secs("LIFEPULSE_API_TIMEOUT_SECS", &v)?;
        }
        settings.token = lookup("LIFEPULSE_API_TOKEN").filter(|s| !s.is_empty());
        if let Some(v) = lookup("LIFEPULSE_CACHE_STALE_SECS") {
            settings.stale_time = parse_secs("LIFEPULSE_CACHE_STALE_SECS", &v)?;
        }
        Ok(settings)
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<ClientSettings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientSettings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(from(&[]).unwrap(), ClientSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let s = from(&[
            ("LIFEPULSE_API_URL", "https://api.example.test/"),
            ("LIFEPULSE_API_TIMEOUT_SECS", "3"),
            ("LIFEPULSE_API_TOKEN", "abc"),
            ("LIFEPULSE_CACHE_STALE_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(s.api_url, "https://api.example.test");
        assert_eq!(s.timeout, Duration::from_secs(3));
        assert_eq!(s.token.as_deref(), Some("abc"));
        assert_eq!(s.stale_time, Duration::ZERO);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = from(&[("LIFEPULSE_API_TIMEOUT_SECS", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "LIFEPULSE_API_TIMEOUT_SECS", .. }));
    }
}
