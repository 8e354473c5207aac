//! Application settings, read from a TOML file.

use std::path::Path;

use serde::Deserialize;

use spittr_security_core::http::error::ConfigError;
use spittr_security_core::http::security::SecuritySettings;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Seed `habuma` and `guest` when the user table is empty.
    #[serde(default)]
    pub seed_demo_users: bool,
    /// Mark the session cookie `Secure`. Off for plain-HTTP local runs.
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default)]
    pub security: SecuritySettings,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://spittr.db?mode=rwc".to_string()
}

impl AppSettings {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::InvalidSettings {
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidSettings {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::from_toml("").unwrap();
        assert_eq!(settings.bind_address, "127.0.0.1:8080");
        assert!(!settings.seed_demo_users);
        assert!(settings.security.rules.is_empty());
    }

    #[test]
    fn test_reference_file() {
        let settings = AppSettings::from_toml(include_str!("../spittr.toml")).unwrap();
        assert!(settings.seed_demo_users);

        let security = &settings.security;
        assert_eq!(security.http_basic_config().unwrap().get_realm(), "Spittr");
        assert_eq!(security.form_login_config().unwrap().get_logout_url(), "/signout");
        assert_eq!(security.rules().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_key() {
        assert!(AppSettings::from_toml("bind = \"0.0.0.0:80\"").is_err());
    }
}
