//! Declarative security settings, usually loaded from TOML.
//!
//! ```toml
//! [form_login]
//! login_page = "/login"
//! logout_url = "/signout"
//! logout_success_url = "/"
//!
//! [http_basic]
//! realm = "Spittr"
//!
//! [remember_me]
//! key = "token"
//! token_validity_seconds = 2419200
//!
//! [[rules]]
//! pattern = "/spittles"
//! method = "POST"
//! access = "hasRole('SPITTER')"
//!
//! [[rules]]
//! access = "permitAll"
//! ```
//!
//! A rule without `pattern` matches any request.

use actix_web::http::Method;
use serde::Deserialize;

use crate::http::error::ConfigError;
use crate::http::security::authorizer::{Requirement, Rule};
use crate::http::security::csrf::CsrfConfig;
use crate::http::security::form_login::FormLoginConfig;
use crate::http::security::http_basic::HttpBasicConfig;
use crate::http::security::remember_me::RememberMeConfig;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecuritySettings {
    pub form_login: Option<FormLoginSettings>,
    pub http_basic: Option<HttpBasicSettings>,
    pub remember_me: Option<RememberMeSettings>,
    pub csrf: Option<CsrfSettings>,
    #[serde(default)]
    pub rules: Vec<RuleSettings>,
}

/// Unset fields keep the [`FormLoginConfig`] defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormLoginSettings {
    pub login_page: Option<String>,
    pub login_processing_url: Option<String>,
    pub default_success_url: Option<String>,
    pub failure_url: Option<String>,
    pub logout_url: Option<String>,
    pub logout_success_url: Option<String>,
    #[serde(default)]
    pub always_use_default_success_url: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpBasicSettings {
    pub realm: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RememberMeSettings {
    pub key: String,
    pub token_validity_seconds: Option<u64>,
    pub cookie_name: Option<String>,
    pub secure: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsrfSettings {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn enabled() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    #[default]
    Ant,
    Regex,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    pub pattern: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub matcher: MatcherKind,
    pub access: String,
}

impl RuleSettings {
    pub fn to_rule(&self) -> Result<Rule, ConfigError> {
        let requirement: Requirement = self.access.parse()?;

        let rule = match (&self.pattern, self.matcher) {
            (None, _) => Rule::any_request(requirement),
            (Some(pattern), MatcherKind::Ant) => Rule::ant(pattern, requirement),
            (Some(pattern), MatcherKind::Regex) => Rule::regex(pattern, requirement)?,
        };

        match &self.method {
            Some(method) => {
                let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|_| ConfigError::InvalidMethod {
                        value: method.clone(),
                    })?;
                Ok(rule.method(method))
            }
            None => Ok(rule),
        }
    }
}

impl SecuritySettings {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::InvalidSettings {
            reason: e.to_string(),
        })
    }

    /// Rules in file order.
    pub fn rules(&self) -> Result<Vec<Rule>, ConfigError> {
        self.rules.iter().map(RuleSettings::to_rule).collect()
    }

    pub fn form_login_config(&self) -> Option<FormLoginConfig> {
        let s = self.form_login.as_ref()?;
        let mut config =
            FormLoginConfig::new().always_use_default_success_url(s.always_use_default_success_url);
        if let Some(url) = &s.login_page {
            config = config.login_page(url);
        }
        if let Some(url) = &s.login_processing_url {
            config = config.login_processing_url(url);
        }
        if let Some(url) = &s.default_success_url {
            config = config.default_success_url(url);
        }
        if let Some(url) = &s.failure_url {
            config = config.failure_url(url);
        }
        if let Some(url) = &s.logout_url {
            config = config.logout_url(url);
        }
        if let Some(url) = &s.logout_success_url {
            config = config.logout_success_url(url);
        }
        Some(config)
    }

    pub fn http_basic_config(&self) -> Option<HttpBasicConfig> {
        let s = self.http_basic.as_ref()?;
        Some(match &s.realm {
            Some(realm) => HttpBasicConfig::new().realm(realm),
            None => HttpBasicConfig::new(),
        })
    }

    pub fn remember_me_config(&self) -> Option<RememberMeConfig> {
        let s = self.remember_me.as_ref()?;
        let mut config = RememberMeConfig::new(&s.key);
        if let Some(seconds) = s.token_validity_seconds {
            config = config.token_validity_seconds(seconds);
        }
        if let Some(name) = &s.cookie_name {
            config = config.cookie_name(name);
        }
        if let Some(secure) = s.secure {
            config = config.cookie_secure(secure);
        }
        Some(config)
    }

    pub fn csrf_config(&self) -> Option<CsrfConfig> {
        let s = self.csrf.as_ref().filter(|s| s.enabled)?;
        Some(
            s.ignore
                .iter()
                .fold(CsrfConfig::new(), |config, pattern| config.ignore(pattern)),
        )
    }
}
