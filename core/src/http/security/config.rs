//! Security configuration.
//!
//! # Spring Equivalent
//! `WebSecurityConfigurerAdapter.configure(HttpSecurity)` and
//! `configure(AuthenticationManagerBuilder)`
//!
//! Instead of overriding hook methods on a base class, everything is
//! collected by the [`HttpSecurity`] builder and frozen into an
//! `Arc<SecurityConfig>` that is handed to the middleware and the
//! login/logout handlers.

use std::sync::Arc;

use tracing::info;

use crate::http::error::ConfigError;
use crate::http::security::authorizer::{AuthorizationEngine, Rule};
use crate::http::security::csrf::CsrfConfig;
use crate::http::security::form_login::FormLoginConfig;
use crate::http::security::http_basic::HttpBasicConfig;
use crate::http::security::remember_me::{RememberMeConfig, RememberMeServices};
use crate::http::security::session::SessionConfig;
use crate::http::security::settings::SecuritySettings;
use crate::http::security::verifier::CredentialVerifier;

/// Builder for [`SecurityConfig`].
///
/// # Example
/// ```
/// use actix_web::http::Method;
/// use spittr_security_core::http::security::{
///     FormLoginConfig, HttpBasicConfig, HttpSecurity, InMemoryVerifier, NoOpPasswordEncoder,
///     RememberMeConfig, Requirement, Rule,
/// };
///
/// let config = HttpSecurity::new()
///     .verifier(InMemoryVerifier::new(NoOpPasswordEncoder))
///     .form_login(FormLoginConfig::new().logout_url("/signout").logout_success_url("/"))
///     .remember_me(RememberMeConfig::new("token").token_validity_seconds(2_419_200))
///     .http_basic(HttpBasicConfig::new().realm("Spittr"))
///     .authorize(Rule::ant("/spitters/me", Requirement::role("SPITTER")))
///     .authorize(Rule::ant("/spittles", Requirement::role("SPITTER")).method(Method::POST))
///     .authorize(Rule::any_request(Requirement::Public))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.engine().rules().len(), 3);
/// ```
#[derive(Default)]
pub struct HttpSecurity {
    verifier: Option<Arc<dyn CredentialVerifier>>,
    engine: AuthorizationEngine,
    form_login: Option<FormLoginConfig>,
    http_basic: Option<HttpBasicConfig>,
    remember_me: Option<RememberMeConfig>,
    csrf: Option<CsrfConfig>,
    session: SessionConfig,
}

impl HttpSecurity {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Spring Equivalent
    /// `auth.jdbcAuthentication()` / `auth.inMemoryAuthentication()`
    pub fn verifier<V: CredentialVerifier + 'static>(mut self, verifier: V) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    pub fn shared_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Appends a rule. Rules are checked in the order they are added.
    pub fn authorize(mut self, rule: Rule) -> Self {
        self.engine.add_rule(rule);
        self
    }

    pub fn form_login(mut self, config: FormLoginConfig) -> Self {
        self.form_login = Some(config);
        self
    }

    pub fn http_basic(mut self, config: HttpBasicConfig) -> Self {
        self.http_basic = Some(config);
        self
    }

    pub fn remember_me(mut self, config: RememberMeConfig) -> Self {
        self.remember_me = Some(config);
        self
    }

    pub fn csrf(mut self, config: CsrfConfig) -> Self {
        self.csrf = Some(config);
        self
    }

    pub fn session(mut self, config: SessionConfig) -> Self {
        self.session = config;
        self
    }

    /// Applies declarative settings on top of what is already configured.
    /// Rules from the settings are appended after existing rules.
    pub fn settings(mut self, settings: &SecuritySettings) -> Result<Self, ConfigError> {
        if let Some(form_login) = settings.form_login_config() {
            self.form_login = Some(form_login);
        }
        if let Some(http_basic) = settings.http_basic_config() {
            self.http_basic = Some(http_basic);
        }
        if let Some(remember_me) = settings.remember_me_config() {
            self.remember_me = Some(remember_me);
        }
        if let Some(csrf) = settings.csrf_config() {
            self.csrf = Some(csrf);
        }
        for rule in settings.rules()? {
            self.engine.add_rule(rule);
        }
        Ok(self)
    }

    /// Freezes the configuration.
    ///
    /// Fails when no verifier was set, or when remember-me is enabled
    /// without form login.
    pub fn build(self) -> Result<Arc<SecurityConfig>, ConfigError> {
        let verifier = self.verifier.ok_or_else(|| ConfigError::InvalidSettings {
            reason: "no credential verifier configured".to_string(),
        })?;

        if self.remember_me.is_some() && self.form_login.is_none() {
            return Err(ConfigError::InvalidSettings {
                reason: "remember-me requires form login".to_string(),
            });
        }
        if self.engine.rules().is_empty() {
            info!("no authorization rules configured, every request will be denied");
        }

        Ok(Arc::new(SecurityConfig {
            verifier,
            engine: self.engine,
            form_login: self.form_login,
            http_basic: self.http_basic,
            remember_me: self.remember_me.map(RememberMeServices::new),
            csrf: self.csrf,
            session: self.session,
        }))
    }
}

/// Immutable security configuration shared by the middleware and handlers.
pub struct SecurityConfig {
    verifier: Arc<dyn CredentialVerifier>,
    engine: AuthorizationEngine,
    form_login: Option<FormLoginConfig>,
    http_basic: Option<HttpBasicConfig>,
    remember_me: Option<RememberMeServices>,
    csrf: Option<CsrfConfig>,
    session: SessionConfig,
}

impl SecurityConfig {
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }

    pub fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    pub fn form_login(&self) -> Option<&FormLoginConfig> {
        self.form_login.as_ref()
    }

    pub fn http_basic(&self) -> Option<&HttpBasicConfig> {
        self.http_basic.as_ref()
    }

    pub fn remember_me(&self) -> Option<&RememberMeServices> {
        self.remember_me.as_ref()
    }

    pub fn csrf(&self) -> Option<&CsrfConfig> {
        self.csrf.as_ref()
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Whether `path` is one of the form login endpoints that bypass the
    /// authorization rules.
    pub fn is_entry_url(&self, path: &str) -> bool {
        self.form_login
            .as_ref()
            .is_some_and(|form_login| form_login.is_entry_url(path))
    }
}
