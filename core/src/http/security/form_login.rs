//! Form login and logout.
//!
//! # Spring Security Equivalent
//! `formLogin()` and `logout()` configurers, `UsernamePasswordAuthenticationFilter`
//! and `LogoutFilter`
//!
//! The login page itself is the application's business; this module only
//! processes the submitted form and the logout request.
//!
//! # Example
//! ```rust,ignore
//! let config = HttpSecurity::new()
//!     .verifier(verifier)
//!     .form_login(FormLoginConfig::new().logout_url("/signout").logout_success_url("/"))
//!     .build()?;
//!
//! App::new()
//!     .configure(form_login::configure(config.clone()))
//!     .wrap(SecurityTransform::new(config))
//! ```

use std::sync::Arc;

use actix_session::Session;
use actix_web::http::header::LOCATION;
use actix_web::{guard, web, HttpResponse};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::http::error::SecurityError;
use crate::http::security::config::SecurityConfig;
use crate::http::security::verifier::Principal;

/// Form login configuration.
///
/// # Spring Security Equivalent
/// `FormLoginConfigurer` + `LogoutConfigurer`
#[derive(Clone, Debug)]
pub struct FormLoginConfig {
    login_page: String,
    login_processing_url: String,
    default_success_url: String,
    always_use_default_success_url: bool,
    failure_url: String,
    logout_url: String,
    logout_success_url: String,
}

impl Default for FormLoginConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FormLoginConfig {
    pub fn new() -> Self {
        FormLoginConfig {
            login_page: "/login".to_string(),
            login_processing_url: "/login".to_string(),
            default_success_url: "/".to_string(),
            always_use_default_success_url: false,
            failure_url: "/login?error".to_string(),
            logout_url: "/logout".to_string(),
            logout_success_url: "/login?logout".to_string(),
        }
    }

    /// # Spring Equivalent
    /// `formLogin().loginPage("/login")`
    pub fn login_page(mut self, url: &str) -> Self {
        self.login_page = url.to_string();
        self
    }

    /// # Spring Equivalent
    /// `formLogin().loginProcessingUrl("/login")`
    pub fn login_processing_url(mut self, url: &str) -> Self {
        self.login_processing_url = url.to_string();
        self
    }

    pub fn default_success_url(mut self, url: &str) -> Self {
        self.default_success_url = url.to_string();
        self
    }

    /// Ignore the saved request and always land on the default success URL.
    pub fn always_use_default_success_url(mut self, always: bool) -> Self {
        self.always_use_default_success_url = always;
        self
    }

    pub fn failure_url(mut self, url: &str) -> Self {
        self.failure_url = url.to_string();
        self
    }

    /// # Spring Equivalent
    /// `logout().logoutUrl("/signout")`
    pub fn logout_url(mut self, url: &str) -> Self {
        self.logout_url = url.to_string();
        self
    }

    /// # Spring Equivalent
    /// `logout().logoutSuccessUrl("/")`
    pub fn logout_success_url(mut self, url: &str) -> Self {
        self.logout_success_url = url.to_string();
        self
    }

    pub fn get_login_page(&self) -> &str {
        &self.login_page
    }

    pub fn get_login_processing_url(&self) -> &str {
        &self.login_processing_url
    }

    pub fn get_default_success_url(&self) -> &str {
        &self.default_success_url
    }

    pub fn get_failure_url(&self) -> &str {
        &self.failure_url
    }

    pub fn get_logout_url(&self) -> &str {
        &self.logout_url
    }

    pub fn get_logout_success_url(&self) -> &str {
        &self.logout_success_url
    }

    /// Login page, login processing and logout URLs stay reachable whatever
    /// the authorization rules say.
    pub fn is_entry_url(&self, path: &str) -> bool {
        path == self.login_page || path == self.login_processing_url || path == self.logout_url
    }
}

/// Submitted login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "remember-me")]
    pub remember_me: Option<String>,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// Handles `POST <login processing url>`.
///
/// Success redirects to the saved request (or the default success URL);
/// bad credentials redirect to the failure URL. A store outage is answered
/// with 503 instead of a failed login.
pub async fn process_login(
    session: Session,
    form: web::Form<LoginForm>,
    config: web::Data<SecurityConfig>,
) -> Result<HttpResponse, actix_web::Error> {
    let Some(form_login) = config.form_login() else {
        return Ok(HttpResponse::NotFound().finish());
    };
    let form = form.into_inner();

    let user = match config
        .verifier()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(username = %form.username, "form login failed");
            return Ok(redirect(&form_login.failure_url));
        }
        Err(e) => {
            error!(reason = %e.reason(), "credential store unavailable during form login");
            return Err(SecurityError::from(e).into());
        }
    };

    // Read before login: the NewSession strategy drops session data.
    let saved_request = config.session().take_saved_request(&session);
    config
        .session()
        .login(&session, &Principal::from(&user))?;

    let target = saved_request
        .filter(|_| !form_login.always_use_default_success_url)
        .unwrap_or_else(|| form_login.default_success_url.clone());

    info!(username = %user.get_username(), "form login succeeded");

    let mut response = redirect(&target);
    if let Some(remember_me) = config.remember_me() {
        if remember_me.is_requested(form.remember_me.as_deref()) {
            if remember_me.supports(&user) {
                response
                    .add_cookie(&remember_me.login_success(&user))
                    .map_err(actix_web::error::ErrorInternalServerError)?;
            } else {
                debug!(username = %user.get_username(), "no remember-me token for user without password hash");
            }
        }
    }
    Ok(response)
}

/// Handles `POST <logout url>`: purges the session, clears the remember-me
/// cookie and redirects to the logout success URL.
pub async fn process_logout(
    session: Session,
    config: web::Data<SecurityConfig>,
) -> Result<HttpResponse, actix_web::Error> {
    let Some(form_login) = config.form_login() else {
        return Ok(HttpResponse::NotFound().finish());
    };

    if let Some(principal) = config.session().principal(&session) {
        info!(username = %principal.get_username(), "logout");
    }
    config.session().logout(&session);

    let mut response = redirect(&form_login.logout_success_url);
    if let Some(remember_me) = config.remember_me() {
        response
            .add_cookie(&remember_me.logout())
            .map_err(actix_web::error::ErrorInternalServerError)?;
    }
    Ok(response)
}

/// Registers the login and logout endpoints.
///
/// Both resources are guarded by `POST`, so a `GET` login page on the same
/// path can be registered by the application.
pub fn configure(config: Arc<SecurityConfig>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let data = web::Data::from(config.clone());
        cfg.app_data(data);

        if let Some(form_login) = config.form_login() {
            cfg.service(
                web::resource(form_login.get_login_processing_url())
                    .guard(guard::Post())
                    .to(process_login),
            );
            cfg.service(
                web::resource(form_login.get_logout_url())
                    .guard(guard::Post())
                    .to(process_logout),
            );
        }
    }
}
