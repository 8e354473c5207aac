//! Security middleware for Actix Web.
//!
//! # Spring Equivalent
//! `SecurityFilterChain` / `FilterChainProxy`
//!
//! Per request:
//! 1. CSRF check for state-changing methods (403 on failure).
//! 2. Resolve the principal: session, then HTTP Basic, then remember-me.
//!    Wrong Basic credentials get a 401 challenge; a store outage gets 503.
//! 3. Put the [`Principal`] into request extensions.
//! 4. Ask the [`AuthorizationEngine`](crate::http::security::AuthorizationEngine)
//!    and either call the handler, answer 403, or start the login entry point.

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{ACCEPT, LOCATION, WWW_AUTHENTICATE};
use actix_web::http::Method;
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use tracing::{debug, error, warn};

use crate::http::error::{SecurityError, StoreUnavailable};
use crate::http::security::authorizer::Decision;
use crate::http::security::config::SecurityConfig;
use crate::http::security::http_basic::parse_basic_credentials;
use crate::http::security::verifier::{AuthenticationResult, Principal};

/// Security middleware factory.
///
/// Must be wrapped *inside* `actix_session::SessionMiddleware`, i.e.
/// registered before it with `.wrap()`.
///
/// # Example
/// ```ignore
/// let config = HttpSecurity::new().verifier(verifier).authorize(rule).build()?;
///
/// App::new()
///     .configure(form_login::configure(config.clone()))
///     .wrap(SecurityTransform::new(config))
///     .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
/// ```
pub struct SecurityTransform {
    config: Arc<SecurityConfig>,
}

impl SecurityTransform {
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        SecurityTransform { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityTransform
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SecurityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityService {
            config: Arc::clone(&self.config),
            service: Rc::new(service),
        })
    }
}

/// Security middleware service.
///
/// # Spring Equivalent
/// `FilterChainProxy`
pub struct SecurityService<S> {
    config: Arc<SecurityConfig>,
    service: Rc<S>,
}

/// Why a request's credentials could not be turned into a principal.
enum Rejection {
    BadBasicCredentials,
    Unavailable(StoreUnavailable),
}

struct Resolved {
    principal: Option<Principal>,
    clear_remember_me: bool,
}

async fn resolve_principal(
    req: &ServiceRequest,
    config: &SecurityConfig,
) -> Result<Resolved, Rejection> {
    let session = req.get_session();

    if let Some(principal) = config.session().principal(&session) {
        return Ok(Resolved {
            principal: Some(principal),
            clear_remember_me: false,
        });
    }

    if config.http_basic().is_some() {
        if let Some(creds) = parse_basic_credentials(req.headers()) {
            return match config
                .verifier()
                .authenticate(&creds.username, &creds.password)
                .await
            {
                Ok(Some(user)) => Ok(Resolved {
                    principal: Some(Principal::from(&user)),
                    clear_remember_me: false,
                }),
                Ok(None) => {
                    warn!(username = %creds.username, "HTTP Basic authentication failed");
                    Err(Rejection::BadBasicCredentials)
                }
                Err(e) => Err(Rejection::Unavailable(e)),
            };
        }
    }

    if let Some(remember_me) = config.remember_me() {
        if let Some(cookie) = req.cookie(remember_me.cookie_name()) {
            return match remember_me.auto_login(cookie.value(), config.verifier()).await {
                Ok(Some(principal)) => {
                    debug!(username = %principal.get_username(), "remember-me login");
                    if let Err(e) = config.session().login(&session, &principal) {
                        warn!(error = %e, "could not store remember-me login in session");
                    }
                    Ok(Resolved {
                        principal: Some(principal),
                        clear_remember_me: false,
                    })
                }
                Ok(None) => Ok(Resolved {
                    principal: None,
                    clear_remember_me: true,
                }),
                Err(e) => Err(Rejection::Unavailable(e)),
            };
        }
    }

    Ok(Resolved {
        principal: None,
        clear_remember_me: false,
    })
}

/// The percent-decoded path the router matches handlers against.
///
/// Rules and ignored paths are matched on this, never on the raw
/// `req.path()`: `/spittle%73` routes to the `/spittles` handler.
pub(crate) fn routed_path(req: &ServiceRequest) -> &str {
    req.match_info().as_str()
}

fn accepts_html(req: &ServiceRequest) -> bool {
    req.headers()
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn basic_challenge(realm_header: String) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, realm_header))
        .body(SecurityError::LoginRequired.to_string())
}

/// Response for `Decision::RequireLogin`.
///
/// HTTP Basic is used when it is enabled and the client either cannot use
/// form login or did not ask for HTML; otherwise the request URL is saved
/// and the client is sent to the login page.
fn login_entry_point(req: &ServiceRequest, config: &SecurityConfig) -> HttpResponse {
    let html = accepts_html(req);

    if let Some(basic) = config.http_basic() {
        if config.form_login().is_none() || !html {
            return basic_challenge(basic.www_authenticate_header());
        }
    }

    match config.form_login() {
        Some(form_login) => {
            if req.method() == Method::GET {
                let url = match req.query_string() {
                    "" => routed_path(req).to_string(),
                    query => format!("{}?{}", routed_path(req), query),
                };
                if let Err(e) = config.session().save_request(&req.get_session(), &url) {
                    warn!(error = %e, "could not save request");
                }
            }
            HttpResponse::Found()
                .insert_header((LOCATION, form_login.get_login_page()))
                .finish()
        }
        None => HttpResponse::from_error(SecurityError::LoginRequired),
    }
}

impl<S, B> Service<ServiceRequest> for SecurityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            // Step 1: CSRF
            if let Some(csrf) = config.csrf() {
                if !csrf.check(&req) {
                    warn!(path = %req.path(), method = %req.method(), "CSRF token missing or invalid");
                    return Ok(req
                        .error_response(SecurityError::InvalidCsrfToken)
                        .map_into_right_body());
                }
            }

            // Step 2: Authenticate
            let resolved = match resolve_principal(&req, &config).await {
                Ok(resolved) => resolved,
                Err(Rejection::BadBasicCredentials) => {
                    // http_basic is set whenever Basic credentials were checked
                    let header = config
                        .http_basic()
                        .map(|basic| basic.www_authenticate_header())
                        .unwrap_or_default();
                    return Ok(req.into_response(basic_challenge(header)).map_into_right_body());
                }
                Err(Rejection::Unavailable(e)) => {
                    error!(reason = %e.reason(), "credential store unavailable");
                    return Ok(req
                        .error_response(SecurityError::from(e))
                        .map_into_right_body());
                }
            };

            // Step 3: Expose the principal to handlers
            if let Some(principal) = &resolved.principal {
                req.extensions_mut().insert(principal.clone());
            }
            let auth = resolved
                .principal
                .map(AuthenticationResult::authenticated)
                .unwrap_or_default();

            // Step 4: Authorize
            let path = routed_path(&req);
            let decision = if config.is_entry_url(path) {
                Decision::Allow
            } else {
                config.engine().decide(path, req.method(), &auth)
            };

            let mut res = match decision {
                Decision::Allow => service.call(req).await?.map_into_left_body(),
                Decision::Deny => {
                    warn!(
                        path = %routed_path(&req),
                        username = auth.principal().map(Principal::get_username).unwrap_or("anonymous"),
                        "access denied"
                    );
                    req.error_response(SecurityError::AccessDenied)
                        .map_into_right_body()
                }
                Decision::RequireLogin => {
                    let response = login_entry_point(&req, &config);
                    req.into_response(response).map_into_right_body()
                }
            };

            if resolved.clear_remember_me {
                if let Some(remember_me) = config.remember_me() {
                    if let Err(e) = res.response_mut().add_cookie(&remember_me.logout()) {
                        warn!(error = %e, "could not clear remember-me cookie");
                    }
                }
            }

            Ok(res)
        })
    }
}
