//! URL rule based authorization.
//!
//! # Spring Security Equivalent
//! `http.authorizeRequests().antMatchers(..).hasRole(..)` backed by
//! `FilterSecurityInterceptor`
//!
//! Rules are evaluated in the order they were added and the first match
//! wins. The engine never reorders rules by specificity: put narrow patterns
//! (`/spitters/me`) before broad ones (`/**`), otherwise the broad rule
//! shadows them.

use std::fmt;
use std::str::FromStr;

use actix_web::http::Method;
use regex::Regex;
use tracing::debug;

use crate::http::error::{ConfigError, SecurityError};
use crate::http::security::ant_matcher::AntMatcher;
use crate::http::security::verifier::AuthenticationResult;

/// What a matching request needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// `permitAll()`
    Public,
    /// `authenticated()`
    Authenticated,
    /// `hasRole('X')`
    Role(String),
    /// `hasAnyRole('A','B')`
    AnyRole(Vec<String>),
    /// `denyAll()`
    DenyAll,
}

impl Requirement {
    pub fn role(name: &str) -> Self {
        Requirement::Role(name.to_string())
    }

    pub fn any_role(names: &[&str]) -> Self {
        Requirement::AnyRole(names.iter().map(|n| n.to_string()).collect())
    }

    fn evaluate(&self, auth: &AuthenticationResult) -> Decision {
        match self {
            Requirement::Public => Decision::Allow,
            Requirement::DenyAll => Decision::Deny,
            _ if !auth.is_authenticated() => Decision::RequireLogin,
            Requirement::Authenticated => Decision::Allow,
            Requirement::Role(role) if auth.has_role(role) => Decision::Allow,
            Requirement::AnyRole(roles) if roles.iter().any(|r| auth.has_role(r)) => {
                Decision::Allow
            }
            Requirement::Role(_) | Requirement::AnyRole(_) => Decision::Deny,
        }
    }
}

impl FromStr for Requirement {
    type Err = ConfigError;

    /// Parses the access expressions used in settings files:
    /// `permitAll`, `authenticated`, `denyAll`, `hasRole('X')` and
    /// `hasAnyRole('A','B')`. Trailing `()` on the bare forms is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRequirement {
            value: s.to_string(),
        };
        let expr = s.trim();

        match expr.trim_end_matches("()") {
            "permitAll" => return Ok(Requirement::Public),
            "authenticated" => return Ok(Requirement::Authenticated),
            "denyAll" => return Ok(Requirement::DenyAll),
            _ => {}
        }

        let (name, args) = expr
            .strip_suffix(')')
            .and_then(|e| e.split_once('('))
            .ok_or_else(invalid)?;

        let roles = args
            .split(',')
            .map(|arg| {
                let arg = arg.trim();
                arg.strip_prefix('\'')
                    .and_then(|a| a.strip_suffix('\''))
                    .or_else(|| arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')))
                    .filter(|role| !role.is_empty())
                    .map(str::to_string)
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        match (name.trim(), roles.as_slice()) {
            ("hasRole", [role]) => Ok(Requirement::Role(role.clone())),
            ("hasAnyRole", [_, ..]) => Ok(Requirement::AnyRole(roles)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Public => write!(f, "permitAll"),
            Requirement::Authenticated => write!(f, "authenticated"),
            Requirement::DenyAll => write!(f, "denyAll"),
            Requirement::Role(role) => write!(f, "hasRole('{}')", role),
            Requirement::AnyRole(roles) => {
                let quoted: Vec<String> = roles.iter().map(|r| format!("'{}'", r)).collect();
                write!(f, "hasAnyRole({})", quoted.join(","))
            }
        }
    }
}

/// Path matcher of a [`Rule`].
#[derive(Clone, Debug)]
pub enum RequestPattern {
    Ant(AntMatcher),
    /// Anchored: the whole path must match.
    Regex(Regex),
    Any,
}

impl RequestPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RequestPattern::Ant(matcher) => matcher.matches(path),
            RequestPattern::Regex(regex) => regex.is_match(path),
            RequestPattern::Any => true,
        }
    }
}

impl fmt::Display for RequestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestPattern::Ant(matcher) => write!(f, "{}", matcher.pattern()),
            RequestPattern::Regex(regex) => write!(f, "{}", regex.as_str()),
            RequestPattern::Any => write!(f, "anyRequest"),
        }
    }
}

/// One authorization rule: pattern, optional method filter and requirement.
///
/// # Example
/// ```
/// use actix_web::http::Method;
/// use spittr_security_core::http::security::{Requirement, Rule};
///
/// let rule = Rule::ant("/spittles", Requirement::role("SPITTER")).method(Method::POST);
/// assert!(rule.matches("/spittles", &Method::POST));
/// assert!(!rule.matches("/spittles", &Method::GET));
/// ```
#[derive(Clone, Debug)]
pub struct Rule {
    pattern: RequestPattern,
    method: Option<Method>,
    requirement: Requirement,
}

impl Rule {
    /// Ant-style pattern (`/admin/*`, `/spittles/**`).
    pub fn ant(pattern: &str, requirement: Requirement) -> Self {
        Rule {
            pattern: RequestPattern::Ant(AntMatcher::new(pattern)),
            method: None,
            requirement,
        }
    }

    /// Regular expression matched against the whole path.
    pub fn regex(pattern: &str, requirement: Requirement) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Rule {
            pattern: RequestPattern::Regex(regex),
            method: None,
            requirement,
        })
    }

    /// Matches every path.
    pub fn any_request(requirement: Requirement) -> Self {
        Rule {
            pattern: RequestPattern::Any,
            method: None,
            requirement,
        }
    }

    /// Restricts the rule to one HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn get_pattern(&self) -> &RequestPattern {
        &self.pattern
    }

    pub fn get_method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn get_requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn matches(&self, path: &str, method: &Method) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{} {} -> {}", method, self.pattern, self.requirement),
            None => write!(f, "{} -> {}", self.pattern, self.requirement),
        }
    }
}

/// Outcome of [`AuthorizationEngine::decide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    RequireLogin,
}

impl Decision {
    pub fn into_result(self) -> Result<(), SecurityError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(SecurityError::AccessDenied),
            Decision::RequireLogin => Err(SecurityError::LoginRequired),
        }
    }
}

/// Ordered list of [`Rule`]s.
///
/// Requests matching no rule are denied.
///
/// # Example
/// ```
/// use actix_web::http::Method;
/// use spittr_security_core::http::security::{
///     AuthenticationResult, AuthorizationEngine, Decision, Requirement, Rule,
/// };
///
/// let mut engine = AuthorizationEngine::new();
/// engine.add_rule(Rule::ant("/admin/*", Requirement::role("ADMIN")));
/// engine.add_rule(Rule::ant("/*", Requirement::Public));
///
/// let anonymous = AuthenticationResult::anonymous();
/// assert_eq!(engine.decide("/home", &Method::GET, &anonymous), Decision::Allow);
/// assert_eq!(engine.decide("/admin/panel", &Method::GET, &anonymous), Decision::RequireLogin);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AuthorizationEngine {
    rules: Vec<Rule>,
}

impl AuthorizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        AuthorizationEngine { rules }
    }

    /// Appends a rule after all existing ones.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule matching the request, in configured order.
    pub fn matching_rule(&self, path: &str, method: &Method) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(path, method))
    }

    pub fn decide(&self, path: &str, method: &Method, auth: &AuthenticationResult) -> Decision {
        match self.matching_rule(path, method) {
            Some(rule) => {
                let decision = rule.requirement.evaluate(auth);
                debug!(%path, %method, %rule, ?decision, "authorization decision");
                decision
            }
            None => {
                debug!(%path, %method, "no rule matched, denying");
                Decision::Deny
            }
        }
    }
}
