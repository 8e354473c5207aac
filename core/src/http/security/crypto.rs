//! Password hashing.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.crypto.password.PasswordEncoder`
//!
//! Every encoder stores its salt and cost parameters inside the encoded
//! string, so [`PasswordEncoder::matches`] needs nothing but the stored hash.
//!
//! # Feature Flags
//! - `argon2`: Enables `Argon2PasswordEncoder` and `DelegatingPasswordEncoder`
//! - `bcrypt`: Enables `BCryptPasswordEncoder`

#[cfg(feature = "argon2")]
use argon2::password_hash::rand_core::OsRng;
#[cfg(feature = "argon2")]
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
#[cfg(feature = "argon2")]
use argon2::Argon2;
#[cfg(feature = "argon2")]
use std::collections::HashMap;
#[cfg(feature = "argon2")]
use std::sync::Arc;

use crate::http::error::EncodingError;

/// Encodes raw passwords and checks raw passwords against stored hashes.
///
/// # Spring Security Equivalent
/// `PasswordEncoder` interface
pub trait PasswordEncoder: Send + Sync {
    /// Hashes `raw_password` with a fresh salt.
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError>;

    /// Checks `raw_password` against `encoded_password` in constant time.
    ///
    /// Malformed hashes never match.
    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool;

    /// Returns true if the stored hash should be re-encoded with current settings.
    fn upgrade_encoding(&self, _encoded_password: &str) -> bool {
        false
    }
}

/// Compares two byte strings without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Argon2id encoder producing PHC strings (`$argon2id$v=19$...`).
///
/// # Example
/// ```
/// use spittr_security_core::http::security::crypto::{Argon2PasswordEncoder, PasswordEncoder};
///
/// let encoder = Argon2PasswordEncoder::new();
/// let hash = encoder.encode("secret_password").unwrap();
///
/// assert!(encoder.matches("secret_password", &hash));
/// assert!(!encoder.matches("wrong_password", &hash));
/// ```
#[cfg(feature = "argon2")]
#[derive(Clone)]
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
}

#[cfg(feature = "argon2")]
impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        Argon2PasswordEncoder {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(feature = "argon2")]
impl Default for Argon2PasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "argon2")]
impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(raw_password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| EncodingError::new(e.to_string()))
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        match PasswordHash::new(encoded_password) {
            Ok(parsed_hash) => self
                .argon2
                .verify_password(raw_password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// BCrypt encoder (`$2b$<cost>$...`), the hash format of most JDBC user tables.
///
/// # Spring Security Equivalent
/// `BCryptPasswordEncoder`
#[cfg(feature = "bcrypt")]
#[derive(Clone)]
pub struct BCryptPasswordEncoder {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BCryptPasswordEncoder {
    /// Creates an encoder with the default cost (12).
    pub fn new() -> Self {
        Self { cost: 12 }
    }

    /// Creates an encoder with a custom cost, clamped to 4..=31.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

#[cfg(feature = "bcrypt")]
impl Default for BCryptPasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordEncoder for BCryptPasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError> {
        bcrypt::hash(raw_password, self.cost).map_err(|e| EncodingError::new(e.to_string()))
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        bcrypt::verify(raw_password, encoded_password).unwrap_or(false)
    }

    fn upgrade_encoding(&self, encoded_password: &str) -> bool {
        // $2a$XX$ / $2b$XX$ / $2y$XX$
        match encoded_password.get(4..6).map(str::parse::<u32>) {
            Some(Ok(hash_cost)) if encoded_password.starts_with("$2") => hash_cost < self.cost,
            _ => true,
        }
    }
}

/// Stores passwords as plain text. Tests and demos only.
///
/// # Example
/// ```
/// use spittr_security_core::http::security::crypto::{NoOpPasswordEncoder, PasswordEncoder};
///
/// let encoder = NoOpPasswordEncoder;
/// assert!(encoder.matches("password", "password"));
/// ```
#[derive(Clone, Copy, Default)]
pub struct NoOpPasswordEncoder;

impl PasswordEncoder for NoOpPasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError> {
        Ok(raw_password.to_string())
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        constant_time_eq(raw_password.as_bytes(), encoded_password.as_bytes())
    }
}

/// Splits `{id}hash` into `("id", "hash")`.
#[cfg(feature = "argon2")]
fn split_id(encoded: &str) -> Option<(&str, &str)> {
    encoded.strip_prefix('{')?.split_once('}')
}

/// Encoder that picks the algorithm from an `{id}` prefix on the stored hash.
///
/// # Spring Security Equivalent
/// `PasswordEncoderFactories.createDelegatingPasswordEncoder()`
///
/// Registered out of the box: `argon2` (used for new hashes), `bcrypt` (with
/// the `bcrypt` feature) and `noop`. Unprefixed `$2...` hashes are read as
/// BCrypt so existing JDBC tables keep working.
///
/// # Example
/// ```
/// use spittr_security_core::http::security::crypto::{DelegatingPasswordEncoder, PasswordEncoder};
///
/// let encoder = DelegatingPasswordEncoder::new();
/// let hash = encoder.encode("password").unwrap();
/// assert!(hash.starts_with("{argon2}"));
/// assert!(encoder.matches("password", &hash));
/// assert!(encoder.matches("plain", "{noop}plain"));
/// ```
#[cfg(feature = "argon2")]
#[derive(Clone)]
pub struct DelegatingPasswordEncoder {
    encoding_id: String,
    encoders: HashMap<String, Arc<dyn PasswordEncoder>>,
}

#[cfg(feature = "argon2")]
impl DelegatingPasswordEncoder {
    pub fn new() -> Self {
        let mut encoders: HashMap<String, Arc<dyn PasswordEncoder>> = HashMap::new();
        encoders.insert("argon2".to_string(), Arc::new(Argon2PasswordEncoder::new()));
        #[cfg(feature = "bcrypt")]
        encoders.insert("bcrypt".to_string(), Arc::new(BCryptPasswordEncoder::new()));
        encoders.insert("noop".to_string(), Arc::new(NoOpPasswordEncoder));

        DelegatingPasswordEncoder {
            encoding_id: "argon2".to_string(),
            encoders,
        }
    }

    /// Registers (or replaces) the encoder for `{id}` hashes.
    pub fn with_encoder<E: PasswordEncoder + 'static>(mut self, id: &str, encoder: E) -> Self {
        self.encoders.insert(id.to_string(), Arc::new(encoder));
        self
    }

    /// Selects the encoder used for new hashes.
    pub fn encoding_id(mut self, id: &str) -> Self {
        self.encoding_id = id.to_string();
        self
    }

    fn delegate_for<'a>(&self, encoded_password: &'a str) -> Option<(&dyn PasswordEncoder, &'a str)> {
        match split_id(encoded_password) {
            Some((id, hash)) => Some((self.encoders.get(id)?.as_ref(), hash)),
            None if encoded_password.starts_with("$2") => {
                Some((self.encoders.get("bcrypt")?.as_ref(), encoded_password))
            }
            None => None,
        }
    }
}

#[cfg(feature = "argon2")]
impl Default for DelegatingPasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "argon2")]
impl PasswordEncoder for DelegatingPasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError> {
        let encoder = self.encoders.get(&self.encoding_id).ok_or_else(|| {
            EncodingError::new(format!("no encoder registered for id `{}`", self.encoding_id))
        })?;
        Ok(format!("{{{}}}{}", self.encoding_id, encoder.encode(raw_password)?))
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        self.delegate_for(encoded_password)
            .is_some_and(|(encoder, hash)| encoder.matches(raw_password, hash))
    }

    fn upgrade_encoding(&self, encoded_password: &str) -> bool {
        match split_id(encoded_password) {
            Some((id, hash)) if id == self.encoding_id => self
                .encoders
                .get(id)
                .map_or(true, |encoder| encoder.upgrade_encoding(hash)),
            _ => true,
        }
    }
}
