//! Operator login gate for restricted mode.
//!
//! The expected user name and an Argon2id PHC hash come from configuration; the
//! plaintext password is never stored.

use crate::error::{FolhaError, FolhaResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Credentials the operator must present.
#[derive(Debug)]
pub struct OperatorAuth {
    user: String,
    password_hash: SecretString,
}

impl OperatorAuth {
    /// Build from configured values. The hash must be a valid PHC string.
    pub fn new(user: impl Into<String>, password_hash: impl Into<String>) -> FolhaResult<Self> {
        let user = user.into().trim().to_string();
        if user.is_empty() {
            return Err(FolhaError::configuration("Operator user name cannot be empty"));
        }
        let password_hash = password_hash.into().trim().to_string();
        PasswordHash::new(&password_hash).map_err(|e| {
            FolhaError::configuration(format!("FOLHA_AUTH_PASSWORD_HASH is not a valid PHC hash: {e}"))
        })?;
        Ok(Self {
            user,
            password_hash: SecretString::new(password_hash),
        })
    }

    /// Check the operator's credentials.
    pub fn verify(&self, user: &str, password: &SecretString) -> FolhaResult<()> {
        let user = user.trim();
        // Both checks always run so timing does not reveal which one failed.
        let user_ok = constant_time_eq(user.as_bytes(), self.user.as_bytes());
        let password_ok = verify_password(password.expose_secret(), self.password_hash.expose_secret())?;

        if user_ok && password_ok {
            info!(user = %mask_user(user), "Operator authenticated");
            Ok(())
        } else {
            warn!(user = %mask_user(user), "Authentication failed: invalid credentials");
            Err(FolhaError::authentication("Invalid user name or password"))
        }
    }
}

/// Hash a plaintext password with Argon2id and a random salt (PHC format).
pub fn hash_password(password: &str) -> FolhaResult<String> {
    if password.is_empty() {
        return Err(FolhaError::invalid_input("Password cannot be empty"));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| FolhaError::internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> FolhaResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| FolhaError::configuration(format!("Invalid password hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(FolhaError::internal(format!("Password verification failed: {e}"))),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

fn mask_user(user: &str) -> String {
    match user.char_indices().nth(3) {
        Some((idx, _)) => format!("{}***", &user[..idx]),
        None => "***".to_string(),
    }
}
