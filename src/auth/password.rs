use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AppError, AppResult};

lazy_static! {
    /// Verified against when the login name is unknown so both failure paths cost one argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("laporan-dummy-password").ok();
}

/// Argon2id hash in PHC string form, salted from the OS RNG.
pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e))
        })
}

/// Whether `plain` matches the stored PHC hash. A stored value that does not parse never matches.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Burn one verification for a login name that matched no account.
pub fn verify_against_dummy(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}
