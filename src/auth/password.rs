use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id with the crate defaults. Stored hashes carry their own
/// parameters in the PHC string, so verification keeps working if these change.
fn argon2() -> Argon2<'static> {
    Argon2::default()
}

fn credential_error(stage: &'static str, err: password_hash::Error) -> anyhow::Error {
    error!(error = %err, stage, "credential hashing failed");
    anyhow::anyhow!("{stage}: {err}")
}

/// Hash a new account or replacement password into a PHC string for `users.password_hash`.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| credential_error("hash password", e))
}

/// Check a login or current-password attempt against the stored hash.
///
/// A wrong password is `Ok(false)`. A stored hash that does not parse, or any
/// other argon2 failure, is an error so callers report it as internal rather
/// than as bad credentials.
pub fn verify_password(attempt: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| credential_error("parse stored hash", e))?;
    match argon2().verify_password(attempt.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(credential_error("verify password", e)),
    }
}
