use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id and a fresh random salt. Returns the PHC
/// string, which embeds salt and parameters.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. Any failure (unparsable
/// hash included) is reported as a mismatch.
pub fn verify_password(password: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Burn the same amount of work as a real verification. Called on login
/// when the username does not exist, so the response time does not reveal
/// whether the account is registered.
pub fn dummy_verify(password: &str) {
    let _ = hash_password(password);
}
