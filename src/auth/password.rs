use argon2::{
  Argon2,
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;

use crate::prelude::*;

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|err| Error::Internal(format!("password hashing failed: {err}")))
}

/// A malformed stored hash never verifies.
pub fn verify(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    warn!("stored password hash is not a valid PHC string");
    return false;
  };
  Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}
