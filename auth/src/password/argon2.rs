use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Prefixes of modular-crypt bcrypt hashes (`$2a$`, `$2b$`, `$2y$`).
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Salted one-way password hasher.
///
/// Argon2id with the crate's recommended work factor. Every call to `hash`
/// draws a fresh salt, so hashing the same password twice yields different
/// strings that both verify. `verify` also accepts bcrypt hashes already
/// held by the user directory.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a plaintext password.
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and digest in one value)
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext password against a stored Argon2 PHC or bcrypt hash.
    ///
    /// A mismatch is `Ok(false)`, not an error.
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is neither a valid PHC string nor a valid bcrypt hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if is_bcrypt(hash) {
            return bcrypt::verify(password, hash).map_err(|e| {
                PasswordError::VerificationFailed(format!("Invalid bcrypt hash: {}", e))
            });
        }

        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
