use std::time::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TOKEN_TTL;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and token issuing.
///
/// Holds no per-request state; a single instance is shared by all handlers.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator issuing one-hour tokens.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            token_ttl: TOKEN_TTL,
        }
    }

    /// Hash a password before it is handed to storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against its stored hash and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password supplied by the caller
    /// * `stored_hash` - Hash returned by the user store
    /// * `user_id` - Identifier embedded in the token
    /// * `email` - Email embedded in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    /// * `JwtError` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: i64,
        email: &str,
    ) -> Result<String, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(user_id, email)?)
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, when the caller just proved
    /// knowledge of the password by choosing it.
    ///
    /// # Errors
    /// * `JwtError` - Token signing failed
    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<String, JwtError> {
        let claims = Claims::for_user(user_id, email, self.token_ttl);
        self.jwt_handler.encode(&claims)
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    /// * `JwtError` - Token is expired, forged or malformed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
