//! Credential and token primitives for the authentication gateway.
//!
//! Provides:
//! - Password hashing (Argon2id, salted PHC strings)
//! - Signed bearer tokens (HS256 JWT carrying `userId` and `email`)
//! - An `Authenticator` coordinating both for register and login flows
//!
//! The gateway never stores or forwards plaintext passwords: it hashes on
//! registration and verifies against a stored hash on login.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("securepassword123").unwrap();
//! assert!(hasher.verify("securepassword123", &hash).unwrap());
//! assert!(!hasher.verify("other", &hash).unwrap());
//! ```
//!
//! ## Issuing and Reading Tokens
//! ```
//! use auth::{Claims, JwtHandler, TOKEN_TTL};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_user(42, "john@example.com", TOKEN_TTL);
//! let token = handler.encode(&claims).unwrap();
//! let decoded = handler.decode(&token).unwrap();
//! assert_eq!(decoded.user_id, 42);
//! ```
//!
//! ## Complete Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash before handing the record to storage
//! let hash = auth.hash_password("securepassword123").unwrap();
//!
//! // Login: verify against the stored hash and issue a token
//! let token = auth
//!     .authenticate("securepassword123", &hash, 7, "john@example.com")
//!     .unwrap();
//!
//! let claims = auth.validate_token(&token).unwrap();
//! assert_eq!(claims.email, "john@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TOKEN_TTL;
pub use password::PasswordError;
pub use password::PasswordHasher;
