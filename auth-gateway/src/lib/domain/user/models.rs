use std::fmt;
use std::str::FromStr;

use crate::user::errors::EmailError;
use crate::user::errors::ValidationError;

/// Directory-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address in canonical form: trimmed and lowercased.
///
/// Lookups and token claims always use this form, so `JOHN@Example.com `
/// and `john@example.com` refer to the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize and validate an email for account creation.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not an RFC 5322 address after normalization
    pub fn new(email: &str) -> Result<Self, EmailError> {
        let normalized = Self::normalize(email);

        email_address::EmailAddress::from_str(&normalized)
            .map(|_| Self(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Normalize without syntax validation.
    ///
    /// Used for credential lookup: a malformed address simply matches no
    /// account, and the caller must not learn why.
    pub fn normalized(email: &str) -> Self {
        Self(Self::normalize(email))
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Mobile number, trimmed and non-empty. Format is checked by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNumber(String);

impl MobileNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Account role.
///
/// Clients are documented to send one of `laborer`, `contractor` or
/// `admin`, but the value is passed through unchecked: the directory owns
/// that rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role(String);

impl Role {
    pub const DEFAULT: &'static str = "laborer";

    /// Blank or absent roles fall back to `laborer`.
    pub fn from_optional(role: Option<&str>) -> Self {
        match role.map(str::trim) {
            Some(role) if !role.is_empty() => Self(role.to_string()),
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// Plaintext password as received from the client.
///
/// Lives only until it is hashed or verified; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Returns the trimmed value if present and non-blank.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: Name,
    pub mobile: MobileNumber,
    pub email: EmailAddress,
    pub password: Password,
    pub role: Role,
}

impl RegisterCommand {
    /// Build a command from raw request fields.
    ///
    /// Passwords are checked for presence only and are never trimmed.
    ///
    /// # Errors
    /// * `MissingRegistrationFields` - Name, mobile or email is absent or blank, or password is absent or empty
    /// * `InvalidEmail` - Email is present but malformed
    pub fn parse(
        name: Option<String>,
        mobile: Option<String>,
        email: Option<String>,
        password: Option<String>,
        role: Option<String>,
    ) -> Result<Self, ValidationError> {
        let password = password.filter(|p| !p.is_empty());

        let (Some(name), Some(mobile), Some(email), Some(password)) =
            (required(name), required(mobile), required(email), password)
        else {
            return Err(ValidationError::MissingRegistrationFields);
        };

        Ok(Self {
            name: Name(name),
            mobile: MobileNumber(mobile),
            email: EmailAddress::new(&email)?,
            password: Password(password),
            role: Role::from_optional(role.as_deref()),
        })
    }
}

/// Validated login request.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: Password,
}

impl LoginCommand {
    /// # Errors
    /// * `MissingCredentials` - Email is absent or blank, or password is absent or empty
    pub fn parse(email: Option<String>, password: Option<String>) -> Result<Self, ValidationError> {
        let password = password.filter(|p| !p.is_empty());

        let (Some(email), Some(password)) = (required(email), password) else {
            return Err(ValidationError::MissingCredentials);
        };

        Ok(Self {
            email: EmailAddress::normalized(&email),
            password: Password(password),
        })
    }
}

/// Record handed to the directory on registration. Carries a hash only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: Name,
    pub mobile: MobileNumber,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
}

/// What the directory returns for a credential lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: String,
}

/// Result of an atomic create-user call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created(UserId),
    /// No identifier came back; the directory may explain why.
    Rejected(Option<String>),
}

/// Successful register or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub token: String,
}
