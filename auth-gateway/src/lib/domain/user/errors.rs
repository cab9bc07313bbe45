use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Request input that is missing or malformed. Detected before the
/// directory is contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingRegistrationFields,

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Malformed request body")]
    MalformedBody,
}

/// Failures reaching or reading the user directory.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("User directory unavailable: {0}")]
    Unavailable(String),

    #[error("User directory query failed: {0}")]
    Query(String),

    #[error("Unexpected user directory response: {0}")]
    MalformedRow(String),
}

/// Top-level error for register and login.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The directory refused to create the account, e.g. duplicate email.
    #[error("{}", rejection_message(.0))]
    Rejected(Option<String>),

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn rejection_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("Registration failed")
}

impl From<auth::PasswordError> for AuthError {
    fn from(err: auth::PasswordError) -> Self {
        AuthError::Unexpected(err.to_string())
    }
}

impl From<auth::JwtError> for AuthError {
    fn from(err: auth::JwtError) -> Self {
        AuthError::Unexpected(err.to_string())
    }
}
