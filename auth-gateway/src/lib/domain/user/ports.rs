use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserOutcome;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::StoredCredentials;
use crate::user::errors::AuthError;
use crate::user::errors::DirectoryError;

/// Port for the register and login use cases.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Hash the password, create the account and issue a token.
    ///
    /// # Errors
    /// * `Rejected` - Directory returned no identifier (e.g. duplicate email)
    /// * `Directory` - Directory unreachable or returned garbage
    /// * `Unexpected` - Hashing or signing failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Directory` - Directory unreachable or returned garbage
    /// * `Unexpected` - Stored hash unreadable or signing failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;
}

/// External store that owns user records.
///
/// Uniqueness, durability and field-level constraints live behind this
/// trait; the gateway only ever sends hashes and receives hashes.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Atomically create a user.
    ///
    /// Implementations must leave no partial record behind when the
    /// outcome is `Rejected` or an error is returned.
    ///
    /// # Errors
    /// * `Unavailable` - No connection could be acquired
    /// * `Query` - The create call itself failed
    /// * `MalformedRow` - The response could not be decoded
    async fn create_user(&self, user: &NewUser) -> Result<CreateUserOutcome, DirectoryError>;

    /// Look up stored credentials by normalized email.
    ///
    /// # Returns
    /// `None` when no account matches
    ///
    /// # Errors
    /// * `Unavailable` - No connection could be acquired
    /// * `Query` - The lookup itself failed
    /// * `MalformedRow` - The response could not be decoded
    async fn lookup_user(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, DirectoryError>;
}
