use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserOutcome;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserDirectory;

/// Register and login on top of an injected user directory.
///
/// Stateless between requests: the directory and authenticator are shared
/// read-only collaborators.
pub struct AuthService<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
    authenticator: Arc<Authenticator>,
}

impl<D> AuthService<D>
where
    D: UserDirectory,
{
    pub fn new(directory: Arc<D>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            directory,
            authenticator,
        }
    }
}

#[async_trait]
impl<D> AuthServicePort for AuthService<D>
where
    D: UserDirectory,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        tracing::info!(email = %command.email, "Attempting registration");

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password.as_str().to_owned();
        let password_hash = run_blocking(move || authenticator.hash_password(&password))
            .await?
            .map_err(|e| {
                tracing::error!(email = %command.email, error = %e, "Password hashing failed");
                AuthError::from(e)
            })?;

        let new_user = NewUser {
            name: command.name,
            mobile: command.mobile,
            email: command.email,
            password_hash,
            role: command.role,
        };

        let user_id = match self.directory.create_user(&new_user).await? {
            CreateUserOutcome::Created(user_id) => user_id,
            CreateUserOutcome::Rejected(message) => {
                let err = AuthError::Rejected(message);
                tracing::warn!(email = %new_user.email, reason = %err, "Registration rejected");
                return Err(err);
            }
        };

        let token = self
            .authenticator
            .issue_token(user_id.0, new_user.email.as_str())
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Token signing failed");
                AuthError::from(e)
            })?;

        tracing::info!(user_id = %user_id, email = %new_user.email, "User registered");

        Ok(AuthSession {
            user_id,
            email: new_user.email,
            token,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        tracing::info!(email = %command.email, "Attempting login");

        let Some(credentials) = self.directory.lookup_user(&command.email).await? else {
            tracing::warn!(email = %command.email, "Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password.as_str().to_owned();
        let stored_hash = credentials.password_hash.clone();
        let user_id = credentials.user_id.0;
        let email = command.email.as_str().to_owned();

        let token = run_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, user_id, &email)
        })
        .await?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::warn!(email = %command.email, "Login failed");
                AuthError::InvalidCredentials
            }
            AuthenticationError::PasswordError(err) => {
                tracing::error!(user_id = %credentials.user_id, error = %err, "Stored password hash unreadable");
                AuthError::from(err)
            }
            AuthenticationError::JwtError(err) => {
                tracing::error!(user_id = %credentials.user_id, error = %err, "Token signing failed");
                AuthError::from(err)
            }
        })?;

        tracing::info!(user_id = %credentials.user_id, email = %command.email, "Login successful");

        Ok(AuthSession {
            user_id: credentials.user_id,
            email: command.email,
            token,
        })
    }
}

/// Run CPU-bound hashing work on the blocking thread pool.
async fn run_blocking<F, T>(task: F) -> Result<T, AuthError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        tracing::error!(error = %e, "Blocking task failed");
        AuthError::Unexpected(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::StoredCredentials;
    use crate::domain::user::models::UserId;
    use crate::user::errors::DirectoryError;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserDirectory {}

        #[async_trait]
        impl UserDirectory for TestUserDirectory {
            async fn create_user(&self, user: &NewUser) -> Result<CreateUserOutcome, DirectoryError>;
            async fn lookup_user(&self, email: &EmailAddress) -> Result<Option<StoredCredentials>, DirectoryError>;
        }
    }

    fn service(directory: MockTestUserDirectory) -> AuthService<MockTestUserDirectory> {
        AuthService::new(Arc::new(directory), Arc::new(Authenticator::new(SECRET)))
    }

    fn register_command(email: &str) -> RegisterCommand {
        RegisterCommand::parse(
            Some("John Doe".to_string()),
            Some("1234567890".to_string()),
            Some(email.to_string()),
            Some("securepassword123".to_string()),
            Some("laborer".to_string()),
        )
        .unwrap()
    }

    fn login_command(email: &str, password: &str) -> LoginCommand {
        LoginCommand::parse(Some(email.to_string()), Some(password.to_string())).unwrap()
    }

    fn stored_credentials(user_id: i64, password: &str) -> StoredCredentials {
        StoredCredentials {
            user_id: UserId(user_id),
            password_hash: Authenticator::new(SECRET).hash_password(password).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut directory = MockTestUserDirectory::new();

        directory
            .expect_create_user()
            .withf(|user| {
                user.email.as_str() == "john@example.com"
                    && user.name.as_str() == "John Doe"
                    && user.role.as_str() == "laborer"
                    && user.password_hash.starts_with("$argon2")
                    && !user.password_hash.contains("securepassword123")
            })
            .times(1)
            .returning(|_| Ok(CreateUserOutcome::Created(UserId(41))));

        let service = service(directory);
        let session = service
            .register(register_command("John@Example.com"))
            .await
            .expect("registration should succeed");

        assert_eq!(session.user_id, UserId(41));
        assert_eq!(session.email.as_str(), "john@example.com");

        let claims = Authenticator::new(SECRET)
            .validate_token(&session.token)
            .expect("token should decode");
        assert_eq!(claims.user_id, 41);
        assert_eq!(claims.email, "john@example.com");
    }

    #[tokio::test]
    async fn test_register_rejected_with_message() {
        let mut directory = MockTestUserDirectory::new();

        directory
            .expect_create_user()
            .times(1)
            .returning(|_| {
                Ok(CreateUserOutcome::Rejected(Some(
                    "Email already exists".to_string(),
                )))
            });

        let result = service(directory)
            .register(register_command("john@example.com"))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(Some(_))));
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn test_register_rejected_without_message() {
        let mut directory = MockTestUserDirectory::new();

        directory
            .expect_create_user()
            .times(1)
            .returning(|_| Ok(CreateUserOutcome::Rejected(None)));

        let err = service(directory)
            .register(register_command("john@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Registration failed");
    }

    #[tokio::test]
    async fn test_register_directory_failure() {
        let mut directory = MockTestUserDirectory::new();

        directory
            .expect_create_user()
            .times(1)
            .returning(|_| Err(DirectoryError::Unavailable("pool timed out".to_string())));

        let err = service(directory)
            .register(register_command("john@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Directory(_)));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut directory = MockTestUserDirectory::new();
        let credentials = stored_credentials(7, "securepassword123");

        directory
            .expect_lookup_user()
            .withf(|email| email.as_str() == "john@example.com")
            .times(1)
            .returning(move |_| Ok(Some(credentials.clone())));

        let session = service(directory)
            .login(login_command("JOHN@EXAMPLE.COM", "securepassword123"))
            .await
            .expect("login should succeed");

        assert_eq!(session.user_id, UserId(7));

        let claims = Authenticator::new(SECRET)
            .validate_token(&session.token)
            .unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "john@example.com");
    }

    #[tokio::test]
    async fn test_login_with_bcrypt_stored_hash() {
        let mut directory = MockTestUserDirectory::new();
        let credentials = StoredCredentials {
            user_id: UserId(12),
            password_hash: bcrypt::hash("securepassword123", 10).unwrap(),
        };

        directory
            .expect_lookup_user()
            .times(2)
            .returning(move |_| Ok(Some(credentials.clone())));

        let service = service(directory);
        let session = service
            .login(login_command("john@example.com", "securepassword123"))
            .await
            .expect("bcrypt-hashed account should log in");
        assert_eq!(session.user_id, UserId(12));

        let err = service
            .login(login_command("john@example.com", "wrongpassword"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_logins_on_multi_thread_runtime() {
        let mut directory = MockTestUserDirectory::new();
        let credentials = stored_credentials(7, "securepassword123");

        directory
            .expect_lookup_user()
            .times(4)
            .returning(move |_| Ok(Some(credentials.clone())));

        let service = Arc::new(service(directory));
        let logins = (0..4).map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .login(login_command("john@example.com", "securepassword123"))
                    .await
            })
        });

        for login in logins.collect::<Vec<_>>() {
            let session = login.await.unwrap().expect("login should succeed");
            assert_eq!(session.user_id, UserId(7));
        }
    }

    #[tokio::test]
    async fn test_login_unknown_email_and_wrong_password_are_identical() {
        let mut unknown = MockTestUserDirectory::new();
        unknown
            .expect_lookup_user()
            .times(1)
            .returning(|_| Ok(None));

        let mut known = MockTestUserDirectory::new();
        let credentials = stored_credentials(7, "securepassword123");
        known
            .expect_lookup_user()
            .times(1)
            .returning(move |_| Ok(Some(credentials.clone())));

        let unknown_err = service(unknown)
            .login(login_command("ghost@example.com", "securepassword123"))
            .await
            .unwrap_err();
        let wrong_password_err = service(known)
            .login(login_command("john@example.com", "wrongpassword"))
            .await
            .unwrap_err();

        assert!(matches!(unknown_err, AuthError::InvalidCredentials));
        assert!(matches!(wrong_password_err, AuthError::InvalidCredentials));
        assert_eq!(unknown_err.to_string(), wrong_password_err.to_string());
    }

    #[tokio::test]
    async fn test_login_unreadable_stored_hash() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_lookup_user().times(1).returning(|_| {
            Ok(Some(StoredCredentials {
                user_id: UserId(7),
                password_hash: "not-a-phc-string".to_string(),
            }))
        });

        let err = service(directory)
            .login(login_command("john@example.com", "securepassword123"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_login_directory_failure() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_lookup_user()
            .times(1)
            .returning(|_| Err(DirectoryError::Query("connection reset".to_string())));

        let err = service(directory)
            .login(login_command("john@example.com", "securepassword123"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Directory(_)));
    }
}
