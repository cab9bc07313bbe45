use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth_gateway::domain::user::models::CreateUserOutcome;
use auth_gateway::domain::user::models::EmailAddress;
use auth_gateway::domain::user::models::NewUser;
use auth_gateway::domain::user::models::StoredCredentials;
use auth_gateway::domain::user::models::UserId;
use auth_gateway::domain::user::ports::UserDirectory;
use auth_gateway::domain::user::service::AuthService;
use auth_gateway::inbound::http::router::create_router;
use auth_gateway::user::errors::DirectoryError;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub directory: Arc<InMemoryUserDirectory>,
    pub api_client: reqwest::Client,
    pub authenticator: Authenticator,
}

/// User directory double with the stored procedures' observable behavior:
/// sequential ids, unique emails, refusal message on duplicates.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<String, StoredUser>>,
}

#[derive(Clone)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub password_hash: String,
}

impl InMemoryUserDirectory {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn get(&self, email: &str) -> Option<StoredUser> {
        self.users.lock().unwrap().get(email).cloned()
    }

    /// Place a user directly in the directory, bypassing registration.
    pub fn insert(&self, email: &str, password_hash: &str) -> i64 {
        let mut users = self.users.lock().unwrap();
        let id = users.len() as i64 + 1;
        users.insert(
            email.to_string(),
            StoredUser {
                id,
                name: "Existing User".to_string(),
                role: "laborer".to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create_user(&self, user: &NewUser) -> Result<CreateUserOutcome, DirectoryError> {
        let mut users = self.users.lock().unwrap();

        if users.contains_key(user.email.as_str()) {
            return Ok(CreateUserOutcome::Rejected(Some(
                "Email already exists".to_string(),
            )));
        }

        let id = users.len() as i64 + 1;
        users.insert(
            user.email.as_str().to_string(),
            StoredUser {
                id,
                name: user.name.as_str().to_string(),
                role: user.role.as_str().to_string(),
                password_hash: user.password_hash.clone(),
            },
        );

        Ok(CreateUserOutcome::Created(UserId(id)))
    }

    async fn lookup_user(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, DirectoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(email.as_str())
            .map(|user| StoredCredentials {
                user_id: UserId(user.id),
                password_hash: user.password_hash.clone(),
            }))
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let directory = Arc::new(InMemoryUserDirectory::default());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&directory),
            Arc::new(Authenticator::new(JWT_SECRET)),
        ));

        let router = create_router(auth_service);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            directory,
            api_client: reqwest::Client::new(),
            authenticator: Authenticator::new(JWT_SECRET),
        }
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }
}
