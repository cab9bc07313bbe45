use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Row;
use sqlx::Transaction;

use crate::domain::user::models::CreateUserOutcome;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::StoredCredentials;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::DirectoryError;

/// User directory backed by the `register_user` and `login_user` stored
/// procedures.
///
/// The procedures own uniqueness checks and record layout; this adapter
/// only reads the columns it needs from their result rows.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn register_within(
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
    ) -> Result<CreateUserOutcome, DirectoryError> {
        let row = sqlx::query(r#"SELECT * FROM register_user($1, $2, $3, $4, $5)"#)
            .bind(user.name.as_str())
            .bind(user.mobile.as_str())
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(CreateUserOutcome::Rejected(None));
        };

        match optional_id(&row, "new_user_id").map_err(map_sqlx_error)? {
            Some(id) => Ok(CreateUserOutcome::Created(UserId(id))),
            None => Ok(CreateUserOutcome::Rejected(optional_message(&row))),
        }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn create_user(&self, user: &NewUser) -> Result<CreateUserOutcome, DirectoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        match Self::register_within(&mut tx, user).await {
            Ok(CreateUserOutcome::Created(user_id)) => {
                tx.commit().await.map_err(map_sqlx_error)?;
                Ok(CreateUserOutcome::Created(user_id))
            }
            outcome => {
                if let Err(e) = tx.rollback().await {
                    tracing::error!(email = %user.email, error = %e, "Rollback of register_user failed");
                }
                outcome
            }
        }
    }

    async fn lookup_user(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, DirectoryError> {
        let row = sqlx::query(r#"SELECT * FROM login_user($1)"#)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(user_id) = optional_id(&row, "user_id").map_err(map_sqlx_error)? else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("user_password").map_err(map_sqlx_error)?;

        Ok(Some(StoredCredentials {
            user_id: UserId(user_id),
            password_hash,
        }))
    }
}

/// Read an integer id column that may be INT4 or INT8, or NULL.
fn optional_id(row: &PgRow, column: &str) -> Result<Option<i64>, sqlx::Error> {
    match row.try_get::<Option<i64>, _>(column) {
        Err(sqlx::Error::ColumnDecode { .. }) => row
            .try_get::<Option<i32>, _>(column)
            .map(|id| id.map(i64::from)),
        other => other,
    }
}

/// The optional explanation a procedure may attach to a refusal.
fn optional_message(row: &PgRow) -> Option<String> {
    row.try_get::<Option<String>, _>("message")
        .ok()
        .flatten()
        .filter(|m| !m.trim().is_empty())
}

fn map_sqlx_error(err: sqlx::Error) -> DirectoryError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => DirectoryError::Unavailable(err.to_string()),
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => DirectoryError::MalformedRow(err.to_string()),
        _ => DirectoryError::Query(err.to_string()),
    }
}
