use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Lifetime of every bearer token issued by the gateway.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Bearer token payload.
///
/// Serialized with the claim names clients already decode: `userId` and
/// `email`, plus the registered `iat`/`exp` timestamps (Unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,

    pub email: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user, valid from now for `ttl`.
    pub fn for_user(user_id: i64, email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            user_id,
            email: email.into(),
            iat: now,
            exp: now.saturating_add(ttl),
        }
    }
}
