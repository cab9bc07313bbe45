use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::ValidationError;

pub async fn register<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|session| {
            ApiSuccess::new(
                StatusCode::CREATED,
                AuthResponseData::new("User registered successfully", session),
            )
        })
}

/// HTTP request body for registration (raw JSON)
///
/// Every field is optional at the wire level so that absent fields yield
/// the same 400 as blank ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    name: Option<String>,
    mobile: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ValidationError> {
        RegisterCommand::parse(
            self.name,
            self.mobile,
            self.email,
            self.password,
            self.role,
        )
    }
}
