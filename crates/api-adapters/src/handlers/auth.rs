use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use services::{LoginInput, RegisterInput};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: RegisteredUser,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub username: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let profile = state.services.accounts.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user: RegisteredUser { id: profile.id, email: profile.email, username: profile.username },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.services.accounts.login(input).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn me(State(state): State<AppState>, AuthUser(identity): AuthUser) -> ApiResult<Json<MeResponse>> {
    let profile = state.services.accounts.me(&identity).await?;
    Ok(Json(MeResponse {
        id: profile.id,
        email: profile.email,
        created_at: profile.created_at,
        username: profile.username,
    }))
}
