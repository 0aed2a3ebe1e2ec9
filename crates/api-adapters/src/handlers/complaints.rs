use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domains::Complaint;
use services::ComplaintInput;

use super::{message, path_id, MessageBody};
use crate::error::ApiResult;
use crate::extract::{AdminUser, AuthUser, JsonBody};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, AdminUser(admin): AdminUser) -> ApiResult<Json<Vec<Complaint>>> {
    Ok(Json(state.services.complaints.list(&admin).await?))
}

pub async fn file(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonBody(input): JsonBody<ComplaintInput>,
) -> ApiResult<(StatusCode, Json<Complaint>)> {
    let complaint = state.services.complaints.file(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn dismiss(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let id = path_id(&id)?;
    state.services.complaints.dismiss(&admin, id).await?;
    Ok(message("Complaint deleted successfully"))
}
