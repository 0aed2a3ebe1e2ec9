use axum::{
    extract::{Path, State},
    Json,
};
use domains::{Comment, Profile};
use serde::Serialize;

use super::path_id;
use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UserModerated {
    pub message: &'static str,
    pub user: Profile,
}

#[derive(Serialize)]
pub struct CommentRemoved {
    pub message: &'static str,
    pub comment: Comment,
}

pub async fn block(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserModerated>> {
    let user = state.services.moderation.set_blocked(&admin, path_id(&id)?, true).await?;
    Ok(Json(UserModerated { message: "User blocked successfully", user }))
}

pub async fn unblock(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserModerated>> {
    let user = state.services.moderation.set_blocked(&admin, path_id(&id)?, false).await?;
    Ok(Json(UserModerated { message: "User unblocked successfully", user }))
}

pub async fn remove_comment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CommentRemoved>> {
    let comment = state.services.moderation.remove_comment(&admin, path_id(&id)?).await?;
    Ok(Json(CommentRemoved { message: "Comment deleted successfully", comment }))
}
