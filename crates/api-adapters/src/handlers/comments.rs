use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domains::{Comment, CommentView};
use serde::Deserialize;
use services::{CommentEdit, CommentInput};

use super::{message, path_id, query_id, MessageBody};
use crate::error::ApiResult;
use crate::extract::{AuthUser, JsonBody, MaybeAuthUser, QueryParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub post_id: Option<String>,
}

/// Anonymous callers see every comment with `liked: false`.
pub async fn list(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    QueryParams(query): QueryParams<CommentsQuery>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let post_id = query_id(query.post_id.as_deref(), "post_id")?;
    Ok(Json(state.services.comments.list(post_id, viewer.as_ref()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonBody(input): JsonBody<CommentInput>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let comment = state.services.comments.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn edit(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CommentEdit>,
) -> ApiResult<Json<Comment>> {
    let id = path_id(&id)?;
    Ok(Json(state.services.comments.edit(&identity, id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let id = path_id(&id)?;
    state.services.comments.delete(&identity, id).await?;
    Ok(message("Comment deleted successfully"))
}
