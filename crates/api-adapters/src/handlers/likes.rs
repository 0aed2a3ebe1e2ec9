//! Post likes (`/likes`) and comment likes (`/comment-likes`).

use axum::{extract::State, http::StatusCode, Json};
use domains::{Like, LikeSubject};
use serde::{Deserialize, Serialize};
use services::input::required_id;

use super::{message, query_id, MessageBody};
use crate::error::ApiResult;
use crate::extract::{AuthUser, JsonBody, QueryParams};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PostSelector {
    pub post_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentSelector {
    pub comment_id: Option<String>,
}

#[derive(Serialize)]
pub struct LikeCount {
    pub likes: i64,
}

pub async fn count(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PostSelector>,
) -> ApiResult<Json<LikeCount>> {
    let post_id = required_id(query.post_id.as_deref(), "post_id")?;
    let likes = state.services.engagement.count(LikeSubject::Post(post_id)).await?;
    Ok(Json(LikeCount { likes }))
}

pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonBody(body): JsonBody<PostSelector>,
) -> ApiResult<(StatusCode, Json<Like>)> {
    let post_id = required_id(body.post_id.as_deref(), "post_id")?;
    let like = state.services.engagement.like(&identity, LikeSubject::Post(post_id)).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    QueryParams(query): QueryParams<PostSelector>,
) -> ApiResult<Json<MessageBody>> {
    let post_id = required_id(query.post_id.as_deref(), "post_id")?;
    state.services.engagement.unlike(&identity, LikeSubject::Post(post_id)).await?;
    Ok(message("Like removed successfully"))
}

pub async fn like_comment(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonBody(body): JsonBody<CommentSelector>,
) -> ApiResult<(StatusCode, Json<Like>)> {
    let comment_id = required_id(body.comment_id.as_deref(), "comment_id")?;
    let like = state.services.engagement.like(&identity, LikeSubject::Comment(comment_id)).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

pub async fn unlike_comment(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    QueryParams(query): QueryParams<CommentSelector>,
) -> ApiResult<Json<MessageBody>> {
    let comment_id = query_id(query.comment_id.as_deref(), "comment_id")?;
    state.services.engagement.unlike(&identity, LikeSubject::Comment(comment_id)).await?;
    Ok(message("Like removed successfully"))
}
