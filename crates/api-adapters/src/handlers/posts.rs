use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domains::{Post, PostListing};
use services::{ListPostsParams, PostInput};

use super::{message, path_id, MessageBody};
use crate::error::ApiResult;
use crate::extract::{AdminUser, JsonBody, QueryParams};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListPostsParams>,
) -> ApiResult<Json<Vec<PostListing>>> {
    // captured once; every predicate of this query compares against the same day
    let today = Utc::now().date_naive();
    Ok(Json(state.services.posts.list(&params, today).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Post>> {
    let id = path_id(&id)?;
    Ok(Json(state.services.posts.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(input): JsonBody<PostInput>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = state.services.posts.create(&admin, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<PostInput>,
) -> ApiResult<Json<Post>> {
    let id = path_id(&id)?;
    Ok(Json(state.services.posts.update(&admin, id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let id = path_id(&id)?;
    state.services.posts.delete(&admin, id).await?;
    Ok(message("Post deleted successfully"))
}
