//! # Request Extractors
//!
//! - [`AuthUser`]: mandatory authentication, rejects with 401 before the handler runs.
//! - [`MaybeAuthUser`]: optional authentication, a missing or bad token means anonymous.
//! - [`AdminUser`]: authentication plus a fresh admin grant lookup (403 otherwise).
//! - [`JsonBody`] / [`QueryParams`]: like `Json` / `Query` but reject with the JSON error body.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use domains::{DomainError, Identity};
use services::Admin;

use crate::error::ApiError;
use crate::state::AppState;

fn authorization(parts: &Parts) -> Option<&str> {
    parts.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = state.services.access.authenticate(authorization(parts))?;
        Ok(AuthUser(identity))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<Identity>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(state.services.access.authenticate_optional(authorization(parts))))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Admin);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        let admin = state.services.access.require_admin(identity).await?;
        Ok(AdminUser(admin))
    }
}

pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(DomainError::validation(rejection.body_text()).into()),
        }
    }
}

pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(DomainError::validation(rejection.body_text()).into()),
        }
    }
}
