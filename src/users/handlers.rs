use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{method_not_allowed, ApiError},
    state::AppState,
    users::{
        dto::{DeletedResponse, UserPayload},
        repo_types::{NewUser, User},
        services::{parse_id, validate_payload},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(list_users).post(create_user).fallback(method_not_allowed),
        )
        .route(
            "/api/users/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
}

fn read_payload(payload: Result<Json<UserPayload>, JsonRejection>) -> Result<NewUser, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "rejected request body");
        ApiError::InvalidBody(e.body_text())
    })?;
    validate_payload(payload).inspect_err(|e| warn!(error = %e, "invalid user payload"))
}

fn read_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    let Path(raw) = path.map_err(|e| {
        warn!(error = %e, "rejected user id");
        ApiError::InvalidId(e.body_text())
    })?;
    parse_id(&raw).inspect_err(|_| warn!(id = %raw, "invalid user id"))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<User>), ApiError> {
    let input = read_payload(payload)?;
    let user = state.users.create(input).await.inspect_err(|e| {
        warn!(error = %e, "create user failed");
    })?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/users/{}", user.id))],
        Json(user),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = read_id(id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = read_id(id)?;
    let input = read_payload(payload)?;
    let user = state.users.update(id, input).await.inspect_err(|e| {
        warn!(error = %e, user_id = id, "update user failed");
    })?;

    info!(user_id = user.id, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = read_id(id)?;
    state.users.soft_delete(id).await?;

    info!(user_id = id, "user deleted");
    Ok(Json(DeletedResponse {
        message: "user deleted",
        id,
    }))
}
