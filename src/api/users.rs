//! User endpoints

use super::{ApiError, AppState};
use crate::types::{ContactInfo, User, UserUpdate};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of `POST /api/v1/users`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub count: usize,
}

pub async fn list_users(State(state): State<AppState>) -> Json<UserList> {
    let users = state.bank.list_users();
    Json(UserList {
        count: users.len(),
        users,
    })
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.bank.get_user(&user_name)?))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload?;
    let user = state.bank.create_user(
        &request.username,
        &request.first_name,
        &request.last_name,
        request.contact_info,
    )?;
    state.persist().await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("User {} {} created", user.first_name, user.last_name),
            "user": user,
        })),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    // Unknown users are reported before a bad body
    state.bank.get_user(&user_name)?;
    let Json(update) = payload?;
    if update == UserUpdate::default() {
        return Err(ApiError::bad_request("No data provided for update"));
    }

    let user = state.bank.update_user(&user_name, update)?;
    state.persist().await;

    Ok(Json(json!({
        "message": "User updated successfully.",
        "user": user,
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.bank.delete_user(&user_name)?;
    state.persist().await;

    Ok(Json(json!({ "message": format!("User {user_name} deleted") })))
}
