//! Users API endpoints.

use api_types::{
    Message, Pagination,
    user::{User, UserNew, UserUpdate},
};
use axum::{Json, extract::State};
use engine::{NewUser, Page, UserPatch};

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> Result<Json<Vec<User>>, ServerError> {
    let users = state
        .engine
        .users(Page::new(page.skip, page.limit))
        .await?
        .into_iter()
        .map(views::user)
        .collect();
    Ok(Json(users))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<Json<User>, ServerError> {
    let user = state.engine.user(user_id).await?;
    Ok(Json(views::user(user)))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<UserNew>,
) -> Result<Json<User>, ServerError> {
    let user = state
        .engine
        .new_user(NewUser {
            username: payload.username,
            email: payload.email,
            full_name: payload.full_name,
        })
        .await?;
    Ok(Json(views::user(user)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> Result<Json<User>, ServerError> {
    let user = state
        .engine
        .update_user(
            user_id,
            UserPatch {
                username: payload.username,
                email: payload.email,
                full_name: payload.full_name,
            },
        )
        .await?;
    Ok(Json(views::user(user)))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_user(user_id).await?;
    Ok(Json(Message {
        message: "User deleted successfully".to_string(),
    }))
}
