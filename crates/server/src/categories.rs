//! Categories API endpoints.

use api_types::{
    Message, Pagination,
    category::{Category, CategoryNew, CategoryUpdate},
};
use axum::{Json, extract::State};
use engine::{CategoryPatch, NewCategory, Page};

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> Result<Json<Vec<Category>>, ServerError> {
    let categories = state
        .engine
        .categories(Page::new(page.skip, page.limit))
        .await?
        .into_iter()
        .map(views::category)
        .collect();
    Ok(Json(categories))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(category_id): ApiPath<i32>,
) -> Result<Json<Category>, ServerError> {
    let category = state.engine.category(category_id).await?;
    Ok(Json(views::category(category)))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<CategoryNew>,
) -> Result<Json<Category>, ServerError> {
    let category = state
        .engine
        .new_category(NewCategory {
            name: payload.name,
            description: payload.description,
            color: payload.color,
            icon: payload.icon,
        })
        .await?;
    Ok(Json(views::category(category)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(category_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CategoryUpdate>,
) -> Result<Json<Category>, ServerError> {
    let category = state
        .engine
        .update_category(
            category_id,
            CategoryPatch {
                name: payload.name,
                description: payload.description,
                color: payload.color,
                icon: payload.icon,
            },
        )
        .await?;
    Ok(Json(views::category(category)))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(category_id): ApiPath<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(Json(Message {
        message: "Category deleted successfully".to_string(),
    }))
}
