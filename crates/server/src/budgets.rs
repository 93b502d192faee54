//! Budgets API endpoints.

use api_types::{
    Message, Pagination,
    budget::{Budget, BudgetNew, BudgetStatus, BudgetUpdate},
};
use axum::{Json, extract::State};
use engine::{BudgetPatch, NewBudget, Page};

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> Result<Json<Vec<Budget>>, ServerError> {
    let budgets = state
        .engine
        .budgets(Page::new(page.skip, page.limit))
        .await?
        .into_iter()
        .map(|(budget, category)| views::budget(budget, category))
        .collect();
    Ok(Json(budgets))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<i32>,
) -> Result<Json<Budget>, ServerError> {
    let (budget, category) = state.engine.budget(budget_id).await?;
    Ok(Json(views::budget(budget, category)))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BudgetNew>,
) -> Result<Json<Budget>, ServerError> {
    let (budget, category) = state
        .engine
        .new_budget(NewBudget {
            category_id: payload.category_id,
            amount: views::money(payload.amount)?,
            period: payload.period,
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;
    Ok(Json(views::budget(budget, Some(category))))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<BudgetUpdate>,
) -> Result<Json<Budget>, ServerError> {
    let (budget, category) = state
        .engine
        .update_budget(
            budget_id,
            BudgetPatch {
                category_id: payload.category_id,
                amount: payload.amount.map(views::money).transpose()?,
                period: payload.period,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;
    Ok(Json(views::budget(budget, Some(category))))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_budget(budget_id).await?;
    Ok(Json(Message {
        message: "Budget deleted successfully".to_string(),
    }))
}

pub async fn statuses(
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetStatus>>, ServerError> {
    let statuses = state
        .engine
        .budget_statuses()
        .await?
        .into_iter()
        .map(views::budget_status)
        .collect();
    Ok(Json(statuses))
}

pub async fn status(
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<i32>,
) -> Result<Json<BudgetStatus>, ServerError> {
    let status = state.engine.budget_status(budget_id).await?;
    Ok(Json(views::budget_status(status)))
}
