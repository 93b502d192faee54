//! Transactions API endpoints.

use api_types::{
    Message,
    transaction::{Transaction, TransactionListQuery, TransactionNew, TransactionUpdate},
};
use axum::{Json, extract::State};
use engine::{NewTransaction, Page, TransactionFilter, TransactionKind, TransactionPatch};

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let filter = TransactionFilter {
        category_id: query.category_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let transactions = state
        .engine
        .transactions(&filter, Page::new(query.skip, query.limit))
        .await?
        .into_iter()
        .map(|(tx, category)| views::transaction(tx, category))
        .collect();
    Ok(Json(transactions))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<i32>,
) -> Result<Json<Transaction>, ServerError> {
    let (tx, category) = state.engine.transaction(transaction_id).await?;
    Ok(Json(views::transaction(tx, category)))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> Result<Json<Transaction>, ServerError> {
    let kind = TransactionKind::try_from(payload.kind.as_str())?;
    let (tx, category) = state
        .engine
        .new_transaction(NewTransaction {
            category_id: payload.category_id,
            amount: views::money(payload.amount)?,
            description: payload.description,
            date: payload.date,
            kind,
            from_account_id: payload.from_account_id,
            to_account_id: payload.to_account_id,
        })
        .await?;
    Ok(Json(views::transaction(tx, Some(category))))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> Result<Json<Transaction>, ServerError> {
    let kind = payload
        .kind
        .as_deref()
        .map(TransactionKind::try_from)
        .transpose()?;
    let (tx, category) = state
        .engine
        .update_transaction(
            transaction_id,
            TransactionPatch {
                category_id: payload.category_id,
                amount: payload.amount.map(views::money).transpose()?,
                description: payload.description,
                date: payload.date,
                kind,
                from_account_id: payload.from_account_id,
                to_account_id: payload.to_account_id,
            },
        )
        .await?;
    Ok(Json(views::transaction(tx, Some(category))))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_transaction(transaction_id).await?;
    Ok(Json(Message {
        message: "Transaction deleted successfully".to_string(),
    }))
}
