//! Bank accounts API endpoints.

use api_types::{
    Message, Pagination,
    bank_account::{BalanceCheck, BankAccount, BankAccountNew, BankAccountUpdate},
};
use axum::{Json, extract::State};
use engine::{BankAccountPatch, Money, NewBankAccount, Page};

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> Result<Json<Vec<BankAccount>>, ServerError> {
    let accounts = state
        .engine
        .bank_accounts(Page::new(page.skip, page.limit))
        .await?
        .into_iter()
        .map(views::bank_account)
        .collect();
    Ok(Json(accounts))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<i32>,
) -> Result<Json<BankAccount>, ServerError> {
    let account = state.engine.bank_account(account_id).await?;
    Ok(Json(views::bank_account(account)))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BankAccountNew>,
) -> Result<Json<BankAccount>, ServerError> {
    let initial_balance = match payload.initial_balance {
        Some(value) => views::money(value)?,
        None => Money::ZERO,
    };
    let account = state
        .engine
        .new_bank_account(NewBankAccount {
            name: payload.name,
            currency: payload.currency,
            initial_balance,
            owner_id: payload.owner_id,
        })
        .await?;
    Ok(Json(views::bank_account(account)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<BankAccountUpdate>,
) -> Result<Json<BankAccount>, ServerError> {
    let account = state
        .engine
        .update_bank_account(
            account_id,
            BankAccountPatch {
                name: payload.name,
                currency: payload.currency,
                initial_balance: payload.initial_balance.map(views::money).transpose()?,
                owner_id: payload.owner_id,
            },
        )
        .await?;
    Ok(Json(views::bank_account(account)))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_bank_account(account_id).await?;
    Ok(Json(Message {
        message: "Bank account deleted successfully".to_string(),
    }))
}

pub async fn balance_check(
    State(state): State<ServerState>,
) -> Result<Json<BalanceCheck>, ServerError> {
    let drifts = state.engine.check_balances().await?;
    Ok(Json(views::balance_check(drifts)))
}

/// Rewrites drifted balances. `drifts` lists what was repaired, so
/// `consistent` is true when nothing needed a fix.
pub async fn recompute(
    State(state): State<ServerState>,
) -> Result<Json<BalanceCheck>, ServerError> {
    let repaired = state.engine.recompute_balances().await?;
    Ok(Json(views::balance_check(repaired)))
}
