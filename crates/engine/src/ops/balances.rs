use std::collections::BTreeMap;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Money, ResultEngine, Transaction, bank_accounts,
    effects::{Direction, net_effects},
    transactions,
};

use super::{Engine, with_tx};

/// An account whose stored balance disagrees with its transaction history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceDrift {
    pub account_id: i32,
    pub name: String,
    pub stored_balance: Money,
    pub expected_balance: Money,
}

/// Adds each net delta to the account's current balance in place.
///
/// Deltas for accounts that no longer exist are skipped.
pub(super) async fn apply_effects<C>(conn: &C, net: &BTreeMap<i32, Money>) -> ResultEngine<()>
where
    C: ConnectionTrait,
{
    for (&account_id, &delta) in net {
        let result = bank_accounts::Entity::update_many()
            .col_expr(
                bank_accounts::Column::CurrentBalanceMinor,
                Expr::col(bank_accounts::Column::CurrentBalanceMinor).add(delta.cents()),
            )
            .filter(bank_accounts::Column::Id.eq(account_id))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            tracing::warn!(account_id, %delta, "balance effect skipped: account not found");
        } else {
            tracing::debug!(account_id, %delta, "balance effect applied");
        }
    }
    Ok(())
}

/// Replays every stored transaction on top of the initial balances.
async fn expected_balances<C>(
    conn: &C,
) -> ResultEngine<Vec<(bank_accounts::Model, Money)>>
where
    C: ConnectionTrait,
{
    let accounts = bank_accounts::Entity::find()
        .order_by_asc(bank_accounts::Column::Id)
        .all(conn)
        .await?;
    let history = transactions::Entity::find()
        .order_by_asc(transactions::Column::Id)
        .all(conn)
        .await?;

    let mut effects = Vec::new();
    for model in history {
        let tx = Transaction::try_from(model)?;
        effects.extend(tx.effects(Direction::Apply));
    }
    let net = net_effects(effects);

    Ok(accounts
        .into_iter()
        .map(|account| {
            let applied = net.get(&account.id).copied().unwrap_or_default();
            let expected = Money::new(account.initial_balance_minor) + applied;
            (account, expected)
        })
        .collect())
}

impl Engine {
    /// Compares every stored current balance with its initial balance plus
    /// the effects of all stored transactions.
    ///
    /// Returns the accounts that disagree; an empty list means consistent.
    pub async fn check_balances(&self) -> ResultEngine<Vec<BalanceDrift>> {
        let expected = expected_balances(&self.database).await?;
        Ok(expected
            .into_iter()
            .filter(|(account, expected)| account.current_balance_minor != expected.cents())
            .map(|(account, expected)| BalanceDrift {
                account_id: account.id,
                stored_balance: Money::new(account.current_balance_minor),
                expected_balance: expected,
                name: account.name,
            })
            .collect())
    }

    /// Rewrites every current balance from the transaction history.
    ///
    /// Returns the drifts that were corrected.
    pub async fn recompute_balances(&self) -> ResultEngine<Vec<BalanceDrift>> {
        with_tx!(self, |db_tx| {
            let mut repaired = Vec::new();
            for (account, expected) in expected_balances(&db_tx).await? {
                if account.current_balance_minor == expected.cents() {
                    continue;
                }
                let drift = BalanceDrift {
                    account_id: account.id,
                    name: account.name.clone(),
                    stored_balance: Money::new(account.current_balance_minor),
                    expected_balance: expected,
                };
                let mut model: bank_accounts::ActiveModel = account.into();
                model.current_balance_minor = ActiveValue::Set(expected.cents());
                model.update(&db_tx).await?;

                tracing::warn!(
                    account_id = drift.account_id,
                    stored = %drift.stored_balance,
                    expected = %drift.expected_balance,
                    "balance recomputed"
                );
                repaired.push(drift);
            }
            Ok(repaired)
        })
    }
}
