//! Balance reconciliation rules.
//!
//! Everything here is pure: it decides how an amount is signed for a
//! [`TransactionKind`], which account combinations are legal, and which
//! signed deltas a [`Transaction`] contributes to bank account balances.
//! Persisting those deltas is the engine's job.
//!
//! For every transaction `t`, the effects of `Reverse` are the exact
//! negation of the effects of `Apply`, so reversing then applying on update
//! never double counts and reversing on delete leaves nothing behind.

use std::collections::BTreeMap;

use crate::{EngineError, Money, ResultEngine, Transaction, TransactionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Incorporate the transaction into balances.
    Apply,
    /// Remove a previously applied transaction from balances.
    Reverse,
}

/// A signed change to one account's current balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Effect {
    pub account_id: i32,
    pub delta: Money,
}

/// Coerces the amount sign to the convention of `kind`.
///
/// Expenses are stored negative, incomes and transfers positive. The
/// function is idempotent.
#[must_use]
pub fn normalize_amount(kind: TransactionKind, amount: Money) -> Money {
    match kind {
        TransactionKind::Expense => -amount.abs(),
        TransactionKind::Income | TransactionKind::Transfer => amount.abs(),
    }
}

/// Checks the account fields required and forbidden by `kind`.
pub fn validate_accounts(
    kind: TransactionKind,
    from_account_id: Option<i32>,
    to_account_id: Option<i32>,
) -> ResultEngine<()> {
    match kind {
        TransactionKind::Income => {
            if to_account_id.is_none() {
                return Err(EngineError::validation(
                    "to_account_id is required for income transactions",
                ));
            }
            if from_account_id.is_some() {
                return Err(EngineError::validation(
                    "from_account_id should not be set for income transactions",
                ));
            }
        }
        TransactionKind::Expense => {
            if from_account_id.is_none() {
                return Err(EngineError::validation(
                    "from_account_id is required for expense transactions",
                ));
            }
            if to_account_id.is_some() {
                return Err(EngineError::validation(
                    "to_account_id should not be set for expense transactions",
                ));
            }
        }
        TransactionKind::Transfer => {
            let (Some(from), Some(to)) = (from_account_id, to_account_id) else {
                return Err(EngineError::validation(
                    "Both from_account_id and to_account_id are required for transfer transactions",
                ));
            };
            if from == to {
                return Err(EngineError::validation(
                    "from_account_id and to_account_id must be different for transfers",
                ));
            }
        }
    }
    Ok(())
}

/// Returns the balance effects of `tx` in the given direction.
///
/// Missing account ids produce no effect.
#[must_use]
pub fn effects(tx: &Transaction, direction: Direction) -> Vec<Effect> {
    let magnitude = tx.amount.abs();
    let mut out = Vec::with_capacity(2);

    match tx.kind {
        TransactionKind::Income => {
            if let Some(account_id) = tx.to_account_id {
                out.push(Effect {
                    account_id,
                    delta: magnitude,
                });
            }
        }
        TransactionKind::Expense => {
            if let Some(account_id) = tx.from_account_id {
                out.push(Effect {
                    account_id,
                    delta: -magnitude,
                });
            }
        }
        TransactionKind::Transfer => {
            if let Some(account_id) = tx.from_account_id {
                out.push(Effect {
                    account_id,
                    delta: -magnitude,
                });
            }
            if let Some(account_id) = tx.to_account_id {
                out.push(Effect {
                    account_id,
                    delta: magnitude,
                });
            }
        }
    }

    if direction == Direction::Reverse {
        for effect in &mut out {
            effect.delta = -effect.delta;
        }
    }
    out
}

/// Folds effects into one net delta per account, dropping zero deltas.
///
/// Accounts come out in ascending id order.
#[must_use]
pub fn net_effects(effects: impl IntoIterator<Item = Effect>) -> BTreeMap<i32, Money> {
    let mut net: BTreeMap<i32, Money> = BTreeMap::new();
    for effect in effects {
        *net.entry(effect.account_id).or_default() += effect.delta;
    }
    net.retain(|_, delta| !delta.is_zero());
    net
}

impl Transaction {
    /// Shorthand for [`effects`].
    #[must_use]
    pub fn effects(&self, direction: Direction) -> Vec<Effect> {
        effects(self, direction)
    }
}
