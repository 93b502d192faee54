//! Core of the family finance tracker.
//!
//! The [`Engine`] owns the database connection and exposes the write and
//! read operations for categories, budgets, users, bank accounts and
//! transactions. Every bank account keeps a denormalized `current_balance`
//! that the engine updates in the same database transaction as the
//! transaction write that caused it; see [`effects`] for the rules.

pub use bank_accounts::BankAccount;
pub use budgets::Budget;
pub use categories::Category;
pub use commands::{
    BankAccountPatch, BudgetPatch, CategoryPatch, DEFAULT_LIMIT, NewBankAccount, NewBudget,
    NewCategory, NewTransaction, NewUser, Page, TransactionFilter, TransactionPatch, UserPatch,
};
pub use currency::CurrencyCode;
pub use effects::{Direction, Effect};
pub use error::EngineError;
pub use money::Money;
pub use ops::{BalanceDrift, BudgetStatus, CategorySpending, Engine, EngineBuilder, Summary};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

mod bank_accounts;
mod budgets;
mod categories;
mod commands;
mod currency;
pub mod effects;
mod error;
mod money;
mod ops;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
