//! The module contains `BankAccount` struct and its storage model.

use sea_orm::entity::prelude::*;

use crate::{CurrencyCode, EngineError, Money};

/// A bank account.
///
/// A bank account is a named money container owned by a user. Its
/// `current_balance` is derived state: `initial_balance` plus the effect of
/// every transaction that moves money in or out of it. The engine keeps it
/// up to date on each transaction write; see [`Engine::check_balances`].
///
/// [`Engine::check_balances`]: crate::Engine::check_balances
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankAccount {
    pub id: i32,
    pub name: String,
    pub currency: CurrencyCode,
    pub initial_balance: Money,
    pub current_balance: Money,
    pub owner_id: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub currency: String,
    pub initial_balance_minor: i64,
    pub current_balance_minor: i64,
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for BankAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            currency: CurrencyCode::try_from(model.currency.as_str())?,
            initial_balance: Money::new(model.initial_balance_minor),
            current_balance: Money::new(model.current_balance_minor),
            owner_id: model.owner_id,
        })
    }
}
