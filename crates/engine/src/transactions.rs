//! Transaction primitives.
//!
//! A `Transaction` records one monetary event. Its effect on bank account
//! balances is derived from its kind, amount and accounts; see
//! [`effects`](crate::effects).

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money entering `to_account`.
    Income,
    /// Money leaving `from_account`.
    Expense,
    /// Money moving from `from_account` to `to_account`.
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::validation(format!(
                "Invalid transaction type: {other}. Must be 'income', 'expense', or 'transfer'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: i32,
    pub category_id: i32,
    /// Signed amount: positive for income and transfers, negative for
    /// expenses.
    pub amount: Money,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub from_account_id: Option<i32>,
    pub to_account_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category_id: i32,
    pub amount_minor: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub date: Date,
    pub kind: String,
    pub from_account_id: Option<i32>,
    pub to_account_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    /// Builds a full active model. An `id` of 0 marks a row not yet inserted.
    fn from(tx: &Transaction) -> Self {
        Self {
            id: if tx.id == 0 {
                ActiveValue::NotSet
            } else {
                ActiveValue::Unchanged(tx.id)
            },
            category_id: ActiveValue::Set(tx.category_id),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            description: ActiveValue::Set(tx.description.clone()),
            date: ActiveValue::Set(tx.date),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            from_account_id: ActiveValue::Set(tx.from_account_id),
            to_account_id: ActiveValue::Set(tx.to_account_id),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            category_id: model.category_id,
            amount: Money::new(model.amount_minor),
            description: model.description,
            date: model.date,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            from_account_id: model.from_account_id,
            to_account_id: model.to_account_id,
        })
    }
}
