//! JSON wire types of the Family Money HTTP API.
//!
//! Amounts are plain JSON numbers in major units (e.g. `12.5`). Dates are
//! ISO `YYYY-MM-DD` strings.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes a field that distinguishes "absent" from explicit `null`.
///
/// Combined with `#[serde(default)]`: absent → `None`, `null` →
/// `Some(None)`, value → `Some(Some(value))`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `?skip=&limit=` query string shared by every list endpoint.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Body of a successful `DELETE`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
        /// Display color, `#3B82F6` when omitted.
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub description: Option<Option<String>>,
        pub color: Option<String>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub icon: Option<Option<String>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub color: String,
        pub icon: Option<String>,
    }
}

pub mod budget {
    use super::*;
    use crate::category::Category;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category_id: i32,
        pub amount: f64,
        /// Free-form period label (`monthly`, `yearly`, ...).
        pub period: String,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub category_id: Option<i32>,
        pub amount: Option<f64>,
        pub period: Option<String>,
        pub start_date: Option<NaiveDate>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub end_date: Option<Option<NaiveDate>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Budget {
        pub id: i32,
        pub category_id: i32,
        pub amount: f64,
        pub period: String,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub category: Option<Category>,
    }

    /// Spending of a budget's category against its ceiling.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetStatus {
        pub budget: Budget,
        pub spent: f64,
        pub remaining: f64,
        /// `None` when the budget amount is zero.
        pub percentage: Option<f64>,
        pub is_over_budget: bool,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub email: String,
        pub full_name: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub email: Option<String>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub full_name: Option<Option<String>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct User {
        pub id: i32,
        pub username: String,
        pub email: String,
        pub full_name: Option<String>,
    }
}

pub mod bank_account {
    use super::*;

    /// Payload for a new bank account.
    ///
    /// The current balance always starts equal to `initial_balance`; a
    /// `current_balance` key in the request body is ignored.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountNew {
        pub name: String,
        /// ISO 4217 code, `USD` when omitted.
        pub currency: Option<String>,
        pub initial_balance: Option<f64>,
        pub owner_id: i32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BankAccountUpdate {
        pub name: Option<String>,
        pub currency: Option<String>,
        pub initial_balance: Option<f64>,
        pub owner_id: Option<i32>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BankAccount {
        pub id: i32,
        pub name: String,
        pub currency: String,
        pub initial_balance: f64,
        pub current_balance: f64,
        pub owner_id: i32,
    }

    /// An account whose stored balance disagrees with its transaction history.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BalanceDrift {
        pub account_id: i32,
        pub name: String,
        pub stored_balance: f64,
        pub expected_balance: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BalanceCheck {
        pub consistent: bool,
        pub drifts: Vec<BalanceDrift>,
    }
}

pub mod transaction {
    use super::*;
    use crate::category::Category;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub category_id: i32,
        pub amount: f64,
        pub description: Option<String>,
        pub date: NaiveDate,
        /// One of `income`, `expense`, `transfer`.
        #[serde(rename = "type")]
        pub kind: String,
        pub from_account_id: Option<i32>,
        pub to_account_id: Option<i32>,
    }

    /// Partial update. Nullable fields accept an explicit `null` to clear them.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub category_id: Option<i32>,
        pub amount: Option<f64>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub description: Option<Option<String>>,
        pub date: Option<NaiveDate>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub from_account_id: Option<Option<i32>>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub to_account_id: Option<Option<i32>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Transaction {
        pub id: i32,
        pub category_id: i32,
        pub amount: f64,
        pub description: Option<String>,
        pub date: NaiveDate,
        #[serde(rename = "type")]
        pub kind: String,
        pub from_account_id: Option<i32>,
        pub to_account_id: Option<i32>,
        pub category: Option<Category>,
    }

    /// Query string of `GET /api/transactions/`.
    ///
    /// `start_date` and `end_date` are both inclusive.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub skip: Option<u64>,
        pub limit: Option<u64>,
        pub category_id: Option<i32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategorySpending {
        pub category_id: i32,
        pub name: Option<String>,
        pub color: Option<String>,
        pub total: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Summary {
        pub total_budgeted: f64,
        pub total_income: f64,
        pub total_spent: f64,
        pub net: f64,
        pub spending_by_category: Vec<CategorySpending>,
    }
}
