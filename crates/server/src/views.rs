//! Conversions from engine types to wire views.

use api_types::{
    bank_account::{BalanceCheck, BalanceDrift, BankAccount},
    budget::{Budget, BudgetStatus},
    category::Category,
    summary::{CategorySpending, Summary},
    transaction::Transaction,
    user::User,
};
use engine::Money;

use crate::ServerError;

/// Reads a wire amount into exact cents.
pub(crate) fn money(value: f64) -> Result<Money, ServerError> {
    Ok(Money::from_major(value)?)
}

pub(crate) fn category(category: engine::Category) -> Category {
    Category {
        id: category.id,
        name: category.name,
        description: category.description,
        color: category.color,
        icon: category.icon,
    }
}

pub(crate) fn budget(budget: engine::Budget, category: Option<engine::Category>) -> Budget {
    Budget {
        id: budget.id,
        category_id: budget.category_id,
        amount: budget.amount.to_major(),
        period: budget.period,
        start_date: budget.start_date,
        end_date: budget.end_date,
        category: category.map(self::category),
    }
}

pub(crate) fn budget_status(status: engine::BudgetStatus) -> BudgetStatus {
    BudgetStatus {
        budget: budget(status.budget, status.category),
        spent: status.spent.to_major(),
        remaining: status.remaining.to_major(),
        percentage: status.percentage,
        is_over_budget: status.is_over_budget,
    }
}

pub(crate) fn user(user: engine::User) -> User {
    User {
        id: user.id,
        username: user.username,
        email: user.email,
        full_name: user.full_name,
    }
}

pub(crate) fn bank_account(account: engine::BankAccount) -> BankAccount {
    BankAccount {
        id: account.id,
        name: account.name,
        currency: account.currency.to_string(),
        initial_balance: account.initial_balance.to_major(),
        current_balance: account.current_balance.to_major(),
        owner_id: account.owner_id,
    }
}

pub(crate) fn balance_check(drifts: Vec<engine::BalanceDrift>) -> BalanceCheck {
    BalanceCheck {
        consistent: drifts.is_empty(),
        drifts: drifts
            .into_iter()
            .map(|drift| BalanceDrift {
                account_id: drift.account_id,
                name: drift.name,
                stored_balance: drift.stored_balance.to_major(),
                expected_balance: drift.expected_balance.to_major(),
            })
            .collect(),
    }
}

pub(crate) fn transaction(
    tx: engine::Transaction,
    category: Option<engine::Category>,
) -> Transaction {
    Transaction {
        id: tx.id,
        category_id: tx.category_id,
        amount: tx.amount.to_major(),
        description: tx.description,
        date: tx.date,
        kind: tx.kind.to_string(),
        from_account_id: tx.from_account_id,
        to_account_id: tx.to_account_id,
        category: category.map(self::category),
    }
}

pub(crate) fn summary(summary: engine::Summary) -> Summary {
    Summary {
        total_budgeted: summary.total_budgeted.to_major(),
        total_income: summary.total_income.to_major(),
        total_spent: summary.total_spent.to_major(),
        net: summary.net.to_major(),
        spending_by_category: summary
            .spending_by_category
            .into_iter()
            .map(|spending| CategorySpending {
                category_id: spending.category_id,
                name: spending.name,
                color: spending.color,
                total: spending.total.to_major(),
            })
            .collect(),
    }
}
