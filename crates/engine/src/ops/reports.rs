use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    Budget, Category, Money, ResultEngine, TransactionKind, budgets, categories, transactions,
};

use super::Engine;

/// How much of a budget has been spent.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub category: Option<Category>,
    /// Magnitude of the expenses in the budget's category and date range.
    pub spent: Money,
    pub remaining: Money,
    /// `None` when the budget amount is zero.
    pub percentage: Option<f64>,
    pub is_over_budget: bool,
}

impl BudgetStatus {
    fn new(budget: Budget, category: Option<Category>, spent: Money) -> Self {
        let percentage = if budget.amount.is_zero() {
            None
        } else {
            Some(spent.cents() as f64 * 100.0 / budget.amount.cents() as f64)
        };
        Self {
            remaining: budget.amount - spent,
            is_over_budget: spent > budget.amount,
            percentage,
            spent,
            category,
            budget,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySpending {
    pub category_id: i32,
    pub name: Option<String>,
    pub color: Option<String>,
    /// Magnitude of the expenses.
    pub total: Money,
}

/// Household totals over an optional date range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub total_budgeted: Money,
    pub total_income: Money,
    pub total_spent: Money,
    pub net: Money,
    /// Largest spending first.
    pub spending_by_category: Vec<CategorySpending>,
}

async fn load_transactions<C>(
    conn: &C,
    kind: TransactionKind,
    category_id: Option<i32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ResultEngine<Vec<transactions::Model>>
where
    C: ConnectionTrait,
{
    let mut query =
        transactions::Entity::find().filter(transactions::Column::Kind.eq(kind.as_str()));
    if let Some(category_id) = category_id {
        query = query.filter(transactions::Column::CategoryId.eq(category_id));
    }
    if let Some(start) = start {
        query = query.filter(transactions::Column::Date.gte(start));
    }
    if let Some(end) = end {
        query = query.filter(transactions::Column::Date.lte(end));
    }
    Ok(query.all(conn).await?)
}

fn magnitude(models: &[transactions::Model]) -> Money {
    models
        .iter()
        .map(|m| Money::new(m.amount_minor))
        .sum::<Money>()
        .abs()
}

impl Engine {
    /// Spending against every budget, ordered by budget id.
    pub async fn budget_statuses(&self) -> ResultEngine<Vec<BudgetStatus>> {
        let rows = budgets::Entity::find()
            .find_also_related(categories::Entity)
            .order_by_asc(budgets::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (budget, category) in rows {
            out.push(self.status_of(budget, category).await?);
        }
        Ok(out)
    }

    pub async fn budget_status(&self, budget_id: i32) -> ResultEngine<BudgetStatus> {
        let budget = self.require_budget(&self.database, budget_id).await?;
        let category = categories::Entity::find_by_id(budget.category_id)
            .one(&self.database)
            .await?;
        self.status_of(budget, category).await
    }

    async fn status_of(
        &self,
        budget: budgets::Model,
        category: Option<categories::Model>,
    ) -> ResultEngine<BudgetStatus> {
        let budget = Budget::from(budget);
        let expenses = load_transactions(
            &self.database,
            TransactionKind::Expense,
            Some(budget.category_id),
            Some(budget.start_date),
            budget.end_date,
        )
        .await?;
        let spent = magnitude(&expenses);
        Ok(BudgetStatus::new(
            budget,
            category.map(Category::from),
            spent,
        ))
    }

    /// Totals of budgets, income and spending.
    ///
    /// Both bounds are inclusive; transfers move money between accounts and
    /// count neither as income nor as spending.
    pub async fn summary(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ResultEngine<Summary> {
        let total_budgeted: Money = budgets::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|b| Money::new(b.amount_minor))
            .sum();

        let incomes = load_transactions(
            &self.database,
            TransactionKind::Income,
            None,
            start_date,
            end_date,
        )
        .await?;
        let expenses = load_transactions(
            &self.database,
            TransactionKind::Expense,
            None,
            start_date,
            end_date,
        )
        .await?;

        let total_income = magnitude(&incomes);
        let total_spent = magnitude(&expenses);

        let mut per_category: HashMap<i32, Money> = HashMap::new();
        for expense in &expenses {
            *per_category.entry(expense.category_id).or_default() +=
                Money::new(expense.amount_minor).abs();
        }

        let names: HashMap<i32, categories::Model> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(per_category.keys().copied()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut spending_by_category: Vec<CategorySpending> = per_category
            .into_iter()
            .map(|(category_id, total)| {
                let category = names.get(&category_id);
                CategorySpending {
                    category_id,
                    name: category.map(|c| c.name.clone()),
                    color: category.map(|c| c.color.clone()),
                    total,
                }
            })
            .collect();
        spending_by_category
            .sort_by(|a, b| b.total.cmp(&a.total).then(a.category_id.cmp(&b.category_id)));

        Ok(Summary {
            total_budgeted,
            total_income,
            total_spent,
            net: total_income - total_spent,
            spending_by_category,
        })
    }
}
