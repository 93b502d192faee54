use sea_orm::{
    ActiveValue, ConnectionTrait, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    Budget, BudgetPatch, Category, EngineError, Money, NewBudget, Page, ResultEngine, budgets,
    categories, util::normalize_required_text,
};

use super::{Engine, with_tx};

fn ensure_budget_amount(amount: Money) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::validation("budget amount must not be negative"));
    }
    Ok(())
}

impl Engine {
    /// Lists budgets by id, each with its category.
    pub async fn budgets(&self, page: Page) -> ResultEngine<Vec<(Budget, Option<Category>)>> {
        let rows = budgets::Entity::find()
            .find_also_related(categories::Entity)
            .order_by_asc(budgets::Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(budget, category)| (Budget::from(budget), category.map(Category::from)))
            .collect())
    }

    /// Returns a single budget with its category.
    pub async fn budget(&self, budget_id: i32) -> ResultEngine<(Budget, Option<Category>)> {
        let (budget, category) = budgets::Entity::find_by_id(budget_id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::not_found("Budget"))?;
        Ok((Budget::from(budget), category.map(Category::from)))
    }

    /// Adds a spending ceiling for an existing category.
    pub async fn new_budget(&self, cmd: NewBudget) -> ResultEngine<(Budget, Category)> {
        ensure_budget_amount(cmd.amount)?;
        let period = normalize_required_text(&cmd.period, "budget period")?;

        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, cmd.category_id).await?;

            let model = budgets::ActiveModel {
                id: ActiveValue::NotSet,
                category_id: ActiveValue::Set(cmd.category_id),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                period: ActiveValue::Set(period),
                start_date: ActiveValue::Set(cmd.start_date),
                end_date: ActiveValue::Set(cmd.end_date),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(
                budget_id = model.id,
                category_id = model.category_id,
                "budget created"
            );
            Ok((Budget::from(model), Category::from(category)))
        })
    }

    /// Changes only the fields present in `patch`.
    pub async fn update_budget(
        &self,
        budget_id: i32,
        patch: BudgetPatch,
    ) -> ResultEngine<(Budget, Category)> {
        if let Some(amount) = patch.amount {
            ensure_budget_amount(amount)?;
        }
        let period = patch
            .period
            .as_deref()
            .map(|p| normalize_required_text(p, "budget period"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_budget(&db_tx, budget_id).await?;
            let category_id = patch.category_id.unwrap_or(current.category_id);
            let category = self.require_category(&db_tx, category_id).await?;

            let mut model: budgets::ActiveModel = current.clone().into();
            if patch.category_id.is_some() {
                model.category_id = ActiveValue::Set(category_id);
            }
            if let Some(amount) = patch.amount {
                model.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(period) = period {
                model.period = ActiveValue::Set(period);
            }
            if let Some(start_date) = patch.start_date {
                model.start_date = ActiveValue::Set(start_date);
            }
            if let Some(end_date) = patch.end_date {
                model.end_date = ActiveValue::Set(end_date);
            }

            let model = if model.is_changed() {
                model.update(&db_tx).await?
            } else {
                current
            };
            Ok((Budget::from(model), Category::from(category)))
        })
    }

    pub async fn delete_budget(&self, budget_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id).await?;
            budgets::Entity::delete_by_id(budget_id).exec(&db_tx).await?;
            tracing::info!(budget_id, "budget deleted");
            Ok(())
        })
    }

    pub(super) async fn require_budget<C>(
        &self,
        conn: &C,
        budget_id: i32,
    ) -> ResultEngine<budgets::Model>
    where
        C: ConnectionTrait,
    {
        budgets::Entity::find_by_id(budget_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::not_found("Budget"))
    }
}
