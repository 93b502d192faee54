use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    Category, EngineError, NewTransaction, Page, ResultEngine, Transaction, TransactionFilter,
    TransactionPatch, categories,
    effects::{Direction, net_effects, normalize_amount, validate_accounts},
    transactions,
    util::{apply_optional_text_patch, normalize_optional_text},
};

use super::{Engine, balances::apply_effects, with_tx};

trait ApplyTransactionFilter: QueryFilter + Sized {
    fn apply_transaction_filter(self, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTransactionFilter for T
where
    T: QueryFilter + Sized,
{
    fn apply_transaction_filter(mut self, filter: &TransactionFilter) -> Self {
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(start) = filter.start_date {
            self = self.filter(transactions::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            self = self.filter(transactions::Column::Date.lte(end));
        }
        self
    }
}

fn to_view(
    (model, category): (transactions::Model, Option<categories::Model>),
) -> ResultEngine<(Transaction, Option<Category>)> {
    Ok((
        Transaction::try_from(model)?,
        category.map(Category::from),
    ))
}

impl Engine {
    /// Lists transactions, newest first.
    ///
    /// Both date bounds of `filter` are inclusive.
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> ResultEngine<Vec<(Transaction, Option<Category>)>> {
        let rows = transactions::Entity::find()
            .apply_transaction_filter(filter)
            .find_also_related(categories::Entity)
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        rows.into_iter().map(to_view).collect()
    }

    pub async fn transaction(
        &self,
        transaction_id: i32,
    ) -> ResultEngine<(Transaction, Option<Category>)> {
        let row = transactions::Entity::find_by_id(transaction_id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::not_found("Transaction"))?;
        to_view(row)
    }

    /// Records a transaction and applies its effect on the referenced
    /// accounts.
    ///
    /// The amount is stored with the sign convention of its kind. Nothing is
    /// written when a rule is broken or a referenced entity is missing.
    pub async fn new_transaction(
        &self,
        cmd: NewTransaction,
    ) -> ResultEngine<(Transaction, Category)> {
        validate_accounts(cmd.kind, cmd.from_account_id, cmd.to_account_id)?;

        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, cmd.category_id).await?;
            self.require_accounts(&db_tx, cmd.from_account_id, cmd.to_account_id)
                .await?;

            let mut tx = Transaction {
                id: 0,
                category_id: cmd.category_id,
                amount: normalize_amount(cmd.kind, cmd.amount),
                description: normalize_optional_text(cmd.description.as_deref()),
                date: cmd.date,
                kind: cmd.kind,
                from_account_id: cmd.from_account_id,
                to_account_id: cmd.to_account_id,
            };
            let model: transactions::ActiveModel = (&tx).into();
            tx.id = model.insert(&db_tx).await?.id;

            apply_effects(&db_tx, &net_effects(tx.effects(Direction::Apply))).await?;

            tracing::info!(
                transaction_id = tx.id,
                kind = %tx.kind,
                amount = %tx.amount,
                "transaction created"
            );
            Ok((tx, Category::from(category)))
        })
    }

    /// Applies `patch` on top of the stored transaction.
    ///
    /// The stored effect is reversed and the merged record's effect applied
    /// in the same database transaction, so balances never count the
    /// transaction twice.
    pub async fn update_transaction(
        &self,
        transaction_id: i32,
        patch: TransactionPatch,
    ) -> ResultEngine<(Transaction, Category)> {
        with_tx!(self, |db_tx| {
            let stored = Transaction::try_from(
                self.require_transaction(&db_tx, transaction_id).await?,
            )?;

            let kind = patch.kind.unwrap_or(stored.kind);
            let from_account_id = patch.from_account_id.unwrap_or(stored.from_account_id);
            let to_account_id = patch.to_account_id.unwrap_or(stored.to_account_id);
            validate_accounts(kind, from_account_id, to_account_id)?;

            let category_id = patch.category_id.unwrap_or(stored.category_id);
            let category = self.require_category(&db_tx, category_id).await?;
            if patch.from_account_id.is_some() || patch.to_account_id.is_some() {
                self.require_accounts(&db_tx, from_account_id, to_account_id)
                    .await?;
            }

            let merged = Transaction {
                id: stored.id,
                category_id,
                amount: normalize_amount(kind, patch.amount.unwrap_or(stored.amount)),
                description: apply_optional_text_patch(
                    stored.description.clone(),
                    patch.description.as_ref().map(Option::as_deref),
                ),
                date: patch.date.unwrap_or(stored.date),
                kind,
                from_account_id,
                to_account_id,
            };

            let model: transactions::ActiveModel = (&merged).into();
            model.update(&db_tx).await?;

            let net = net_effects(
                stored
                    .effects(Direction::Reverse)
                    .into_iter()
                    .chain(merged.effects(Direction::Apply)),
            );
            apply_effects(&db_tx, &net).await?;

            tracing::info!(
                transaction_id,
                kind = %merged.kind,
                amount = %merged.amount,
                "transaction updated"
            );
            Ok((merged, Category::from(category)))
        })
    }

    /// Reverses the stored effect and removes the transaction.
    pub async fn delete_transaction(&self, transaction_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let stored = Transaction::try_from(
                self.require_transaction(&db_tx, transaction_id).await?,
            )?;

            apply_effects(&db_tx, &net_effects(stored.effects(Direction::Reverse))).await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(transaction_id, "transaction deleted");
            Ok(())
        })
    }

    async fn require_transaction<C>(
        &self,
        conn: &C,
        transaction_id: i32,
    ) -> ResultEngine<transactions::Model>
    where
        C: ConnectionTrait,
    {
        transactions::Entity::find_by_id(transaction_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::not_found("Transaction"))
    }

    async fn require_accounts<C>(
        &self,
        conn: &C,
        from_account_id: Option<i32>,
        to_account_id: Option<i32>,
    ) -> ResultEngine<()>
    where
        C: ConnectionTrait,
    {
        for account_id in [from_account_id, to_account_id].into_iter().flatten() {
            self.require_bank_account(conn, account_id).await?;
        }
        Ok(())
    }
}
