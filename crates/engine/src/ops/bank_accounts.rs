use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    BankAccount, BankAccountPatch, CurrencyCode, EngineError, Money, NewBankAccount, Page,
    ResultEngine, bank_accounts, transactions, util::normalize_required_text,
};

use super::{Engine, with_tx};

fn parse_currency(value: Option<&str>) -> ResultEngine<CurrencyCode> {
    match value {
        Some(code) => CurrencyCode::try_from(code),
        None => Ok(CurrencyCode::default()),
    }
}

impl Engine {
    /// Lists bank accounts by id.
    pub async fn bank_accounts(&self, page: Page) -> ResultEngine<Vec<BankAccount>> {
        let models = bank_accounts::Entity::find()
            .order_by_asc(bank_accounts::Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        models.into_iter().map(BankAccount::try_from).collect()
    }

    pub async fn bank_account(&self, account_id: i32) -> ResultEngine<BankAccount> {
        let model = self
            .require_bank_account(&self.database, account_id)
            .await?;
        BankAccount::try_from(model)
    }

    /// Opens a bank account for an existing user.
    ///
    /// The current balance starts at the initial balance.
    pub async fn new_bank_account(&self, cmd: NewBankAccount) -> ResultEngine<BankAccount> {
        let name = normalize_required_text(&cmd.name, "account name")?;
        let currency = parse_currency(cmd.currency.as_deref())?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.owner_id).await?;

            let model = bank_accounts::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                currency: ActiveValue::Set(currency.to_string()),
                initial_balance_minor: ActiveValue::Set(cmd.initial_balance.cents()),
                current_balance_minor: ActiveValue::Set(cmd.initial_balance.cents()),
                owner_id: ActiveValue::Set(cmd.owner_id),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(
                account_id = model.id,
                owner_id = model.owner_id,
                initial_balance = %cmd.initial_balance,
                "bank account created"
            );
            BankAccount::try_from(model)
        })
    }

    /// Changes only the fields present in `patch`.
    ///
    /// A new initial balance moves the current balance by the same amount, so
    /// the already applied transaction effects are preserved.
    pub async fn update_bank_account(
        &self,
        account_id: i32,
        patch: BankAccountPatch,
    ) -> ResultEngine<BankAccount> {
        let name = patch
            .name
            .as_deref()
            .map(|n| normalize_required_text(n, "account name"))
            .transpose()?;
        let currency = patch
            .currency
            .as_deref()
            .map(CurrencyCode::try_from)
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_bank_account(&db_tx, account_id).await?;
            if let Some(owner_id) = patch.owner_id {
                self.require_user(&db_tx, owner_id).await?;
            }

            let mut model: bank_accounts::ActiveModel = current.clone().into();
            if let Some(name) = name {
                model.name = ActiveValue::Set(name);
            }
            if let Some(currency) = currency {
                model.currency = ActiveValue::Set(currency.to_string());
            }
            if let Some(owner_id) = patch.owner_id {
                model.owner_id = ActiveValue::Set(owner_id);
            }
            if let Some(initial) = patch.initial_balance {
                let shift = initial - Money::new(current.initial_balance_minor);
                model.initial_balance_minor = ActiveValue::Set(initial.cents());
                model.current_balance_minor =
                    ActiveValue::Set((Money::new(current.current_balance_minor) + shift).cents());
            }

            let model = if model.is_changed() {
                model.update(&db_tx).await?
            } else {
                current
            };
            BankAccount::try_from(model)
        })
    }

    /// Closes an account that no transaction references.
    pub async fn delete_bank_account(&self, account_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_bank_account(&db_tx, account_id).await?;

            let referencing = transactions::Entity::find()
                .filter(
                    Condition::any()
                        .add(transactions::Column::FromAccountId.eq(account_id))
                        .add(transactions::Column::ToAccountId.eq(account_id)),
                )
                .count(&db_tx)
                .await?;
            if referencing > 0 {
                return Err(EngineError::Conflict(format!(
                    "Bank account is used by {referencing} transaction(s)"
                )));
            }

            bank_accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(account_id, "bank account deleted");
            Ok(())
        })
    }

    pub(super) async fn require_bank_account<C>(
        &self,
        conn: &C,
        account_id: i32,
    ) -> ResultEngine<bank_accounts::Model>
    where
        C: ConnectionTrait,
    {
        bank_accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::not_found("Bank account"))
    }
}
