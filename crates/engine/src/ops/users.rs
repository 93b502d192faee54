use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, NewUser, Page, ResultEngine, User, UserPatch, bank_accounts, users,
    util::{apply_optional_text_patch, normalize_email, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists users by id.
    pub async fn users(&self, page: Page) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        let model = self.require_user(&self.database, user_id).await?;
        Ok(User::from(model))
    }

    /// Registers a household member. Usernames are unique.
    pub async fn new_user(&self, cmd: NewUser) -> ResultEngine<User> {
        let username = normalize_required_text(&cmd.username, "username")?;
        let email = normalize_email(&cmd.email)?;

        with_tx!(self, |db_tx| {
            self.ensure_username_free(&db_tx, &username, None).await?;

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username),
                email: ActiveValue::Set(email),
                full_name: ActiveValue::Set(
                    cmd.full_name
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(ToString::to_string),
                ),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(user_id = model.id, username = %model.username, "user created");
            Ok(User::from(model))
        })
    }

    /// Changes only the fields present in `patch`.
    pub async fn update_user(&self, user_id: i32, patch: UserPatch) -> ResultEngine<User> {
        let username = patch
            .username
            .as_deref()
            .map(|u| normalize_required_text(u, "username"))
            .transpose()?;
        let email = patch.email.as_deref().map(normalize_email).transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_user(&db_tx, user_id).await?;
            let mut model: users::ActiveModel = current.clone().into();

            if let Some(username) = username {
                self.ensure_username_free(&db_tx, &username, Some(user_id))
                    .await?;
                model.username = ActiveValue::Set(username);
            }
            if let Some(email) = email {
                model.email = ActiveValue::Set(email);
            }
            if patch.full_name.is_some() {
                model.full_name = ActiveValue::Set(apply_optional_text_patch(
                    current.full_name.clone(),
                    patch.full_name.as_ref().map(Option::as_deref),
                ));
            }

            let model = if model.is_changed() {
                model.update(&db_tx).await?
            } else {
                current
            };
            Ok(User::from(model))
        })
    }

    /// Removes a user that owns no bank accounts.
    pub async fn delete_user(&self, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let owned = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::OwnerId.eq(user_id))
                .count(&db_tx)
                .await?;
            if owned > 0 {
                return Err(EngineError::Conflict(format!(
                    "User owns {owned} bank account(s)"
                )));
            }

            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            tracing::info!(user_id, "user deleted");
            Ok(())
        })
    }

    pub(super) async fn require_user<C>(&self, conn: &C, user_id: i32) -> ResultEngine<users::Model>
    where
        C: ConnectionTrait,
    {
        users::Entity::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::not_found("User"))
    }

    async fn ensure_username_free<C>(
        &self,
        conn: &C,
        username: &str,
        except: Option<i32>,
    ) -> ResultEngine<()>
    where
        C: ConnectionTrait,
    {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.one(conn).await?.is_some() {
            return Err(EngineError::Conflict(format!(
                "Username '{username}' already exists"
            )));
        }
        Ok(())
    }
}
