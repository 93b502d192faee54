use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Category, CategoryPatch, EngineError, NewCategory, Page, ResultEngine, budgets, categories,
    categories::DEFAULT_COLOR, transactions,
    util::{apply_optional_text_patch, name_key, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists categories by id.
    pub async fn categories(&self, page: Page) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    /// Returns a single category.
    pub async fn category(&self, category_id: i32) -> ResultEngine<Category> {
        let model = self.require_category(&self.database, category_id).await?;
        Ok(Category::from(model))
    }

    /// Adds a new category.
    ///
    /// Names are unique regardless of case.
    pub async fn new_category(&self, cmd: NewCategory) -> ResultEngine<Category> {
        let name = normalize_required_text(&cmd.name, "category name")?;
        let color = cmd
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLOR)
            .to_string();

        with_tx!(self, |db_tx| {
            let name_norm = name_key(&name);
            self.ensure_category_name_free(&db_tx, &name, &name_norm, None)
                .await?;

            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
                color: ActiveValue::Set(color),
                icon: ActiveValue::Set(normalize_optional_text(cmd.icon.as_deref())),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(category_id = model.id, name = %model.name, "category created");
            Ok(Category::from(model))
        })
    }

    /// Changes only the fields present in `patch`.
    pub async fn update_category(
        &self,
        category_id: i32,
        patch: CategoryPatch,
    ) -> ResultEngine<Category> {
        let name = patch
            .name
            .as_deref()
            .map(|n| normalize_required_text(n, "category name"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_category(&db_tx, category_id).await?;
            let mut model: categories::ActiveModel = current.clone().into();

            if let Some(name) = name {
                let name_norm = name_key(&name);
                self.ensure_category_name_free(&db_tx, &name, &name_norm, Some(category_id))
                    .await?;
                model.name = ActiveValue::Set(name);
                model.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(color) = patch.color {
                let color = color.trim();
                model.color = ActiveValue::Set(if color.is_empty() {
                    DEFAULT_COLOR.to_string()
                } else {
                    color.to_string()
                });
            }
            if patch.description.is_some() {
                model.description = ActiveValue::Set(apply_optional_text_patch(
                    current.description.clone(),
                    patch.description.as_ref().map(Option::as_deref),
                ));
            }
            if patch.icon.is_some() {
                model.icon = ActiveValue::Set(apply_optional_text_patch(
                    current.icon.clone(),
                    patch.icon.as_ref().map(Option::as_deref),
                ));
            }

            let model = if model.is_changed() {
                model.update(&db_tx).await?
            } else {
                current
            };
            Ok(Category::from(model))
        })
    }

    /// Deletes a category together with its budgets.
    ///
    /// Fails with [`EngineError::Conflict`] while transactions still
    /// reference the category.
    pub async fn delete_category(&self, category_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id).await?;

            let referencing = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if referencing > 0 {
                return Err(EngineError::Conflict(format!(
                    "Category is used by {referencing} transaction(s)"
                )));
            }

            let budgets = budgets::Entity::delete_many()
                .filter(budgets::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(
                category_id,
                budgets_removed = budgets.rows_affected,
                "category deleted"
            );
            Ok(())
        })
    }

    pub(super) async fn require_category<C>(
        &self,
        conn: &C,
        category_id: i32,
    ) -> ResultEngine<categories::Model>
    where
        C: ConnectionTrait,
    {
        categories::Entity::find_by_id(category_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::not_found("Category"))
    }

    async fn ensure_category_name_free<C>(
        &self,
        conn: &C,
        name: &str,
        name_norm: &str,
        except: Option<i32>,
    ) -> ResultEngine<()>
    where
        C: ConnectionTrait,
    {
        let mut query =
            categories::Entity::find().filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(conn).await?.is_some() {
            return Err(EngineError::Conflict(format!(
                "Category '{name}' already exists"
            )));
        }
        Ok(())
    }
}
