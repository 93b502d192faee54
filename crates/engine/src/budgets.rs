//! Budgets: planned spending ceilings per category and period.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: i32,
    pub category_id: i32,
    /// Planned ceiling, never negative.
    pub amount: Money,
    /// Free-form label such as `monthly` or `yearly`.
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Budget {
    /// Returns `true` if `date` falls inside `[start_date, end_date]`.
    ///
    /// A budget without `end_date` is open-ended.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.is_none_or(|end| date <= end)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category_id: i32,
    pub amount_minor: i64,
    pub period: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            amount: Money::new(model.amount_minor),
            period: model.period,
            start_date: model.start_date,
            end_date: model.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(end_date: Option<NaiveDate>) -> Budget {
        Budget {
            id: 1,
            category_id: 1,
            amount: Money::new(60_000),
            period: "monthly".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date,
        }
    }

    #[test]
    fn covers_is_inclusive_on_both_ends() {
        let b = budget(NaiveDate::from_ymd_opt(2024, 3, 31));
        assert!(b.covers(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(b.covers(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!b.covers(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!b.covers(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn open_ended_budget_covers_the_future() {
        let b = budget(None);
        assert!(b.covers(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }
}
