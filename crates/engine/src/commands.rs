//! Command structs for engine operations.
//!
//! Create commands carry every field of the new record. Patch commands leave
//! a field untouched when it is `None`; nullable fields use
//! `Option<Option<T>>` so that an explicit clear (`Some(None)`) can be told
//! apart from an absent field.

use chrono::NaiveDate;

use crate::{Money, TransactionKind};

/// Default page size for list operations.
pub const DEFAULT_LIMIT: u64 = 100;

/// SQL binds offsets and limits as signed integers.
const MAX_BOUND: u64 = i64::MAX as u64;

/// Offset pagination over ordered lists. Both bounds are clamped to `i64::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    skip: u64,
    limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    #[must_use]
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).min(MAX_BOUND),
            limit: limit.unwrap_or(DEFAULT_LIMIT).min(MAX_BOUND),
        }
    }

    #[must_use]
    pub fn skip(&self) -> u64 {
        self.skip
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    /// Falls back to `#3B82F6` when absent.
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewCategory {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

#[derive(Clone, Debug)]
pub struct NewBudget {
    pub category_id: i32,
    pub amount: Money,
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewBudget {
    #[must_use]
    pub fn new(
        category_id: i32,
        amount: Money,
        period: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            category_id,
            amount,
            period: period.into(),
            start_date,
            end_date: None,
        }
    }

    #[must_use]
    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct BudgetPatch {
    pub category_id: Option<i32>,
    pub amount: Option<Money>,
    pub period: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl NewUser {
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            full_name: None,
        }
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<Option<String>>,
}

#[derive(Clone, Debug)]
pub struct NewBankAccount {
    pub name: String,
    /// Falls back to `USD` when absent.
    pub currency: Option<String>,
    pub initial_balance: Money,
    pub owner_id: i32,
}

impl NewBankAccount {
    #[must_use]
    pub fn new(name: impl Into<String>, owner_id: i32) -> Self {
        Self {
            name: name.into(),
            currency: None,
            initial_balance: Money::ZERO,
            owner_id,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn initial_balance(mut self, initial_balance: Money) -> Self {
        self.initial_balance = initial_balance;
        self
    }
}

/// Changing `initial_balance` shifts `current_balance` by the same delta.
#[derive(Clone, Debug, Default)]
pub struct BankAccountPatch {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub initial_balance: Option<Money>,
    pub owner_id: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub category_id: i32,
    /// Any sign; stored with the sign convention of `kind`.
    pub amount: Money,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub from_account_id: Option<i32>,
    pub to_account_id: Option<i32>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(kind: TransactionKind, category_id: i32, amount: Money, date: NaiveDate) -> Self {
        Self {
            category_id,
            amount,
            description: None,
            date,
            kind,
            from_account_id: None,
            to_account_id: None,
        }
    }

    /// Income into `account_id`.
    #[must_use]
    pub fn income(category_id: i32, amount: Money, date: NaiveDate, account_id: i32) -> Self {
        Self::new(TransactionKind::Income, category_id, amount, date).to_account(account_id)
    }

    /// Expense out of `account_id`.
    #[must_use]
    pub fn expense(category_id: i32, amount: Money, date: NaiveDate, account_id: i32) -> Self {
        Self::new(TransactionKind::Expense, category_id, amount, date).from_account(account_id)
    }

    #[must_use]
    pub fn transfer(
        category_id: i32,
        amount: Money,
        date: NaiveDate,
        from_account_id: i32,
        to_account_id: i32,
    ) -> Self {
        Self::new(TransactionKind::Transfer, category_id, amount, date)
            .from_account(from_account_id)
            .to_account(to_account_id)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn from_account(mut self, account_id: i32) -> Self {
        self.from_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn to_account(mut self, account_id: i32) -> Self {
        self.to_account_id = Some(account_id);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub category_id: Option<i32>,
    pub amount: Option<Money>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub from_account_id: Option<Option<i32>>,
    pub to_account_id: Option<Option<i32>>,
}

/// Filters for listing transactions. Both date bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub category_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let page = Page::new(None, None);
        assert_eq!(page, Page::default());
        assert_eq!(page.skip(), 0);
        assert_eq!(page.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn page_clamps_to_signed_range() {
        let page = Page::new(Some(u64::MAX), Some(u64::MAX));
        assert_eq!(page.skip(), i64::MAX as u64);
        assert_eq!(page.limit(), i64::MAX as u64);

        let page = Page::new(Some(3), Some(7));
        assert_eq!((page.skip(), page.limit()), (3, 7));
    }
}
