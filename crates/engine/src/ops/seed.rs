use chrono::{Datelike, Days, NaiveDate};
use sea_orm::{PaginatorTrait, prelude::*};

use crate::{
    Money, NewBankAccount, NewBudget, NewCategory, NewTransaction, NewUser, ResultEngine,
    categories, users,
};

use super::Engine;

const CATEGORIES: [(&str, &str, &str, &str); 6] = [
    ("Groceries", "Food and household items", "#3B82F6", "🛒"),
    (
        "Transportation",
        "Gas, public transport, car maintenance",
        "#10B981",
        "🚗",
    ),
    ("Utilities", "Electricity, water, internet", "#F59E0B", "💡"),
    ("Entertainment", "Movies, dining out, hobbies", "#EF4444", "🎬"),
    ("Healthcare", "Medical expenses, insurance", "#8B5CF6", "🏥"),
    ("Income", "Salary and other income", "#10B981", "💰"),
];

/// `(category index, cents)` of the monthly budgets.
const BUDGETS: [(usize, i64); 4] = [(0, 60_000), (1, 30_000), (2, 20_000), (3, 15_000)];

/// `(category index, cents, description, day offset)` of the month's expenses.
const EXPENSES: [(usize, i64, &str, u64); 9] = [
    (0, -15_000, "Weekly groceries", 2),
    (0, -12_000, "Weekly groceries", 9),
    (0, -18_000, "Weekly groceries", 16),
    (1, -6_000, "Gas", 5),
    (1, -4_500, "Gas", 18),
    (2, -8_500, "Electricity", 10),
    (2, -4_500, "Internet", 10),
    (3, -7_500, "Dinner out", 7),
    (3, -3_000, "Movie tickets", 14),
];

fn offset(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

impl Engine {
    /// Fills an empty database with a demo household for the month of
    /// `today`.
    ///
    /// Returns `false` without writing anything when categories or users
    /// already exist. Sample transactions go through John's checking account
    /// so that balances match the history.
    pub async fn seed_demo_data(&self, today: NaiveDate) -> ResultEngine<bool> {
        let existing = categories::Entity::find().count(&self.database).await?
            + users::Entity::find().count(&self.database).await?;
        if existing > 0 {
            tracing::info!("database already has data, skipping seed");
            return Ok(false);
        }

        let john = self
            .new_user(NewUser::new("john_doe", "john@example.com").full_name("John Doe"))
            .await?;
        let jane = self
            .new_user(NewUser::new("jane_smith", "jane@example.com").full_name("Jane Smith"))
            .await?;

        let mut category_ids = Vec::with_capacity(CATEGORIES.len());
        for (name, description, color, icon) in CATEGORIES {
            let category = self
                .new_category(
                    NewCategory::new(name)
                        .description(description)
                        .color(color)
                        .icon(icon),
                )
                .await?;
            category_ids.push(category.id);
        }

        let start_of_month = today.with_day(1).unwrap_or(today);
        for (category, cents) in BUDGETS {
            self.new_budget(NewBudget::new(
                category_ids[category],
                Money::new(cents),
                "monthly",
                start_of_month,
            ))
            .await?;
        }

        let accounts = [
            ("John's Checking", "USD", 500_000, john.id),
            ("John's Savings", "USD", 1_000_000, john.id),
            ("Jane's Checking", "USD", 300_000, jane.id),
            ("Jane's EUR Account", "EUR", 200_000, jane.id),
        ];
        let mut account_ids = Vec::with_capacity(accounts.len());
        for (name, currency, cents, owner_id) in accounts {
            let account = self
                .new_bank_account(
                    NewBankAccount::new(name, owner_id)
                        .currency(currency)
                        .initial_balance(Money::new(cents)),
                )
                .await?;
            account_ids.push(account.id);
        }
        let checking = account_ids[0];

        self.new_transaction(
            NewTransaction::income(category_ids[5], Money::new(500_000), start_of_month, checking)
                .description("Salary"),
        )
        .await?;
        for (category, cents, description, days) in EXPENSES {
            self.new_transaction(
                NewTransaction::expense(
                    category_ids[category],
                    Money::new(cents),
                    offset(start_of_month, days),
                    checking,
                )
                .description(description),
            )
            .await?;
        }

        tracing::info!(
            users = 2,
            categories = category_ids.len(),
            budgets = BUDGETS.len(),
            accounts = account_ids.len(),
            transactions = EXPENSES.len() + 1,
            "demo data seeded"
        );
        Ok(true)
    }
}
