use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    BankAccountPatch, BudgetPatch, CategoryPatch, Engine, EngineError, Money, NewBankAccount,
    NewBudget, NewCategory, NewTransaction, NewUser, Page, TransactionFilter, UserPatch,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn category_defaults_and_case_insensitive_names() {
    let engine = engine_with_db().await;

    let groceries = engine
        .new_category(NewCategory::new("  Groceries ").icon("🛒"))
        .await
        .unwrap();
    assert_eq!(groceries.name, "Groceries");
    assert_eq!(groceries.color, "#3B82F6");
    assert_eq!(groceries.icon.as_deref(), Some("🛒"));

    let err = engine
        .new_category(NewCategory::new("GROCERIES"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine.new_category(NewCategory::new("   ")).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("category name must not be empty".into())
    );
}

#[tokio::test]
async fn category_patch_changes_only_given_fields() {
    let engine = engine_with_db().await;
    let category = engine
        .new_category(
            NewCategory::new("Utilities")
                .description("Electricity, water")
                .color("#F59E0B"),
        )
        .await
        .unwrap();

    let renamed = engine
        .update_category(
            category.id,
            CategoryPatch {
                name: Some("Bills".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Bills");
    assert_eq!(renamed.color, "#F59E0B");
    assert_eq!(renamed.description.as_deref(), Some("Electricity, water"));

    let cleared = engine
        .update_category(
            category.id,
            CategoryPatch {
                description: Some(None),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.name, "Bills");

    // Renaming to its own name in another case is not a collision.
    engine
        .update_category(
            category.id,
            CategoryPatch {
                name: Some("BILLS".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_entities_report_not_found() {
    let engine = engine_with_db().await;

    assert_eq!(
        engine.category(7).await.unwrap_err().to_string(),
        "Category not found"
    );
    assert_eq!(
        engine.budget(7).await.unwrap_err().to_string(),
        "Budget not found"
    );
    assert_eq!(
        engine.user(7).await.unwrap_err().to_string(),
        "User not found"
    );
    assert_eq!(
        engine.bank_account(7).await.unwrap_err().to_string(),
        "Bank account not found"
    );
    assert_eq!(
        engine.transaction(7).await.unwrap_err().to_string(),
        "Transaction not found"
    );
    assert_eq!(
        engine.delete_budget(7).await.unwrap_err(),
        EngineError::NotFound("Budget".into())
    );
    assert_eq!(
        engine
            .update_user(7, UserPatch::default())
            .await
            .unwrap_err(),
        EngineError::NotFound("User".into())
    );
}

#[tokio::test]
async fn budget_requires_existing_category_and_non_negative_amount() {
    let engine = engine_with_db().await;

    let err = engine
        .new_budget(NewBudget::new(
            42,
            Money::new(10_000),
            "monthly",
            date(2024, 3, 1),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("Category".into()));

    let category = engine
        .new_category(NewCategory::new("Groceries"))
        .await
        .unwrap();
    let err = engine
        .new_budget(NewBudget::new(
            category.id,
            Money::new(-1),
            "monthly",
            date(2024, 3, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let (budget, embedded) = engine
        .new_budget(
            NewBudget::new(category.id, Money::new(60_000), "monthly", date(2024, 3, 1))
                .end_date(date(2024, 3, 31)),
        )
        .await
        .unwrap();
    assert_eq!(embedded.id, category.id);
    assert_eq!(budget.end_date, Some(date(2024, 3, 31)));

    let err = engine
        .update_budget(
            budget.id,
            BudgetPatch {
                category_id: Some(99),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("Category".into()));

    let (updated, _) = engine
        .update_budget(
            budget.id,
            BudgetPatch {
                end_date: Some(None),
                amount: Some(Money::new(70_000)),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.end_date, None);
    assert_eq!(updated.amount, Money::new(70_000));
    assert_eq!(updated.period, "monthly");
}

#[tokio::test]
async fn users_are_unique_and_need_a_valid_email() {
    let engine = engine_with_db().await;

    let john = engine
        .new_user(NewUser::new("john_doe", "john@example.com").full_name("John Doe"))
        .await
        .unwrap();
    assert_eq!(john.full_name.as_deref(), Some("John Doe"));

    let err = engine
        .new_user(NewUser::new("john_doe", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine
        .new_user(NewUser::new("jane", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let updated = engine
        .update_user(
            john.id,
            UserPatch {
                full_name: Some(None),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.full_name, None);
    assert_eq!(updated.email, "john@example.com");
}

#[tokio::test]
async fn bank_account_currency_and_owner_rules() {
    let engine = engine_with_db().await;

    let err = engine
        .new_bank_account(NewBankAccount::new("Checking", 5))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("User".into()));

    let user = engine
        .new_user(NewUser::new("jane_smith", "jane@example.com"))
        .await
        .unwrap();

    let usd = engine
        .new_bank_account(
            NewBankAccount::new("Checking", user.id).initial_balance(Money::new(300_000)),
        )
        .await
        .unwrap();
    assert_eq!(usd.currency.code(), "USD");
    assert_eq!(usd.current_balance, Money::new(300_000));

    let eur = engine
        .new_bank_account(NewBankAccount::new("Euro", user.id).currency("eur"))
        .await
        .unwrap();
    assert_eq!(eur.currency.code(), "EUR");

    let err = engine
        .new_bank_account(NewBankAccount::new("Bad", user.id).currency("euro"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .update_bank_account(
            usd.id,
            BankAccountPatch {
                owner_id: Some(77),
                ..BankAccountPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("User".into()));
}

#[tokio::test]
async fn deletes_are_blocked_while_referenced() {
    let engine = engine_with_db().await;
    let user = engine
        .new_user(NewUser::new("alice", "alice@example.com"))
        .await
        .unwrap();
    let account = engine
        .new_bank_account(NewBankAccount::new("Checking", user.id))
        .await
        .unwrap();
    let category = engine
        .new_category(NewCategory::new("Groceries"))
        .await
        .unwrap();
    engine
        .new_budget(NewBudget::new(
            category.id,
            Money::new(60_000),
            "monthly",
            date(2024, 3, 1),
        ))
        .await
        .unwrap();
    let (tx, _) = engine
        .new_transaction(NewTransaction::expense(
            category.id,
            Money::new(1_500),
            date(2024, 3, 2),
            account.id,
        ))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_user(user.id).await.unwrap_err(),
        EngineError::Conflict(_)
    ));
    assert!(matches!(
        engine.delete_bank_account(account.id).await.unwrap_err(),
        EngineError::Conflict(_)
    ));
    assert!(matches!(
        engine.delete_category(category.id).await.unwrap_err(),
        EngineError::Conflict(_)
    ));

    engine.delete_transaction(tx.id).await.unwrap();
    engine.delete_category(category.id).await.unwrap();
    assert!(engine.budgets(Page::default()).await.unwrap().is_empty());

    engine.delete_bank_account(account.id).await.unwrap();
    engine.delete_user(user.id).await.unwrap();
    assert!(engine.users(Page::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn transaction_list_filters_and_orders_newest_first() {
    let engine = engine_with_db().await;
    let user = engine
        .new_user(NewUser::new("alice", "alice@example.com"))
        .await
        .unwrap();
    let account = engine
        .new_bank_account(NewBankAccount::new("Checking", user.id))
        .await
        .unwrap();
    let food = engine
        .new_category(NewCategory::new("Food"))
        .await
        .unwrap();
    let fun = engine.new_category(NewCategory::new("Fun")).await.unwrap();

    for (category_id, d) in [(food.id, 5), (fun.id, 10), (food.id, 15), (food.id, 20)] {
        engine
            .new_transaction(NewTransaction::expense(
                category_id,
                Money::new(1_000),
                date(2024, 3, d),
                account.id,
            ))
            .await
            .unwrap();
    }

    let all = engine
        .transactions(&TransactionFilter::default(), Page::default())
        .await
        .unwrap();
    let dates: Vec<u32> = all.iter().map(|(tx, _)| chrono::Datelike::day(&tx.date)).collect();
    assert_eq!(dates, vec![20, 15, 10, 5]);
    assert!(all.iter().all(|(_, category)| category.is_some()));

    let filtered = engine
        .transactions(
            &TransactionFilter {
                category_id: Some(food.id),
                start_date: Some(date(2024, 3, 5)),
                end_date: Some(date(2024, 3, 15)),
            },
            Page::default(),
        )
        .await
        .unwrap();
    let dates: Vec<u32> = filtered
        .iter()
        .map(|(tx, _)| chrono::Datelike::day(&tx.date))
        .collect();
    assert_eq!(dates, vec![15, 5]);

    let page = engine
        .transactions(&TransactionFilter::default(), Page::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(chrono::Datelike::day(&page[0].0.date), 15);
}
