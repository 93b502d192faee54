use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, EngineError, Money, NewBankAccount, NewCategory, NewTransaction, NewUser,
    TransactionKind, TransactionPatch,
};
use migration::MigratorTrait;

struct Fixture {
    engine: Engine,
    db: DatabaseConnection,
    category_id: i32,
    a: i32,
    b: i32,
}

async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let user = engine
        .new_user(NewUser::new("alice", "alice@example.com"))
        .await
        .unwrap();
    let category = engine
        .new_category(NewCategory::new("General"))
        .await
        .unwrap();
    let a = engine
        .new_bank_account(NewBankAccount::new("A", user.id))
        .await
        .unwrap();
    let b = engine
        .new_bank_account(NewBankAccount::new("B", user.id))
        .await
        .unwrap();

    Fixture {
        engine,
        db,
        category_id: category.id,
        a: a.id,
        b: b.id,
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn money(units: i64) -> Money {
    Money::new(units * 100)
}

async fn balance(engine: &Engine, account_id: i32) -> Money {
    engine
        .bank_account(account_id)
        .await
        .unwrap()
        .current_balance
}

async fn assert_consistent(engine: &Engine) {
    assert_eq!(engine.check_balances().await.unwrap(), vec![]);
}

#[tokio::test]
async fn income_credits_destination() {
    let f = fixture().await;

    let (tx, _) = f
        .engine
        .new_transaction(NewTransaction::income(f.category_id, money(100), day(1), f.a))
        .await
        .unwrap();

    assert_eq!(tx.amount, money(100));
    assert_eq!(balance(&f.engine, f.a).await, money(100));
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn expense_sign_is_normalized_either_way() {
    let f = fixture().await;
    f.engine
        .new_transaction(NewTransaction::income(f.category_id, money(100), day(1), f.a))
        .await
        .unwrap();

    let (negative, _) = f
        .engine
        .new_transaction(NewTransaction::expense(f.category_id, money(-50), day(2), f.a))
        .await
        .unwrap();
    assert_eq!(negative.amount, money(-50));
    assert_eq!(balance(&f.engine, f.a).await, money(50));

    let (positive, _) = f
        .engine
        .new_transaction(NewTransaction::expense(f.category_id, money(50), day(3), f.a))
        .await
        .unwrap();
    assert_eq!(positive.amount, money(-50));
    assert_eq!(balance(&f.engine, f.a).await, Money::ZERO);
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn income_and_transfer_amounts_are_stored_positive() {
    let f = fixture().await;

    let (income, _) = f
        .engine
        .new_transaction(NewTransaction::income(f.category_id, money(-100), day(1), f.a))
        .await
        .unwrap();
    assert_eq!(income.amount, money(100));

    let (transfer, _) = f
        .engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(-30),
            day(2),
            f.a,
            f.b,
        ))
        .await
        .unwrap();
    assert_eq!(transfer.amount, money(30));
    assert_eq!(balance(&f.engine, f.a).await, money(70));
    assert_eq!(balance(&f.engine, f.b).await, money(30));
}

#[tokio::test]
async fn transfer_then_delete_restores_both_accounts() {
    let f = fixture().await;
    f.engine
        .new_transaction(NewTransaction::income(f.category_id, money(100), day(1), f.a))
        .await
        .unwrap();

    let (transfer, _) = f
        .engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(30),
            day(2),
            f.a,
            f.b,
        ))
        .await
        .unwrap();
    assert_eq!(balance(&f.engine, f.a).await, money(70));
    assert_eq!(balance(&f.engine, f.b).await, money(30));

    f.engine.delete_transaction(transfer.id).await.unwrap();
    assert_eq!(balance(&f.engine, f.a).await, money(100));
    assert_eq!(balance(&f.engine, f.b).await, Money::ZERO);
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn update_expense_amount_reverses_old_effect() {
    let f = fixture().await;
    f.engine
        .new_transaction(NewTransaction::income(f.category_id, money(100), day(1), f.a))
        .await
        .unwrap();
    let (expense, _) = f
        .engine
        .new_transaction(NewTransaction::expense(f.category_id, money(50), day(2), f.a))
        .await
        .unwrap();
    assert_eq!(balance(&f.engine, f.a).await, money(50));

    let (updated, _) = f
        .engine
        .update_transaction(
            expense.id,
            TransactionPatch {
                amount: Some(money(80)),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, money(-80));
    assert_eq!(balance(&f.engine, f.a).await, money(20));
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn update_can_turn_expense_into_transfer() {
    let f = fixture().await;
    let (expense, _) = f
        .engine
        .new_transaction(NewTransaction::expense(f.category_id, money(40), day(2), f.a))
        .await
        .unwrap();
    assert_eq!(balance(&f.engine, f.a).await, money(-40));

    let (updated, _) = f
        .engine
        .update_transaction(
            expense.id,
            TransactionPatch {
                kind: Some(TransactionKind::Transfer),
                to_account_id: Some(Some(f.b)),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.kind, TransactionKind::Transfer);
    assert_eq!(updated.amount, money(40));
    assert_eq!(balance(&f.engine, f.a).await, money(-40));
    assert_eq!(balance(&f.engine, f.b).await, money(40));
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn update_moves_income_to_another_account() {
    let f = fixture().await;
    let (income, _) = f
        .engine
        .new_transaction(NewTransaction::income(f.category_id, money(25), day(1), f.a))
        .await
        .unwrap();

    f.engine
        .update_transaction(
            income.id,
            TransactionPatch {
                to_account_id: Some(Some(f.b)),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(balance(&f.engine, f.a).await, Money::ZERO);
    assert_eq!(balance(&f.engine, f.b).await, money(25));
}

#[tokio::test]
async fn update_validates_the_merged_record() {
    let f = fixture().await;
    let (income, _) = f
        .engine
        .new_transaction(NewTransaction::income(f.category_id, money(25), day(1), f.a))
        .await
        .unwrap();

    let err = f
        .engine
        .update_transaction(
            income.id,
            TransactionPatch {
                kind: Some(TransactionKind::Expense),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("from_account_id is required for expense transactions".into())
    );

    let (stored, _) = f.engine.transaction(income.id).await.unwrap();
    assert_eq!(stored.kind, TransactionKind::Income);
    assert_eq!(balance(&f.engine, f.a).await, money(25));
}

#[tokio::test]
async fn income_with_source_account_is_rejected_without_side_effects() {
    let f = fixture().await;

    let err = f
        .engine
        .new_transaction(
            NewTransaction::income(f.category_id, money(100), day(1), f.a).from_account(f.b),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation("from_account_id should not be set for income transactions".into())
    );
    assert_eq!(balance(&f.engine, f.a).await, Money::ZERO);
    assert_eq!(balance(&f.engine, f.b).await, Money::ZERO);
    assert!(
        f.engine
            .transactions(&Default::default(), Default::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn transfer_to_same_account_is_rejected() {
    let f = fixture().await;

    let err = f
        .engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(10),
            day(1),
            f.a,
            f.a,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(balance(&f.engine, f.a).await, Money::ZERO);
}

#[tokio::test]
async fn missing_references_fail_before_any_write() {
    let f = fixture().await;

    let err = f
        .engine
        .new_transaction(NewTransaction::income(999, money(10), day(1), f.a))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("Category".into()));

    let err = f
        .engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(10),
            day(1),
            f.a,
            999,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("Bank account".into()));

    assert_eq!(balance(&f.engine, f.a).await, Money::ZERO);
    assert!(
        f.engine
            .transactions(&Default::default(), Default::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn initial_balance_change_keeps_applied_effects() {
    let f = fixture().await;
    f.engine
        .new_transaction(NewTransaction::income(f.category_id, money(40), day(1), f.a))
        .await
        .unwrap();

    let account = f
        .engine
        .update_bank_account(
            f.a,
            engine::BankAccountPatch {
                initial_balance: Some(money(1_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(account.initial_balance, money(1_000));
    assert_eq!(account.current_balance, money(1_040));
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn recompute_repairs_drifted_balances() {
    let f = fixture().await;
    f.engine
        .new_transaction(NewTransaction::income(f.category_id, money(100), day(1), f.a))
        .await
        .unwrap();
    f.engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(30),
            day(2),
            f.a,
            f.b,
        ))
        .await
        .unwrap();

    let backend = f.db.get_database_backend();
    f.db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE bank_accounts SET current_balance_minor = ? WHERE id = ?",
        vec![123_i64.into(), f.b.into()],
    ))
    .await
    .unwrap();

    let drifts = f.engine.check_balances().await.unwrap();
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].account_id, f.b);
    assert_eq!(drifts[0].stored_balance, Money::new(123));
    assert_eq!(drifts[0].expected_balance, money(30));

    let repaired = f.engine.recompute_balances().await.unwrap();
    assert_eq!(repaired, drifts);
    assert_eq!(balance(&f.engine, f.b).await, money(30));
    assert_eq!(balance(&f.engine, f.a).await, money(70));
    assert_consistent(&f.engine).await;
}

#[tokio::test]
async fn effects_on_a_vanished_account_are_skipped() {
    let f = fixture().await;
    let (transfer, _) = f
        .engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(30),
            day(2),
            f.a,
            f.b,
        ))
        .await
        .unwrap();
    assert_eq!(balance(&f.engine, f.a).await, money(-30));

    let backend = f.db.get_database_backend();
    f.db.execute(Statement::from_string(backend, "PRAGMA foreign_keys = OFF"))
        .await
        .unwrap();
    f.db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM bank_accounts WHERE id = ?",
        vec![f.b.into()],
    ))
    .await
    .unwrap();

    f.engine
        .update_transaction(
            transfer.id,
            TransactionPatch {
                amount: Some(money(40)),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(balance(&f.engine, f.a).await, money(-40));

    f.engine.delete_transaction(transfer.id).await.unwrap();
    assert_eq!(balance(&f.engine, f.a).await, Money::ZERO);
    assert!(matches!(
        f.engine.bank_account(f.b).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn incremental_balances_match_recompute_after_mixed_history() {
    let f = fixture().await;
    let mut ids = Vec::new();
    for (i, units) in [120, -45, 300, -80].into_iter().enumerate() {
        let date = day(u32::try_from(i).unwrap() + 1);
        let cmd = if units > 0 {
            NewTransaction::income(f.category_id, money(units), date, f.a)
        } else {
            NewTransaction::expense(f.category_id, money(units), date, f.a)
        };
        ids.push(f.engine.new_transaction(cmd).await.unwrap().0.id);
    }
    let (transfer, _) = f
        .engine
        .new_transaction(NewTransaction::transfer(
            f.category_id,
            money(55),
            day(9),
            f.a,
            f.b,
        ))
        .await
        .unwrap();

    f.engine.delete_transaction(ids[1]).await.unwrap();
    f.engine
        .update_transaction(
            transfer.id,
            TransactionPatch {
                amount: Some(money(60)),
                from_account_id: Some(Some(f.b)),
                to_account_id: Some(Some(f.a)),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();
    f.engine
        .update_transaction(
            ids[3],
            TransactionPatch {
                date: Some(day(20)),
                description: Some(Some("moved".to_string())),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(balance(&f.engine, f.a).await, money(120 + 300 - 80 + 60));
    assert_eq!(balance(&f.engine, f.b).await, money(-60));
    assert_consistent(&f.engine).await;
}
