//! Concurrent debits against one account must serialize on the row lock.

mod common;

use bank_ledger_service::{error::AppError, services::transaction_service};
use sqlx::PgPool;

use common::*;

/// With balance B and N concurrent withdrawals of amount A, exactly
/// floor(B/A) succeed, the rest fail with InsufficientBalance, and the
/// final balance is B - floor(B/A)*A.
#[sqlx::test]
async fn concurrent_withdrawals_never_overdraw(pool: PgPool) {
    let config = test_config();
    let user = create_user(&pool, "asha").await;
    let account = create_account(&pool, user, 100_000).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            transaction_service::withdraw(&pool, &config, user, account, 30_000, None).await
        }));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => succeeded += 1,
            Err(AppError::InsufficientBalance { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 3); // floor(100000 / 30000)
    assert_eq!(rejected, 5);
    assert_eq!(account_balance(&pool, account).await, 10_000);

    // Exactly one ledger row per successful debit.
    let rows = transaction_rows(&pool, account).await;
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|(kind, amount, _)| kind == "WITHDRAW" && *amount == 30_000));
}

/// Opposite-direction transfers between the same two accounts take their
/// locks in ascending-id order, so neither direction can deadlock the other.
#[sqlx::test]
async fn opposite_direction_transfers_complete(pool: PgPool) {
    use bank_ledger_service::services::upi_service;

    let config = test_config();
    let asha = create_user(&pool, "asha").await;
    let ravi = create_user(&pool, "ravi").await;
    let asha_account = create_account(&pool, asha, 100_000).await;
    let ravi_account = create_account(&pool, ravi, 100_000).await;
    create_vpa(&pool, asha, asha_account, "asha@mybank", Some("1111")).await;
    create_vpa(&pool, ravi, ravi_account, "ravi@mybank", Some("2222")).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool_a = pool.clone();
        let config_a = config.clone();
        handles.push(tokio::spawn(async move {
            upi_service::transfer(
                &pool_a,
                &config_a,
                "asha@mybank",
                "ravi@mybank",
                5_000,
                None,
                "1111",
            )
            .await
        }));

        let pool_b = pool.clone();
        let config_b = config.clone();
        handles.push(tokio::spawn(async move {
            upi_service::transfer(
                &pool_b,
                &config_b,
                "ravi@mybank",
                "asha@mybank",
                5_000,
                None,
                "2222",
            )
            .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task completes")
            .expect("transfer succeeds");
    }

    // Equal traffic both ways: balances end where they started.
    assert_eq!(account_balance(&pool, asha_account).await, 100_000);
    assert_eq!(account_balance(&pool, ravi_account).await, 100_000);
    assert_eq!(transaction_rows(&pool, asha_account).await.len(), 8);
    assert_eq!(transaction_rows(&pool, ravi_account).await.len(), 8);
}
