//! Payment engine: debit + transaction log + reward accrual as one unit.

mod common;

use bank_ledger_service::{
    error::AppError,
    models::payment::{PaymentStatus, UpiPaymentRequest},
    services::payment_service,
};
use sqlx::PgPool;
use uuid::Uuid;

use common::*;

fn payment_request(account_id: Uuid, amount_paise: i64) -> UpiPaymentRequest {
    UpiPaymentRequest {
        account_id,
        vpa: "shop@okbank".to_string(),
        amount_paise,
        category: "FOOD".to_string(),
        note: Some("Lunch".to_string()),
    }
}

/// Seeds the paying user plus the recipient VPA the payments target.
async fn seed_payer(pool: &PgPool, balance_paise: i64) -> (Uuid, Uuid) {
    let payer = create_user(pool, "asha").await;
    let account = create_account(pool, payer, balance_paise).await;

    let shop = create_user(pool, "shop").await;
    let shop_account = create_account(pool, shop, 0).await;
    create_vpa(pool, shop, shop_account, "shop@okbank", None).await;

    (payer, account)
}

#[sqlx::test]
async fn payment_debits_logs_and_accrues_coins(pool: PgPool) {
    let config = test_config();
    // ₹1000 balance, ₹349 payment.
    let (payer, account) = seed_payer(&pool, 100_000).await;

    let response = payment_service::upi_pay(&pool, &config, payer, payment_request(account, 34_900))
        .await
        .expect("payment succeeds");

    assert_eq!(response.status, PaymentStatus::Success);
    assert_eq!(response.balance_after_paise, 65_100); // ₹651
    assert_eq!(response.coins_earned, 3); // max(1, floor(349/100))
    assert!(response.ref_id.starts_with("UPI"));

    assert_eq!(account_balance(&pool, account).await, 65_100);
    assert_eq!(payment_status(&pool, response.id).await, "SUCCESS");

    // Exactly one PAYMENT ledger row with the post-debit snapshot.
    let rows = transaction_rows(&pool, account).await;
    assert_eq!(rows, vec![("PAYMENT".to_string(), 34_900, 65_100)]);

    // Coins landed in the wallet with a matching EARN entry.
    assert_eq!(wallet_coins(&pool, payer).await, 3);
    assert_eq!(reward_ledger_rows(&pool, payer).await, vec![("EARN".to_string(), 3)]);
}

#[sqlx::test]
async fn insufficient_balance_fails_the_payment_and_changes_nothing(pool: PgPool) {
    let config = test_config();
    // ₹10 balance, ₹349 payment.
    let (payer, account) = seed_payer(&pool, 1_000).await;

    let err = payment_service::upi_pay(&pool, &config, payer, payment_request(account, 34_900))
        .await
        .expect_err("payment rejected");
    assert!(matches!(
        err,
        AppError::InsufficientBalance {
            available_paise: 1_000
        }
    ));

    // The payment record exists and ended FAILED, never stuck PENDING.
    let payments = payments_for_account(&pool, account).await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].1, "FAILED");

    // No debit, no ledger row, no coins.
    assert_eq!(account_balance(&pool, account).await, 1_000);
    assert!(transaction_rows(&pool, account).await.is_empty());
    assert_eq!(wallet_coins(&pool, payer).await, 0);
}

#[sqlx::test]
async fn small_payments_earn_the_floor_coin(pool: PgPool) {
    let config = test_config();
    let (payer, account) = seed_payer(&pool, 100_000).await;

    // ₹45 is below the 1-coin-per-₹100 rate but still earns the floor coin.
    let response = payment_service::upi_pay(&pool, &config, payer, payment_request(account, 4_500))
        .await
        .expect("payment succeeds");

    assert_eq!(response.coins_earned, 1);
}

#[sqlx::test]
async fn malformed_inputs_are_rejected_before_any_record_exists(pool: PgPool) {
    let config = test_config();
    let (payer, account) = seed_payer(&pool, 100_000).await;

    let mut bad_vpa = payment_request(account, 1_000);
    bad_vpa.vpa = "not a vpa".to_string();

    let mut bad_category = payment_request(account, 1_000);
    bad_category.category = "CRYPTO".to_string();

    let bad_amount = payment_request(account, 0);

    for request in [bad_vpa, bad_category, bad_amount] {
        let err = payment_service::upi_pay(&pool, &config, payer, request)
            .await
            .expect_err("rejected");
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    // Validation failures never create payment records.
    assert!(payments_for_account(&pool, account).await.is_empty());
}

#[sqlx::test]
async fn unknown_recipient_vpa_is_rejected(pool: PgPool) {
    let config = test_config();
    let (payer, account) = seed_payer(&pool, 100_000).await;

    let mut request = payment_request(account, 1_000);
    request.vpa = "ghost@nowhere".to_string();

    let err = payment_service::upi_pay(&pool, &config, payer, request)
        .await
        .expect_err("rejected");
    assert!(matches!(err, AppError::VpaNotFound));
}

#[sqlx::test]
async fn paying_from_someone_elses_account_is_forbidden(pool: PgPool) {
    let config = test_config();
    let (_, account) = seed_payer(&pool, 100_000).await;
    let stranger = create_user(&pool, "ravi").await;

    let err = payment_service::upi_pay(&pool, &config, stranger, payment_request(account, 1_000))
        .await
        .expect_err("rejected");
    assert!(matches!(err, AppError::Forbidden));
}

#[sqlx::test]
async fn reference_ids_are_unique_across_payments(pool: PgPool) {
    let config = test_config();
    let (payer, account) = seed_payer(&pool, 100_000).await;

    let first = payment_service::upi_pay(&pool, &config, payer, payment_request(account, 1_000))
        .await
        .expect("payment succeeds");
    let second = payment_service::upi_pay(&pool, &config, payer, payment_request(account, 1_000))
        .await
        .expect("payment succeeds");

    assert_ne!(first.ref_id, second.ref_id);
}
