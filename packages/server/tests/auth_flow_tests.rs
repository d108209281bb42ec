//! Integration tests for the OTP login flow: pre-approval gate, throttling,
//! verification and account resolution.

mod common;

use crate::common::*;
use axum::http::StatusCode;
use phone_gate::domains::auth::activities::{check_role, send_otp, verify_otp};
use phone_gate::domains::auth::models::Account;
use phone_gate::domains::auth::Role;
use phone_gate::kernel::{MockTwilioService, TestDependencies};
use std::time::Duration;
use test_context::test_context;

// =============================================================================
// Pre-approval gate
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn check_role_requires_preapproval_for_users(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();

    let err = check_role(Some(&phone), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "User not pre-approved by Admin");

    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let message = check_role(Some(&phone), Some("user"), &deps)
        .await
        .unwrap();
    assert_eq!(message, "User can proceed to OTP");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn check_role_admits_configured_admins(ctx: &TestHarness) {
    let admin_phone = unique_phone();
    let deps = ctx.deps(TestDependencies::new().admin_identifiers(&[&admin_phone]));

    let message = check_role(Some(&admin_phone), Some("admin"), &deps)
        .await
        .unwrap();
    assert_eq!(message, "Admin can proceed to OTP");

    let err = check_role(Some(&unique_phone()), Some("admin"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "Admin not pre-approved");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn check_role_admits_preapproved_admins(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();
    preapprove(&phone, Role::Admin, &ctx.db_pool).await;

    assert!(check_role(Some(&phone), Some("admin"), &deps).await.is_ok());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn check_role_preapproval_is_per_role(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let err = check_role(Some(&phone), Some("admin"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn check_role_validates_input(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());

    let err = check_role(None, Some("user"), &deps).await.unwrap_err();
    assert_eq!(err.to_string(), "Phone and role are required");

    let err = check_role(Some(&unique_phone()), None, &deps)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Phone and role are required");

    let err = check_role(Some(&unique_phone()), Some("superuser"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Invalid role");
}

// =============================================================================
// Sending
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn send_otp_normalizes_and_dispatches(ctx: &TestHarness) {
    let test_deps = TestDependencies::new();
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);

    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;
    let formatted = format!("{} ({}) {}-{}", &phone[..2], &phone[2..5], &phone[5..8], &phone[8..]);

    let sent = send_otp(Some(&formatted), Some("user"), &deps)
        .await
        .unwrap();
    assert_eq!(sent.phone_number, phone);
    assert!(sent.sid.starts_with("VE_mock_"));
    assert_eq!(twilio.sent_otps(), vec![phone]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn send_otp_rejects_missing_fields_or_invalid_phone(ctx: &TestHarness) {
    let test_deps = TestDependencies::new();
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);

    let err = send_otp(None, Some("user"), &deps).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Phone number is required");

    let err = send_otp(Some(&unique_phone()), None, &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Missing fields");

    let err = send_otp(Some("12345"), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    assert!(twilio.sent_otps().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn send_otp_refuses_numbers_not_on_allow_list(ctx: &TestHarness) {
    let test_deps = TestDependencies::new();
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();

    let err = send_otp(Some(&phone), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let err = send_otp(Some(&phone), Some("admin"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert!(twilio.sent_otps().is_empty());

    preapprove(&phone, Role::User, &ctx.db_pool).await;
    send_otp(Some(&phone), Some("user"), &deps).await.unwrap();
    assert_eq!(twilio.sent_otps().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn send_otp_enforces_cooldown(ctx: &TestHarness) {
    let test_deps = TestDependencies::new().otp_limits(Duration::from_secs(60), 5);
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();
    let other = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;
    preapprove(&other, Role::User, &ctx.db_pool).await;

    send_otp(Some(&phone), Some("user"), &deps).await.unwrap();

    let err = send_otp(Some(&phone), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(twilio.sent_otps().len(), 1);

    // Other numbers are unaffected
    send_otp(Some(&other), Some("user"), &deps).await.unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn send_otp_enforces_hourly_cap(ctx: &TestHarness) {
    let test_deps = TestDependencies::new().otp_limits(Duration::ZERO, 3);
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    for _ in 0..3 {
        send_otp(Some(&phone), Some("user"), &deps).await.unwrap();
    }

    let err = send_otp(Some(&phone), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(err.to_string(), "Too many OTP requests, try again later");
    assert_eq!(twilio.sent_otps().len(), 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn provider_failure_does_not_consume_throttle_slot(ctx: &TestHarness) {
    let deps = ctx.deps(
        TestDependencies::new()
            .mock_twilio(MockTwilioService::new().failing())
            .otp_limits(Duration::from_secs(60), 5),
    );
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let err = send_otp(Some(&phone), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

    // A retry is not blocked by the cooldown of the failed attempt
    let err = send_otp(Some(&phone), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Verification
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_otp_creates_account_and_session(ctx: &TestHarness) {
    let test_deps = TestDependencies::new();
    let jwt_service = test_deps.jwt_service.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let verified = verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap();

    assert!(verified.user.created);
    assert_eq!(verified.user.phone_number, phone);
    assert_eq!(verified.user.role, Role::User);
    assert_eq!(verified.session.token_type, "bearer");

    let claims = jwt_service
        .verify_token(&verified.session.access_token)
        .unwrap();
    assert_eq!(claims.account_id, verified.user.id);
    assert_eq!(claims.phone_number, phone);
    assert_eq!(claims.role, Role::User);

    let stored = Account::find_by_phone(&phone, Role::User, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, verified.user.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_otp_reuses_existing_account(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let first = verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap();
    let second = verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap();

    assert!(first.user.created);
    assert!(!second.user.created);
    assert_eq!(first.user.id, second.user.id);
    assert_ne!(first.session.access_token, second.session.access_token);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_verifications_resolve_to_one_account(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let deps = deps.clone();
            let phone = phone.clone();
            tokio::spawn(async move {
                verify_otp(Some(&phone), Some("123456"), Some("user"), &deps).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    let mut created = 0;
    for handle in handles {
        let verified = handle.await.unwrap().unwrap();
        ids.push(verified.user.id);
        if verified.user.created {
            created += 1;
        }
    }

    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(created, 1);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE phone_number = $1 AND role = 'user'")
            .bind(&phone)
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn same_phone_gets_separate_accounts_per_role(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;
    preapprove(&phone, Role::Admin, &ctx.db_pool).await;

    let as_user = verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap();
    let as_admin = verify_otp(Some(&phone), Some("123456"), Some("admin"), &deps)
        .await
        .unwrap();

    assert_ne!(as_user.user.id, as_admin.user.id);
    assert_eq!(as_admin.user.role, Role::Admin);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_otp_rejects_wrong_code(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new());
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let err = verify_otp(Some(&phone), Some("654321"), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Invalid OTP");

    assert!(Account::find_by_phone(&phone, Role::User, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_otp_rejects_malformed_code_without_calling_provider(ctx: &TestHarness) {
    let test_deps = TestDependencies::new();
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    for code in ["12", "12ab56", "12345678901"] {
        let err = verify_otp(Some(&phone), Some(code), Some("user"), &deps)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid OTP");
    }
    assert!(twilio.verify_calls().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_otp_requires_fields_and_preapproval(ctx: &TestHarness) {
    let test_deps = TestDependencies::new();
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();

    let err = verify_otp(Some(&phone), None, Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing fields");

    let err = verify_otp(Some(&phone), Some("123456"), None, &deps)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing fields");

    let err = verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert!(twilio.verify_calls().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn successful_verification_clears_throttle(ctx: &TestHarness) {
    let test_deps = TestDependencies::new().otp_limits(Duration::from_secs(60), 5);
    let twilio = test_deps.twilio.clone();
    let deps = ctx.deps(test_deps);
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    send_otp(Some(&phone), Some("user"), &deps).await.unwrap();
    verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap();

    // Cooldown no longer applies after a successful login
    send_otp(Some(&phone), Some("user"), &deps).await.unwrap();
    assert_eq!(twilio.sent_otps().len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_otp_surfaces_provider_failure(ctx: &TestHarness) {
    let deps = ctx.deps(TestDependencies::new().mock_twilio(MockTwilioService::new().failing()));
    let phone = unique_phone();
    preapprove(&phone, Role::User, &ctx.db_pool).await;

    let err = verify_otp(Some(&phone), Some("123456"), Some("user"), &deps)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}
