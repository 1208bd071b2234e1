//! 捐赠端到端流程集成测试
//!
//! 注册 -> 提交捐赠 -> 管理员审核 -> 个人面板
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... REDIS_URL=redis://... \
//!   cargo test --test donation_flow_test -- --ignored
//! ```

mod common;

use common::*;
use donation_rewards::dto::{
    EnsureSuperuserOutcome, PurchaseCode, RegisterAccountRequest, SubmitDonationRequest,
};
use donation_rewards::{BadgeKind, DonationStatus, Principal, Role};
use rewards_shared::config::CoinThresholdMeasure;

fn submit_request(donation_type_id: i64) -> SubmitDonationRequest {
    SubmitDonationRequest {
        donation_type_id,
        evidence_ref: "  evidencias/garrafas.jpg  ".to_string(),
        description: Some("Doze garrafas PET limpas".to_string()),
    }
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_register_submit_approve_dashboard() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);

    let username = unique("doador");
    let account = state
        .account_service
        .register(RegisterAccountRequest {
            username: username.clone(),
            email: format!("{}@ufrpe.br", username),
            password: "senha123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(account.coin_balance, 0);
    assert!(!account.is_admin());

    let donor = Principal::from(&account);
    let admin = seed_admin(&pool).await;
    let type_id = seed_donation_type(&pool, 120).await;

    let donation = state
        .donation_service
        .submit_donation(&donor, submit_request(type_id))
        .await
        .unwrap();
    assert_eq!(donation.status, DonationStatus::Pending);
    assert_eq!(donation.evidence_ref, "evidencias/garrafas.jpg");

    let pending = state.donation_service.list_pending(&admin).await.unwrap();
    assert!(pending.iter().any(|d| d.id == donation.id));

    state
        .validation_service
        .approve(donation.id, &admin)
        .await
        .unwrap();

    let history = state
        .donation_service
        .list_history(&donor, Some(DonationStatus::Approved))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].coin_reward, 120);
    assert_eq!(history[0].donor_username, username);
    assert!(history[0].validated_by.is_some());

    let pending = state.donation_service.list_pending(&admin).await.unwrap();
    assert!(!pending.iter().any(|d| d.id == donation.id));

    let dashboard = state.account_service.dashboard(account.id).await.unwrap();
    assert_eq!(dashboard.username, username);
    assert_eq!(dashboard.coin_balance, 120);
    assert_eq!(dashboard.role, Role::Member);
    assert!(!dashboard.is_admin);
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_dashboard_reflects_purchase() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);

    let member = seed_member(&pool, 900).await;
    let badge_id = seed_purchase_badge(&pool, 300).await;

    // 先读一次面板写入缓存
    let before = state.account_service.dashboard(member.account_id).await.unwrap();
    assert_eq!(before.coin_balance, 900);

    let resp = state
        .award_service
        .purchase_badge(member.account_id, badge_id)
        .await
        .unwrap();
    assert_eq!(resp.code, PurchaseCode::PurchaseOk);

    // 购买成功后缓存失效，面板读取最新数据
    let after = state.account_service.dashboard(member.account_id).await.unwrap();
    assert_eq!(after.coin_balance, 600);
    assert!(after.badges.iter().any(|b| b.badge.id == badge_id));

    let purchasable = state
        .query_service
        .list_purchasable_badges(member.account_id)
        .await
        .unwrap();
    assert!(!purchasable.iter().any(|b| b.id == badge_id));
    assert!(
        state
            .query_service
            .owns_badge(member.account_id, badge_id)
            .await
            .unwrap()
    );

    cleanup_badges(&pool, &[badge_id]).await;
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_history_filters_by_status() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);

    let donor = seed_member(&pool, 0).await;
    let other = seed_member(&pool, 0).await;
    let type_id = seed_donation_type(&pool, 10).await;

    seed_donation(&pool, donor.account_id, type_id, DonationStatus::Pending).await;
    seed_donation(&pool, donor.account_id, type_id, DonationStatus::Approved).await;
    seed_donation(&pool, donor.account_id, type_id, DonationStatus::Rejected).await;
    seed_donation(&pool, other.account_id, type_id, DonationStatus::Pending).await;

    let all = state.donation_service.list_history(&donor, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|d| d.donor_id == donor.account_id));
    assert!(all.windows(2).all(|w| w[0].submitted_at >= w[1].submitted_at));

    let rejected = state
        .donation_service
        .list_history(&donor, Some(DonationStatus::Rejected))
        .await
        .unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].rejection_reason.as_deref(), Some("seed"));
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_submit_unknown_donation_type() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);
    let donor = seed_member(&pool, 0).await;

    let err = state
        .donation_service
        .submit_donation(&donor, submit_request(i64::MAX))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DONATION_TYPE_NOT_FOUND");
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_register_duplicate_username() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);

    let username = unique("repetido");
    let request = RegisterAccountRequest {
        username: username.clone(),
        email: format!("{}@ufrpe.br", username),
        password: "senha123".to_string(),
    };
    state.account_service.register(request.clone()).await.unwrap();

    let err = state.account_service.register(request).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert_eq!(err.field(), Some("username"));
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_ensure_superuser_is_idempotent() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);

    let username = unique("admin");
    let email = format!("{}@ufrpe.br", username);

    let first = state
        .account_service
        .ensure_superuser(&username, &email, "admin123")
        .await
        .unwrap();
    assert_eq!(first, EnsureSuperuserOutcome::Created);

    let second = state
        .account_service
        .ensure_superuser(&username, &email, "outra456")
        .await
        .unwrap();
    assert_eq!(second, EnsureSuperuserOutcome::AlreadyExists);
}

#[tokio::test]
#[ignore = "需要数据库环境"]
async fn test_active_badge_catalog() {
    let pool = setup_pool().await;
    let state = setup_state(&pool, CoinThresholdMeasure::CurrentBalance);

    let active = seed_badge(&pool, &unique("Ativa"), BadgeKind::Conquest, 0, Some(50), None, true).await;
    let hidden = seed_badge(&pool, &unique("Oculta"), BadgeKind::Purchase, 10, None, None, false).await;

    let catalog = state.query_service.list_active_badges().await.unwrap();
    assert!(catalog.iter().any(|b| b.id == active));
    assert!(!catalog.iter().any(|b| b.id == hidden));

    cleanup_badges(&pool, &[active, hidden]).await;
}
