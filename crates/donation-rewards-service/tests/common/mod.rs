//! 集成测试公共辅助函数
//!
//! 每个测试使用带唯一后缀的数据，互不干扰，可在同一数据库上并行执行。

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use donation_rewards::{AdminPrincipal, AppState, BadgeKind, DonationStatus, MIGRATOR, Principal};
use fake::Fake;
use fake::faker::internet::en::Username;
use rewards_shared::cache::Cache;
use rewards_shared::config::{CoinThresholdMeasure, RedisConfig, RewardsConfig};
use sqlx::{PgPool, Row};

pub fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

/// 连接数据库并执行迁移
pub async fn setup_pool() -> PgPool {
    let pool = PgPool::connect(&database_url())
        .await
        .expect("Failed to connect to database");
    MIGRATOR.run(&pool).await.expect("迁移执行失败");
    pool
}

/// 构建应用状态（Redis 不可用时缓存操作只记录警告）
pub fn setup_state(pool: &PgPool, measure: CoinThresholdMeasure) -> AppState {
    let redis_config = RedisConfig { url: redis_url() };
    let cache = Arc::new(Cache::new(&redis_config).expect("Invalid Redis URL"));
    let config = RewardsConfig {
        coin_threshold_measure: measure,
        ..RewardsConfig::default()
    };
    AppState::new(pool.clone(), cache, &config)
}

/// 生成唯一名称
pub fn unique(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let salt: u32 = (0..1_000_000).fake();
    format!("{}-{}-{}", prefix, nanos, salt)
}

/// 插入测试账户，返回账户 ID
pub async fn seed_account(pool: &PgPool, balance: i64, is_staff: bool) -> i64 {
    let base: String = Username().fake();
    let username = unique(&base);
    let row = sqlx::query(
        r#"
        INSERT INTO accounts (username, email, password_hash, is_active, is_staff, is_superuser, coin_balance)
        VALUES ($1, $2, 'not-a-real-hash', TRUE, $3, FALSE, $4)
        RETURNING id
        "#,
    )
    .bind(&username)
    .bind(format!("{}@ufrpe.br", username))
    .bind(is_staff)
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("插入测试账户失败");
    row.get("id")
}

pub async fn seed_member(pool: &PgPool, balance: i64) -> Principal {
    Principal::member(seed_account(pool, balance, false).await)
}

pub async fn seed_admin(pool: &PgPool) -> AdminPrincipal {
    let id = seed_account(pool, 0, true).await;
    Principal::new(id, true, true, false)
        .require_admin()
        .expect("staff principal must be admin")
}

/// 插入捐赠类型，返回 ID
pub async fn seed_donation_type(pool: &PgPool, coin_reward: i64) -> i64 {
    let row = sqlx::query(
        "INSERT INTO donation_types (name, coin_reward) VALUES ($1, $2) RETURNING id",
    )
    .bind(unique("Tipo"))
    .bind(coin_reward)
    .fetch_one(pool)
    .await
    .expect("插入捐赠类型失败");
    row.get("id")
}

/// 插入徽章，返回 ID
pub async fn seed_badge(
    pool: &PgPool,
    name: &str,
    kind: BadgeKind,
    coin_cost: i64,
    donation_count_threshold: Option<i64>,
    coin_balance_threshold: Option<i64>,
    active: bool,
) -> i64 {
    let row = sqlx::query(
        r#"
        INSERT INTO badges (name, description, kind, coin_cost, donation_count_threshold,
                            coin_balance_threshold, active)
        VALUES ($1, 'integration test badge', $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(kind)
    .bind(coin_cost)
    .bind(donation_count_threshold)
    .bind(coin_balance_threshold)
    .bind(active)
    .fetch_one(pool)
    .await
    .expect("插入徽章失败");
    row.get("id")
}

pub async fn seed_purchase_badge(pool: &PgPool, cost: i64) -> i64 {
    seed_badge(pool, &unique("Loja"), BadgeKind::Purchase, cost, None, None, true).await
}

/// 插入指定状态的捐赠，返回 ID
pub async fn seed_donation(
    pool: &PgPool,
    donor_id: i64,
    donation_type_id: i64,
    status: DonationStatus,
) -> i64 {
    let row = sqlx::query(
        r#"
        INSERT INTO donations (donor_id, donation_type_id, status, evidence_ref, rejection_reason,
                               validated_at)
        VALUES ($1, $2, $3, 'evidencias/teste.jpg',
                CASE WHEN $3 = 'REJECTED' THEN 'seed' END,
                CASE WHEN $3 = 'PENDING' THEN NULL ELSE NOW() END)
        RETURNING id
        "#,
    )
    .bind(donor_id)
    .bind(donation_type_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("插入捐赠失败");
    row.get("id")
}

pub async fn balance_of(pool: &PgPool, account_id: i64) -> i64 {
    sqlx::query("SELECT coin_balance FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await
        .expect("查询余额失败")
        .get("coin_balance")
}

pub async fn owns_badge(pool: &PgPool, account_id: i64, badge_id: i64) -> bool {
    sqlx::query("SELECT COUNT(*) AS n FROM account_badges WHERE account_id = $1 AND badge_id = $2")
        .bind(account_id)
        .bind(badge_id)
        .fetch_one(pool)
        .await
        .expect("查询持有记录失败")
        .get::<i64, _>("n")
        > 0
}

pub async fn ownership_rows(pool: &PgPool, account_id: i64, badge_id: i64) -> i64 {
    sqlx::query("SELECT COUNT(*) AS n FROM account_badges WHERE account_id = $1 AND badge_id = $2")
        .bind(account_id)
        .bind(badge_id)
        .fetch_one(pool)
        .await
        .expect("查询持有记录失败")
        .get("n")
}

/// 删除测试徽章（持有记录随外键级联删除）
pub async fn cleanup_badges(pool: &PgPool, badge_ids: &[i64]) {
    sqlx::query("DELETE FROM badges WHERE id = ANY($1)")
        .bind(badge_ids)
        .execute(pool)
        .await
        .ok();
}
