//! 捐赠奖励服务初始化入口
//!
//! 加载配置、执行数据库迁移、按需创建初始超级管理员，完成健康检查后退出。

use std::sync::Arc;

use anyhow::Result;
use rewards_shared::{cache::Cache, config::AppConfig, database::Database, observability};
use tracing::{info, warn};

use donation_rewards::{AppState, MIGRATOR, dto::EnsureSuperuserOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置
    let config = AppConfig::load("donation-rewards-service").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 2. 初始化日志
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config)?;

    info!("Starting donation-rewards-service...");
    info!(
        environment = %config.environment,
        coin_threshold_measure = ?config.rewards.coin_threshold_measure,
        "Configuration loaded"
    );

    // 3. 初始化数据库连接并执行迁移
    let db = Database::connect(&config.database).await?;
    db.run_migrations(&MIGRATOR).await?;

    // 4. 初始化 Redis 缓存（不可用时降级为直接读库）
    let cache = Arc::new(Cache::new(&config.redis)?);
    if let Err(e) = cache.health_check().await {
        warn!(error = %e, "Redis unavailable, dashboard cache disabled");
    }

    // 5. 组装服务
    let state = AppState::new(db.pool().clone(), cache, &config.rewards);

    // 6. 初始超级管理员
    if let Some(admin) = &config.rewards.bootstrap_admin {
        let outcome = state
            .account_service
            .ensure_superuser(&admin.username, &admin.email, &admin.password)
            .await?;
        match outcome {
            EnsureSuperuserOutcome::Created => {
                info!(username = %admin.username, "Superuser created")
            }
            EnsureSuperuserOutcome::AlreadyExists => {
                info!(username = %admin.username, "Superuser already exists")
            }
        }
    }

    // 7. 健康检查
    db.health_check().await?;
    info!("Health check passed");

    db.close().await;
    info!("donation-rewards-service bootstrap completed");

    Ok(())
}
