//! 应用状态定义
//!
//! 组装仓储与服务，供入口进程和外部调用层共享

use std::sync::Arc;

use rewards_shared::cache::Cache;
use rewards_shared::config::RewardsConfig;
use sqlx::PgPool;

use crate::repository::{
    AccountBadgeRepository, AccountRepository, BadgeRepository, DonationRepository,
};
use crate::service::{
    AccountService, BadgeAwardService, BadgeQueryService, DonationService, ValidationService,
};

/// 应用共享状态
///
/// 所有服务通过 Arc 共享，可在请求间复用
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// Redis 缓存客户端
    pub cache: Arc<Cache>,
    pub award_service: Arc<BadgeAwardService<BadgeRepository>>,
    pub validation_service: Arc<ValidationService<BadgeRepository>>,
    pub donation_service: Arc<DonationService<DonationRepository>>,
    pub account_service: Arc<AccountService<AccountRepository, AccountBadgeRepository>>,
    pub query_service: Arc<BadgeQueryService<BadgeRepository, AccountBadgeRepository>>,
}

impl AppState {
    /// 创建应用状态
    pub fn new(pool: PgPool, cache: Arc<Cache>, config: &RewardsConfig) -> Self {
        let badge_repo = Arc::new(BadgeRepository::new(pool.clone()));
        let account_repo = Arc::new(AccountRepository::new(pool.clone()));
        let account_badge_repo = Arc::new(AccountBadgeRepository::new(pool.clone()));
        let donation_repo = Arc::new(DonationRepository::new(pool.clone()));

        let award_service = Arc::new(BadgeAwardService::new(
            badge_repo.clone(),
            cache.clone(),
            pool.clone(),
            config.coin_threshold_measure,
        ));
        let validation_service = Arc::new(ValidationService::new(
            award_service.clone(),
            pool.clone(),
        ));
        let donation_service = Arc::new(DonationService::new(donation_repo));
        let account_service = Arc::new(AccountService::new(
            account_repo,
            account_badge_repo.clone(),
            cache.clone(),
            config,
        ));
        let query_service = Arc::new(BadgeQueryService::new(badge_repo, account_badge_repo));

        Self {
            pool,
            cache,
            award_service,
            validation_service,
            donation_service,
            account_service,
            query_service,
        }
    }
}
