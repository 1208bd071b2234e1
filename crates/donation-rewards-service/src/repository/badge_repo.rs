//! 徽章仓储
//!
//! 提供徽章定义的数据访问，下线徽章不出现在任何列表中

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::BadgeRepositoryTrait;
use crate::error::Result;
use crate::models::{Badge, BadgeKind};

/// 徽章仓储
pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 根据 ID 获取徽章
    pub async fn get_badge(&self, id: i64) -> Result<Option<Badge>> {
        let badge = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, description, icon_ref, kind, coin_cost,
                   donation_count_threshold, coin_balance_threshold, active, created_at
            FROM badges
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge)
    }

    /// 列出所有上线徽章（按类型、价格排序）
    pub async fn list_active_badges(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, description, icon_ref, kind, coin_cost,
                   donation_count_threshold, coin_balance_threshold, active, created_at
            FROM badges
            WHERE active = TRUE
            ORDER BY kind, coin_cost, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    /// 列出账户尚未持有的在售购买徽章
    pub async fn list_purchasable_for_account(&self, account_id: i64) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT b.id, b.name, b.description, b.icon_ref, b.kind, b.coin_cost,
                   b.donation_count_threshold, b.coin_balance_threshold, b.active, b.created_at
            FROM badges b
            WHERE b.active = TRUE
              AND b.kind = $2
              AND NOT EXISTS (
                  SELECT 1 FROM account_badges ab
                  WHERE ab.account_id = $1 AND ab.badge_id = b.id
              )
            ORDER BY b.coin_cost, b.id
            "#,
        )
        .bind(account_id)
        .bind(BadgeKind::Purchase)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    // ==================== 事务操作 ====================

    /// 在事务中列出账户尚未持有的上线成就徽章
    pub async fn list_conquest_candidates_in_tx(
        tx: &mut PgConnection,
        account_id: i64,
    ) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT b.id, b.name, b.description, b.icon_ref, b.kind, b.coin_cost,
                   b.donation_count_threshold, b.coin_balance_threshold, b.active, b.created_at
            FROM badges b
            WHERE b.active = TRUE
              AND b.kind = $2
              AND NOT EXISTS (
                  SELECT 1 FROM account_badges ab
                  WHERE ab.account_id = $1 AND ab.badge_id = b.id
              )
            ORDER BY b.id
            "#,
        )
        .bind(account_id)
        .bind(BadgeKind::Conquest)
        .fetch_all(tx)
        .await?;

        Ok(badges)
    }
}

#[async_trait]
impl BadgeRepositoryTrait for BadgeRepository {
    async fn get_badge(&self, id: i64) -> Result<Option<Badge>> {
        self.get_badge(id).await
    }

    async fn list_active_badges(&self) -> Result<Vec<Badge>> {
        self.list_active_badges().await
    }

    async fn list_purchasable_for_account(&self, account_id: i64) -> Result<Vec<Badge>> {
        self.list_purchasable_for_account(account_id).await
    }
}
