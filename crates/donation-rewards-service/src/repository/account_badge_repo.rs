//! 账户徽章仓储
//!
//! 账户与徽章的持有关系，(account_id, badge_id) 由唯一约束保证不重复

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};

use super::traits::AccountBadgeRepositoryTrait;
use crate::error::Result;
use crate::models::{AwardSource, Badge, BadgeKind, OwnedBadge};

/// 持有徽章行（关联徽章定义）
#[derive(sqlx::FromRow)]
struct OwnedBadgeRow {
    account_badge_id: i64,
    source: AwardSource,
    awarded_at: DateTime<Utc>,
    badge_id: i64,
    name: String,
    description: String,
    icon_ref: Option<String>,
    kind: BadgeKind,
    coin_cost: i64,
    donation_count_threshold: Option<i64>,
    coin_balance_threshold: Option<i64>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<OwnedBadgeRow> for OwnedBadge {
    fn from(row: OwnedBadgeRow) -> Self {
        Self {
            account_badge_id: row.account_badge_id,
            source: row.source,
            awarded_at: row.awarded_at,
            badge: Badge {
                id: row.badge_id,
                name: row.name,
                description: row.description,
                icon_ref: row.icon_ref,
                kind: row.kind,
                coin_cost: row.coin_cost,
                donation_count_threshold: row.donation_count_threshold,
                coin_balance_threshold: row.coin_balance_threshold,
                active: row.active,
                created_at: row.created_at,
            },
        }
    }
}

/// 账户徽章仓储
pub struct AccountBadgeRepository {
    pool: PgPool,
}

impl AccountBadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 账户是否已持有徽章
    pub async fn has_badge(&self, account_id: i64, badge_id: i64) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM account_badges WHERE account_id = $1 AND badge_id = $2) AS owned",
        )
        .bind(account_id)
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("owned"))
    }

    /// 列出账户持有的徽章（最新获得在前）
    pub async fn list_owned_badges(&self, account_id: i64) -> Result<Vec<OwnedBadge>> {
        let rows = sqlx::query_as::<_, OwnedBadgeRow>(
            r#"
            SELECT ab.id AS account_badge_id, ab.source, ab.awarded_at,
                   b.id AS badge_id, b.name, b.description, b.icon_ref, b.kind, b.coin_cost,
                   b.donation_count_threshold, b.coin_balance_threshold, b.active, b.created_at
            FROM account_badges ab
            JOIN badges b ON b.id = ab.badge_id
            WHERE ab.account_id = $1
            ORDER BY ab.awarded_at DESC, ab.id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OwnedBadge::from).collect())
    }

    // ==================== 事务操作 ====================

    /// 在事务中检查持有关系
    pub async fn has_badge_in_tx(
        tx: &mut PgConnection,
        account_id: i64,
        badge_id: i64,
    ) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM account_badges WHERE account_id = $1 AND badge_id = $2) AS owned",
        )
        .bind(account_id)
        .bind(badge_id)
        .fetch_one(tx)
        .await?;

        Ok(row.get("owned"))
    }

    /// 在事务中写入持有记录
    ///
    /// 已持有时不写入并返回 None，只有返回 Some 的才算新授予
    pub async fn insert_in_tx(
        tx: &mut PgConnection,
        account_id: i64,
        badge_id: i64,
        source: AwardSource,
    ) -> Result<Option<i64>> {
        let row = sqlx::query(
            r#"
            INSERT INTO account_badges (account_id, badge_id, source, awarded_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (account_id, badge_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(account_id)
        .bind(badge_id)
        .bind(source)
        .fetch_optional(tx)
        .await?;

        Ok(row.map(|r| r.get("id")))
    }
}

#[async_trait]
impl AccountBadgeRepositoryTrait for AccountBadgeRepository {
    async fn has_badge(&self, account_id: i64, badge_id: i64) -> Result<bool> {
        self.has_badge(account_id, badge_id).await
    }

    async fn list_owned_badges(&self, account_id: i64) -> Result<Vec<OwnedBadge>> {
        self.list_owned_badges(account_id).await
    }
}
