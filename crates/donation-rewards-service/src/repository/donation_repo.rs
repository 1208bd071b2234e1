//! 捐赠仓储
//!
//! 提供捐赠与捐赠类型的数据访问，审核状态变更只在事务中进行

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};

use super::traits::DonationRepositoryTrait;
use crate::error::Result;
use crate::models::{Donation, DonationDetail, DonationStatus, DonationType, NewDonation};

/// 捐赠详情查询（关联捐赠人、捐赠类型和审核人）
const DETAIL_SELECT: &str = r#"
    SELECT d.id, d.donor_id, a.username AS donor_username,
           d.donation_type_id, t.name AS donation_type_name, t.coin_reward,
           d.status, d.evidence_ref, d.description, d.rejection_reason,
           d.submitted_at, d.validated_at, v.username AS validated_by_username
    FROM donations d
    JOIN accounts a ON a.id = d.donor_id
    JOIN donation_types t ON t.id = d.donation_type_id
    LEFT JOIN accounts v ON v.id = d.validated_by
"#;

/// 捐赠仓储
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 捐赠类型 ====================

    /// 获取捐赠类型
    pub async fn get_donation_type(&self, id: i64) -> Result<Option<DonationType>> {
        let donation_type = sqlx::query_as::<_, DonationType>(
            "SELECT id, name, coin_reward, created_at FROM donation_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(donation_type)
    }

    /// 列出所有捐赠类型（按名称排序）
    pub async fn list_donation_types(&self) -> Result<Vec<DonationType>> {
        let types = sqlx::query_as::<_, DonationType>(
            "SELECT id, name, coin_reward, created_at FROM donation_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    // ==================== 捐赠查询 ====================

    /// 根据 ID 获取捐赠
    pub async fn get_donation(&self, id: i64) -> Result<Option<Donation>> {
        let donation = sqlx::query_as::<_, Donation>(
            r#"
            SELECT id, donor_id, donation_type_id, status, evidence_ref, description,
                   rejection_reason, submitted_at, validated_at, validated_by
            FROM donations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(donation)
    }

    /// 获取捐赠详情
    pub async fn get_donation_detail(&self, id: i64) -> Result<Option<DonationDetail>> {
        let sql = format!("{} WHERE d.id = $1", DETAIL_SELECT);
        let detail = sqlx::query_as::<_, DonationDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(detail)
    }

    /// 列出捐赠人的捐赠记录（最新在前）
    pub async fn list_by_donor(
        &self,
        donor_id: i64,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationDetail>> {
        let sql = format!(
            "{} WHERE d.donor_id = $1 AND ($2::varchar IS NULL OR d.status = $2) \
             ORDER BY d.submitted_at DESC, d.id DESC",
            DETAIL_SELECT
        );
        let details = sqlx::query_as::<_, DonationDetail>(&sql)
            .bind(donor_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(details)
    }

    /// 列出待审核捐赠（最早提交在前）
    pub async fn list_pending(&self) -> Result<Vec<DonationDetail>> {
        let sql = format!(
            "{} WHERE d.status = $1 ORDER BY d.submitted_at ASC, d.id ASC",
            DETAIL_SELECT
        );
        let details = sqlx::query_as::<_, DonationDetail>(&sql)
            .bind(DonationStatus::Pending)
            .fetch_all(&self.pool)
            .await?;

        Ok(details)
    }

    // ==================== 写入操作 ====================

    /// 创建待审核捐赠
    pub async fn create_donation(&self, donation: &NewDonation) -> Result<Donation> {
        let created = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (donor_id, donation_type_id, status, evidence_ref, description, submitted_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, donor_id, donation_type_id, status, evidence_ref, description,
                      rejection_reason, submitted_at, validated_at, validated_by
            "#,
        )
        .bind(donation.donor_id)
        .bind(donation.donation_type_id)
        .bind(DonationStatus::Pending)
        .bind(&donation.evidence_ref)
        .bind(&donation.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取捐赠（带行级锁）
    ///
    /// 同一捐赠的并发审核在此处串行化
    pub async fn get_donation_for_update(
        tx: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Donation>> {
        let donation = sqlx::query_as::<_, Donation>(
            r#"
            SELECT id, donor_id, donation_type_id, status, evidence_ref, description,
                   rejection_reason, submitted_at, validated_at, validated_by
            FROM donations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(donation)
    }

    /// 在事务中获取捐赠类型
    pub async fn get_donation_type_in_tx(
        tx: &mut PgConnection,
        id: i64,
    ) -> Result<Option<DonationType>> {
        let donation_type = sqlx::query_as::<_, DonationType>(
            "SELECT id, name, coin_reward, created_at FROM donation_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(donation_type)
    }

    /// 在事务中写入审核结果
    ///
    /// 仅当捐赠仍为 Pending 时更新，返回 None 表示状态已被改变
    pub async fn mark_validated_in_tx(
        tx: &mut PgConnection,
        id: i64,
        status: DonationStatus,
        rejection_reason: Option<&str>,
        validated_by: i64,
    ) -> Result<Option<Donation>> {
        let donation = sqlx::query_as::<_, Donation>(
            r#"
            UPDATE donations
            SET status = $2, rejection_reason = $3, validated_by = $4, validated_at = NOW()
            WHERE id = $1 AND status = $5
            RETURNING id, donor_id, donation_type_id, status, evidence_ref, description,
                      rejection_reason, submitted_at, validated_at, validated_by
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .bind(validated_by)
        .bind(DonationStatus::Pending)
        .fetch_optional(tx)
        .await?;

        Ok(donation)
    }

    /// 在事务中统计捐赠人的已批准捐赠
    ///
    /// 返回 (已批准次数, 累计获得金币)
    pub async fn approved_totals_in_tx(tx: &mut PgConnection, donor_id: i64) -> Result<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS approved_count,
                   COALESCE(SUM(t.coin_reward), 0)::BIGINT AS lifetime_earned
            FROM donations d
            JOIN donation_types t ON t.id = d.donation_type_id
            WHERE d.donor_id = $1 AND d.status = $2
            "#,
        )
        .bind(donor_id)
        .bind(DonationStatus::Approved)
        .fetch_one(tx)
        .await?;

        Ok((row.get("approved_count"), row.get("lifetime_earned")))
    }
}

#[async_trait]
impl DonationRepositoryTrait for DonationRepository {
    async fn get_donation_type(&self, id: i64) -> Result<Option<DonationType>> {
        self.get_donation_type(id).await
    }

    async fn list_donation_types(&self) -> Result<Vec<DonationType>> {
        self.list_donation_types().await
    }

    async fn get_donation(&self, id: i64) -> Result<Option<Donation>> {
        self.get_donation(id).await
    }

    async fn get_donation_detail(&self, id: i64) -> Result<Option<DonationDetail>> {
        self.get_donation_detail(id).await
    }

    async fn create_donation(&self, donation: &NewDonation) -> Result<Donation> {
        self.create_donation(donation).await
    }

    async fn list_by_donor(
        &self,
        donor_id: i64,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationDetail>> {
        self.list_by_donor(donor_id, status).await
    }

    async fn list_pending(&self) -> Result<Vec<DonationDetail>> {
        self.list_pending().await
    }
}
