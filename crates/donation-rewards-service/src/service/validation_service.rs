//! 捐赠审核服务
//!
//! 负责捐赠从 Pending 到 Approved / Rejected 的一次性状态迁移：
//! - 批准：写入审核结果，并在同一事务内为捐赠人入账、评估成就徽章
//! - 拒绝：必须附带原因，不产生金币或徽章变更
//!
//! 捐赠行在事务内加锁后才检查状态，已审核的捐赠返回 `ALREADY_VALIDATED`，不做任何修改。

use std::sync::Arc;

use tracing::{info, instrument, warn};

use rewards_shared::observability::metrics as rewards_metrics;

use crate::auth::AdminPrincipal;
use crate::error::{Result, RewardsError};
use crate::models::{Donation, DonationStatus};
use crate::repository::{BadgeRepositoryTrait, DonationRepository};
use crate::service::award_service::BadgeAwardService;
use crate::service::dto::{
    ApproveDonationResponse, RejectDonationResponse, ValidateDonationRequest, ValidationResponse,
};

/// 检查捐赠能否迁移到目标状态
pub fn ensure_transition(donation: &Donation, target: DonationStatus) -> Result<()> {
    if donation.status.can_transition_to(target) {
        Ok(())
    } else {
        Err(RewardsError::AlreadyValidated {
            donation_id: donation.id,
            status: donation.status,
        })
    }
}

/// 规范化拒绝原因，去除首尾空白后不能为空
pub fn normalize_rejection_reason(reason: Option<&str>) -> Result<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .ok_or(RewardsError::MissingRejectionReason)
}

/// 捐赠审核服务
pub struct ValidationService<BR>
where
    BR: BadgeRepositoryTrait,
{
    award_service: Arc<BadgeAwardService<BR>>,
    pool: sqlx::PgPool,
}

impl<BR> ValidationService<BR>
where
    BR: BadgeRepositoryTrait,
{
    pub fn new(award_service: Arc<BadgeAwardService<BR>>, pool: sqlx::PgPool) -> Self {
        Self {
            award_service,
            pool,
        }
    }

    /// 按请求状态分派到批准或拒绝
    #[instrument(skip(self, admin, request), fields(admin_id = admin.account_id(), status = request.status.as_str()))]
    pub async fn validate(
        &self,
        donation_id: i64,
        admin: &AdminPrincipal,
        request: ValidateDonationRequest,
    ) -> Result<ValidationResponse> {
        match request.status {
            DonationStatus::Approved => self
                .approve(donation_id, admin)
                .await
                .map(ValidationResponse::Approved),
            DonationStatus::Rejected => self
                .reject(donation_id, admin, request.rejection_reason.as_deref())
                .await
                .map(ValidationResponse::Rejected),
            DonationStatus::Pending => Err(RewardsError::validation(
                "status",
                "审核状态只能为 APPROVED 或 REJECTED",
            )),
        }
    }

    /// 批准捐赠
    ///
    /// 审核结果写入、金币入账、成就评估在同一事务内完成，任一步失败整体回滚
    #[instrument(skip(self, admin), fields(admin_id = admin.account_id()))]
    pub async fn approve(
        &self,
        donation_id: i64,
        admin: &AdminPrincipal,
    ) -> Result<ApproveDonationResponse> {
        let mut tx = self.pool.begin().await?;

        let donation = DonationRepository::get_donation_for_update(&mut tx, donation_id)
            .await?
            .ok_or(RewardsError::DonationNotFound(donation_id))?;

        if let Err(e) = ensure_transition(&donation, DonationStatus::Approved) {
            warn!(donation_id = donation_id, status = donation.status.as_str(), "捐赠已审核，拒绝重复审核");
            return Err(e);
        }

        let donation_type =
            DonationRepository::get_donation_type_in_tx(&mut tx, donation.donation_type_id)
                .await?
                .ok_or(RewardsError::DonationTypeNotFound(donation.donation_type_id))?;

        DonationRepository::mark_validated_in_tx(
            &mut tx,
            donation_id,
            DonationStatus::Approved,
            None,
            admin.account_id(),
        )
        .await?
        .ok_or(RewardsError::ConcurrencyConflict)?;

        let outcome = self
            .award_service
            .credit_and_evaluate(&mut tx, donation.donor_id, donation_type.coin_reward)
            .await?;

        tx.commit().await?;

        self.award_service
            .after_conquest_committed(donation.donor_id, &outcome.granted)
            .await;
        rewards_metrics::record_donation_validated("approved");

        info!(
            donation_id = donation_id,
            donor_id = donation.donor_id,
            coin_reward = donation_type.coin_reward,
            balance = outcome.balance,
            granted = outcome.granted.len(),
            "捐赠已批准"
        );

        let granted_badges: Vec<String> = outcome.granted.iter().map(|b| b.name.clone()).collect();
        let mut message = format!(
            "捐赠已批准，捐赠人获得 {} 金币",
            donation_type.coin_reward
        );
        if !granted_badges.is_empty() {
            message.push_str(&format!("，新获得徽章: {}", granted_badges.join("、")));
        }

        Ok(ApproveDonationResponse {
            success: true,
            message,
            donation_id,
            coin_reward: donation_type.coin_reward,
            balance: outcome.balance,
            granted_badges,
        })
    }

    /// 拒绝捐赠
    ///
    /// 原因为空时直接失败，不开启事务
    #[instrument(skip(self, admin, reason), fields(admin_id = admin.account_id()))]
    pub async fn reject(
        &self,
        donation_id: i64,
        admin: &AdminPrincipal,
        reason: Option<&str>,
    ) -> Result<RejectDonationResponse> {
        let reason = normalize_rejection_reason(reason)?;

        let mut tx = self.pool.begin().await?;

        let donation = DonationRepository::get_donation_for_update(&mut tx, donation_id)
            .await?
            .ok_or(RewardsError::DonationNotFound(donation_id))?;

        if let Err(e) = ensure_transition(&donation, DonationStatus::Rejected) {
            warn!(donation_id = donation_id, status = donation.status.as_str(), "捐赠已审核，拒绝重复审核");
            return Err(e);
        }

        DonationRepository::mark_validated_in_tx(
            &mut tx,
            donation_id,
            DonationStatus::Rejected,
            Some(&reason),
            admin.account_id(),
        )
        .await?
        .ok_or(RewardsError::ConcurrencyConflict)?;

        tx.commit().await?;

        rewards_metrics::record_donation_validated("rejected");
        info!(
            donation_id = donation_id,
            donor_id = donation.donor_id,
            reason = %reason,
            "捐赠已拒绝"
        );

        Ok(RejectDonationResponse {
            success: true,
            message: "捐赠已拒绝".to_string(),
            donation_id,
            reason,
        })
    }
}
