//! 捐赠服务
//!
//! 提交捐赠、查询捐赠历史与待审核列表。审核由 [`ValidationService`](super::ValidationService) 负责。

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use rewards_shared::observability::metrics as rewards_metrics;

use crate::auth::{AdminPrincipal, Principal};
use crate::error::{Result, RewardsError};
use crate::models::{Donation, DonationStatus, DonationType, NewDonation};
use crate::repository::DonationRepositoryTrait;
use crate::service::dto::{DonationView, SubmitDonationRequest};

/// 捐赠服务
pub struct DonationService<DR>
where
    DR: DonationRepositoryTrait,
{
    donation_repo: Arc<DR>,
}

impl<DR> DonationService<DR>
where
    DR: DonationRepositoryTrait,
{
    pub fn new(donation_repo: Arc<DR>) -> Self {
        Self { donation_repo }
    }

    /// 提交捐赠
    ///
    /// 新捐赠状态为 Pending，等待管理员审核
    #[instrument(skip(self, request), fields(donor_id = donor.account_id, donation_type_id = request.donation_type_id))]
    pub async fn submit_donation(
        &self,
        donor: &Principal,
        request: SubmitDonationRequest,
    ) -> Result<Donation> {
        if !donor.is_active {
            return Err(RewardsError::Forbidden);
        }

        request.validate()?;

        let evidence_ref = request.evidence_ref.trim();
        if evidence_ref.is_empty() {
            return Err(RewardsError::validation("evidence_ref", "必须提供捐赠证据"));
        }

        self.donation_repo
            .get_donation_type(request.donation_type_id)
            .await?
            .ok_or(RewardsError::DonationTypeNotFound(request.donation_type_id))?;

        let new_donation = NewDonation {
            donor_id: donor.account_id,
            donation_type_id: request.donation_type_id,
            evidence_ref: evidence_ref.to_string(),
            description: request.normalized_description(),
        };

        let donation = self.donation_repo.create_donation(&new_donation).await?;

        rewards_metrics::record_donation_submitted();
        info!(donation_id = donation.id, "捐赠已提交，等待审核");

        Ok(donation)
    }

    /// 查询捐赠人自己的捐赠记录（最新在前）
    #[instrument(skip(self), fields(donor_id = donor.account_id))]
    pub async fn list_history(
        &self,
        donor: &Principal,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationView>> {
        let details = self
            .donation_repo
            .list_by_donor(donor.account_id, status)
            .await?;

        Ok(details.into_iter().map(DonationView::from).collect())
    }

    /// 查询全部待审核捐赠（最早提交在前）
    #[instrument(skip(self, admin), fields(admin_id = admin.account_id()))]
    pub async fn list_pending(&self, admin: &AdminPrincipal) -> Result<Vec<DonationView>> {
        let details = self.donation_repo.list_pending().await?;
        Ok(details.into_iter().map(DonationView::from).collect())
    }

    /// 捐赠类型目录（按名称排序）
    pub async fn list_donation_types(&self) -> Result<Vec<DonationType>> {
        self.donation_repo.list_donation_types().await
    }

    /// 获取单个捐赠
    #[instrument(skip(self))]
    pub async fn get_donation(&self, donation_id: i64) -> Result<DonationView> {
        self.donation_repo
            .get_donation_detail(donation_id)
            .await?
            .map(DonationView::from)
            .ok_or(RewardsError::DonationNotFound(donation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DonationDetail;
    use crate::repository::MockDonationRepositoryTrait;
    use chrono::{Duration, Utc};
    use fake::Fake;
    use fake::faker::internet::en::Username;

    fn donation_type(id: i64, reward: i64) -> DonationType {
        DonationType {
            id,
            name: "Garrafa PET".to_string(),
            coin_reward: reward,
            created_at: Utc::now(),
        }
    }

    fn detail(id: i64, donor_id: i64, status: DonationStatus, minutes_ago: i64) -> DonationDetail {
        DonationDetail {
            id,
            donor_id,
            donor_username: Username().fake(),
            donation_type_id: 1,
            donation_type_name: "Garrafa PET".to_string(),
            coin_reward: 50,
            status,
            evidence_ref: format!("evidencias/{}.jpg", id),
            description: None,
            rejection_reason: None,
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
            validated_at: None,
            validated_by_username: None,
        }
    }

    fn request(type_id: i64, description: Option<&str>) -> SubmitDonationRequest {
        SubmitDonationRequest {
            donation_type_id: type_id,
            evidence_ref: "evidencias/nova.jpg".to_string(),
            description: description.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_submit_donation_creates_pending() {
        let mut repo = MockDonationRepositoryTrait::new();
        repo.expect_get_donation_type()
            .withf(|id| *id == 1)
            .returning(|id| Ok(Some(donation_type(id, 50))));
        repo.expect_create_donation()
            .withf(|d| {
                d.donor_id == 5
                    && d.description.as_deref() == Some("dez garrafas lavadas")
                    && d.evidence_ref == "evidencias/nova.jpg"
            })
            .times(1)
            .returning(|d| {
                Ok(Donation {
                    id: 99,
                    donor_id: d.donor_id,
                    donation_type_id: d.donation_type_id,
                    status: DonationStatus::Pending,
                    evidence_ref: d.evidence_ref.clone(),
                    description: d.description.clone(),
                    rejection_reason: None,
                    submitted_at: Utc::now(),
                    validated_at: None,
                    validated_by: None,
                })
            });

        let service = DonationService::new(Arc::new(repo));
        let donation = service
            .submit_donation(
                &Principal::member(5),
                request(1, Some("  dez garrafas lavadas  ")),
            )
            .await
            .unwrap();

        assert_eq!(donation.id, 99);
        assert!(donation.is_pending());
        assert!(donation.validated_at.is_none());
    }

    #[tokio::test]
    async fn test_submit_donation_unknown_type() {
        let mut repo = MockDonationRepositoryTrait::new();
        repo.expect_get_donation_type().returning(|_| Ok(None));
        repo.expect_create_donation().never();

        let service = DonationService::new(Arc::new(repo));
        let err = service
            .submit_donation(&Principal::member(5), request(42, None))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "DONATION_TYPE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_submit_donation_rejects_short_description() {
        let mut repo = MockDonationRepositoryTrait::new();
        repo.expect_get_donation_type().never();
        repo.expect_create_donation().never();

        let service = DonationService::new(Arc::new(repo));
        let err = service
            .submit_donation(&Principal::member(5), request(1, Some("curta")))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.field(), Some("description"));
    }

    #[tokio::test]
    async fn test_submit_donation_requires_active_donor() {
        let repo = MockDonationRepositoryTrait::new();
        let service = DonationService::new(Arc::new(repo));

        let inactive = Principal::new(5, false, false, false);
        let err = service
            .submit_donation(&inactive, request(1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, RewardsError::Forbidden));
    }

    #[tokio::test]
    async fn test_list_history_passes_filter() {
        let mut repo = MockDonationRepositoryTrait::new();
        repo.expect_list_by_donor()
            .withf(|donor_id, status| *donor_id == 5 && *status == Some(DonationStatus::Approved))
            .returning(|donor_id, _| {
                Ok(vec![
                    detail(2, donor_id, DonationStatus::Approved, 1),
                    detail(1, donor_id, DonationStatus::Approved, 60),
                ])
            });

        let service = DonationService::new(Arc::new(repo));
        let views = service
            .list_history(&Principal::member(5), Some(DonationStatus::Approved))
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, 2);
        assert!(views.iter().all(|v| v.status == DonationStatus::Approved));
    }

    #[tokio::test]
    async fn test_list_pending_requires_admin_principal() {
        let mut repo = MockDonationRepositoryTrait::new();
        repo.expect_list_pending()
            .returning(|| Ok(vec![detail(1, 3, DonationStatus::Pending, 30)]));

        let service = DonationService::new(Arc::new(repo));
        let admin = Principal::new(1, true, true, false).require_admin().unwrap();
        let views = service.list_pending(&admin).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].status, DonationStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_donation_not_found() {
        let mut repo = MockDonationRepositoryTrait::new();
        repo.expect_get_donation_detail().returning(|_| Ok(None));

        let service = DonationService::new(Arc::new(repo));
        let err = service.get_donation(404).await.unwrap_err();
        assert_eq!(err.error_code(), "DONATION_NOT_FOUND");
        assert_eq!(err.http_status(), 404);
    }
}
