//! 徽章查询服务
//!
//! 提供徽章目录与账户持有徽章的只读查询，下线徽章不出现在结果中

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::Result;
use crate::repository::{AccountBadgeRepositoryTrait, BadgeRepositoryTrait};
use crate::service::dto::{AccountBadgeView, BadgeView};

/// 徽章查询服务
pub struct BadgeQueryService<BR, ABR>
where
    BR: BadgeRepositoryTrait,
    ABR: AccountBadgeRepositoryTrait,
{
    badge_repo: Arc<BR>,
    account_badge_repo: Arc<ABR>,
}

impl<BR, ABR> BadgeQueryService<BR, ABR>
where
    BR: BadgeRepositoryTrait,
    ABR: AccountBadgeRepositoryTrait,
{
    pub fn new(badge_repo: Arc<BR>, account_badge_repo: Arc<ABR>) -> Self {
        Self {
            badge_repo,
            account_badge_repo,
        }
    }

    /// 全部上线徽章（按类型、价格排序）
    #[instrument(skip(self))]
    pub async fn list_active_badges(&self) -> Result<Vec<BadgeView>> {
        let badges = self.badge_repo.list_active_badges().await?;
        Ok(badges
            .iter()
            .filter(|b| b.active)
            .map(BadgeView::from)
            .collect())
    }

    /// 账户持有的徽章（最新获得在前）
    #[instrument(skip(self))]
    pub async fn list_account_badges(&self, account_id: i64) -> Result<Vec<AccountBadgeView>> {
        let owned = self.account_badge_repo.list_owned_badges(account_id).await?;
        info!(account_id = account_id, count = owned.len(), "Fetched account badges");
        Ok(owned.iter().map(AccountBadgeView::from).collect())
    }

    /// 账户尚未持有的在售购买徽章
    #[instrument(skip(self))]
    pub async fn list_purchasable_badges(&self, account_id: i64) -> Result<Vec<BadgeView>> {
        let badges = self
            .badge_repo
            .list_purchasable_for_account(account_id)
            .await?;
        Ok(badges
            .iter()
            .filter(|b| b.is_purchasable())
            .map(BadgeView::from)
            .collect())
    }

    /// 账户是否持有徽章
    pub async fn owns_badge(&self, account_id: i64, badge_id: i64) -> Result<bool> {
        self.account_badge_repo.has_badge(account_id, badge_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AwardSource, Badge, BadgeKind, OwnedBadge};
    use crate::repository::{MockAccountBadgeRepositoryTrait, MockBadgeRepositoryTrait};
    use chrono::{Duration, Utc};

    fn create_test_badge(id: i64, kind: BadgeKind, cost: i64) -> Badge {
        Badge {
            id,
            name: format!("Badge {}", id),
            description: "Test badge".to_string(),
            icon_ref: Some(format!("badges/{}.png", id)),
            kind,
            coin_cost: cost,
            donation_count_threshold: None,
            coin_balance_threshold: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn service(
        badge_repo: MockBadgeRepositoryTrait,
        account_badge_repo: MockAccountBadgeRepositoryTrait,
    ) -> BadgeQueryService<MockBadgeRepositoryTrait, MockAccountBadgeRepositoryTrait> {
        BadgeQueryService::new(Arc::new(badge_repo), Arc::new(account_badge_repo))
    }

    #[tokio::test]
    async fn test_list_active_badges() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo.expect_list_active_badges().returning(|| {
            Ok(vec![
                create_test_badge(1, BadgeKind::Conquest, 0),
                create_test_badge(2, BadgeKind::Purchase, 300),
                create_test_badge(3, BadgeKind::Purchase, 800),
            ])
        });

        let views = service(badge_repo, MockAccountBadgeRepositoryTrait::new())
            .list_active_badges()
            .await
            .unwrap();

        let ids: Vec<i64> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(views[1].kind, BadgeKind::Purchase);
        assert_eq!(views[2].coin_cost, 800);
    }

    #[tokio::test]
    async fn test_list_account_badges() {
        let mut account_badge_repo = MockAccountBadgeRepositoryTrait::new();
        account_badge_repo
            .expect_list_owned_badges()
            .withf(|id| *id == 7)
            .returning(|_| {
                Ok(vec![
                    OwnedBadge {
                        account_badge_id: 20,
                        source: AwardSource::Purchase,
                        awarded_at: Utc::now(),
                        badge: create_test_badge(2, BadgeKind::Purchase, 300),
                    },
                    OwnedBadge {
                        account_badge_id: 10,
                        source: AwardSource::Conquest,
                        awarded_at: Utc::now() - Duration::days(1),
                        badge: create_test_badge(1, BadgeKind::Conquest, 0),
                    },
                ])
            });

        let views = service(MockBadgeRepositoryTrait::new(), account_badge_repo)
            .list_account_badges(7)
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].source, AwardSource::Purchase);
        assert_eq!(views[1].badge.name, "Badge 1");
    }

    #[tokio::test]
    async fn test_list_purchasable_badges() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo
            .expect_list_purchasable_for_account()
            .withf(|id| *id == 7)
            .returning(|_| Ok(vec![create_test_badge(3, BadgeKind::Purchase, 800)]));

        let views = service(badge_repo, MockAccountBadgeRepositoryTrait::new())
            .list_purchasable_badges(7)
            .await
            .unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, 3);
    }

    #[tokio::test]
    async fn test_owns_badge() {
        let mut account_badge_repo = MockAccountBadgeRepositoryTrait::new();
        account_badge_repo
            .expect_has_badge()
            .returning(|account_id, badge_id| Ok(account_id == 7 && badge_id == 3));

        let svc = service(MockBadgeRepositoryTrait::new(), account_badge_repo);
        assert!(svc.owns_badge(7, 3).await.unwrap());
        assert!(!svc.owns_badge(7, 4).await.unwrap());
    }
}
