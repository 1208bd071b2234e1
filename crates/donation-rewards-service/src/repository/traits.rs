//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试。
//! 需要行级锁的事务操作以关联函数形式定义在具体仓储上，不在 trait 中。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Account, Badge, Donation, DonationDetail, DonationStatus, DonationType, NewAccount,
    NewDonation, OwnedBadge,
};

/// 账户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    async fn get_account(&self, id: i64) -> Result<Option<Account>>;
    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    /// 用户名已存在时返回 None
    async fn create_account(&self, account: &NewAccount) -> Result<Option<Account>>;
}

/// 捐赠仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationRepositoryTrait: Send + Sync {
    // 捐赠类型
    async fn get_donation_type(&self, id: i64) -> Result<Option<DonationType>>;
    async fn list_donation_types(&self) -> Result<Vec<DonationType>>;

    // 捐赠
    async fn get_donation(&self, id: i64) -> Result<Option<Donation>>;
    async fn get_donation_detail(&self, id: i64) -> Result<Option<DonationDetail>>;
    async fn create_donation(&self, donation: &NewDonation) -> Result<Donation>;
    async fn list_by_donor(
        &self,
        donor_id: i64,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationDetail>>;
    async fn list_pending(&self) -> Result<Vec<DonationDetail>>;
}

/// 徽章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepositoryTrait: Send + Sync {
    async fn get_badge(&self, id: i64) -> Result<Option<Badge>>;
    async fn list_active_badges(&self) -> Result<Vec<Badge>>;
    /// 账户尚未持有的在售购买徽章
    async fn list_purchasable_for_account(&self, account_id: i64) -> Result<Vec<Badge>>;
}

/// 账户徽章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountBadgeRepositoryTrait: Send + Sync {
    async fn has_badge(&self, account_id: i64, badge_id: i64) -> Result<bool>;
    async fn list_owned_badges(&self, account_id: i64) -> Result<Vec<OwnedBadge>>;
}
