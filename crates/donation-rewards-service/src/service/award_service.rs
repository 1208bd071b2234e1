//! 徽章授予服务
//!
//! 处理金币入账、成就徽章评估与购买徽章的核心业务逻辑，包括：
//! - 成就徽章评估（捐赠次数或金币门槛任一满足即授予）
//! - 批准入账与成就评估在同一事务内完成
//! - 徽章购买（前置检查、扣款、写入持有记录）
//! - 幂等处理（持有关系唯一，重复授予不产生新记录）
//!
//! ## 购买流程
//!
//! 1. 读取徽章 -> 2. 锁定账户 -> 3. 可购买检查 -> 4. 持有检查
//!    -> 5. 余额检查 -> 6. 扣款并写入持有记录 -> 7. 提交 -> 8. 缓存失效
//!
//! 任一检查失败都在写入前返回结构化结果，事务回滚，不产生任何变更。

use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use rewards_shared::cache::{Cache, CacheKey};
use rewards_shared::config::CoinThresholdMeasure;
use rewards_shared::observability::metrics as rewards_metrics;

use crate::error::{Result, RewardsError};
use crate::models::{Account, AwardSource, Badge, DonorProgress, select_conquest_grants};
use crate::repository::{
    AccountBadgeRepository, AccountRepository, BadgeRepository, BadgeRepositoryTrait,
    DonationRepository,
};
use crate::service::dto::{CreditOutcome, PurchaseBadgeResponse, PurchaseCode};

/// 购买前置检查
///
/// 按顺序检查：徽章可购买 -> 未持有 -> 余额充足，第一个失败即返回
pub fn check_purchase_eligibility(
    badge_id: i64,
    badge: Option<&Badge>,
    account: &Account,
    already_owned: bool,
) -> Result<()> {
    let badge = match badge {
        Some(b) if b.is_purchasable() => b,
        _ => return Err(RewardsError::BadgeNotAvailable(badge_id)),
    };

    if already_owned {
        return Err(RewardsError::AlreadyOwned(badge.id));
    }

    if !account.can_afford(badge.coin_cost) {
        return Err(RewardsError::InsufficientBalance {
            required: badge.coin_cost,
            available: account.coin_balance,
        });
    }

    Ok(())
}

/// 徽章授予服务
///
/// 成就评估与购买都在单个事务内完成，账户行先加锁再读取余额。
/// 数据库的序列化失败、死锁以及唯一约束竞争都会转换为可重试的并发冲突。
pub struct BadgeAwardService<BR>
where
    BR: BadgeRepositoryTrait,
{
    badge_repo: Arc<BR>,
    cache: Arc<Cache>,
    pool: PgPool,
    /// 金币门槛的比较口径
    measure: CoinThresholdMeasure,
}

impl<BR> BadgeAwardService<BR>
where
    BR: BadgeRepositoryTrait,
{
    pub fn new(
        badge_repo: Arc<BR>,
        cache: Arc<Cache>,
        pool: PgPool,
        measure: CoinThresholdMeasure,
    ) -> Self {
        Self {
            badge_repo,
            cache,
            pool,
            measure,
        }
    }

    pub fn measure(&self) -> CoinThresholdMeasure {
        self.measure
    }

    /// 评估并授予成就徽章
    ///
    /// 只授予尚未持有的上线成就徽章，不变更余额。重复调用不会重复授予。
    #[instrument(skip(self))]
    pub async fn evaluate_conquest_badges(&self, account_id: i64) -> Result<Vec<Badge>> {
        let mut tx = self.pool.begin().await?;

        let account = AccountRepository::get_account_for_update(&mut tx, account_id)
            .await?
            .ok_or(RewardsError::AccountNotFound(account_id))?;

        let granted = self
            .grant_conquest_in_tx(&mut tx, account_id, account.coin_balance)
            .await?;

        tx.commit().await?;

        self.after_conquest_committed(account_id, &granted).await;

        Ok(granted)
    }

    /// 入账并评估成就徽章
    ///
    /// 在调用方的事务内执行：锁定账户、入账（奖励为 0 时不写余额）、
    /// 基于入账后的状态评估成就徽章。调用方提交后须调用
    /// [`after_conquest_committed`](Self::after_conquest_committed)。
    #[instrument(skip(self, tx))]
    pub async fn credit_and_evaluate(
        &self,
        tx: &mut PgConnection,
        account_id: i64,
        coin_reward: i64,
    ) -> Result<CreditOutcome> {
        if coin_reward < 0 {
            return Err(RewardsError::Internal(format!(
                "入账金额不能为负数: {}",
                coin_reward
            )));
        }

        let account = AccountRepository::get_account_for_update(&mut *tx, account_id)
            .await?
            .ok_or(RewardsError::AccountNotFound(account_id))?;

        let balance = if coin_reward > 0 {
            AccountRepository::adjust_balance_in_tx(&mut *tx, account_id, coin_reward).await?
        } else {
            account.coin_balance
        };

        let granted = self.grant_conquest_in_tx(tx, account_id, balance).await?;

        Ok(CreditOutcome { balance, granted })
    }

    /// 成就授予提交后的收尾：缓存失效、指标、日志
    pub async fn after_conquest_committed(&self, account_id: i64, granted: &[Badge]) {
        self.invalidate_dashboard(account_id).await;

        if !granted.is_empty() {
            rewards_metrics::record_badges_granted("conquest", granted.len() as u64);
            info!(
                account_id = account_id,
                badges = ?granted.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
                "成就徽章已授予"
            );
        }
    }

    /// 购买徽章
    ///
    /// 业务失败（不可购买、已持有、余额不足）以结构化结果返回，
    /// 只有基础设施错误和并发冲突返回 Err
    #[instrument(skip(self))]
    pub async fn purchase_badge(
        &self,
        account_id: i64,
        badge_id: i64,
    ) -> Result<PurchaseBadgeResponse> {
        let badge = self.badge_repo.get_badge(badge_id).await?;

        let mut tx = self.pool.begin().await?;

        let account = AccountRepository::get_account_for_update(&mut tx, account_id)
            .await?
            .ok_or(RewardsError::AccountNotFound(account_id))?;

        let already_owned =
            AccountBadgeRepository::has_badge_in_tx(&mut tx, account_id, badge_id).await?;

        if let Err(e) = check_purchase_eligibility(badge_id, badge.as_ref(), &account, already_owned)
        {
            // 未写入任何数据，事务随 tx drop 回滚
            return Self::refuse_purchase(account_id, badge_id, e);
        }
        let badge = badge.ok_or(RewardsError::BadgeNotAvailable(badge_id))?;

        let remaining =
            AccountRepository::adjust_balance_in_tx(&mut tx, account_id, -badge.coin_cost).await?;

        // 账户行已加锁，插入失败只可能来自锁外的并发写入
        AccountBadgeRepository::insert_in_tx(&mut tx, account_id, badge.id, AwardSource::Purchase)
            .await?
            .ok_or(RewardsError::ConcurrencyConflict)?;

        tx.commit().await?;

        self.invalidate_dashboard(account_id).await;
        rewards_metrics::record_badge_purchase(PurchaseCode::PurchaseOk.as_str());
        rewards_metrics::record_badges_granted("purchase", 1);

        info!(
            account_id = account_id,
            badge_id = badge.id,
            cost = badge.coin_cost,
            remaining_balance = remaining,
            "徽章购买成功"
        );

        Ok(PurchaseBadgeResponse::purchased(&badge, remaining))
    }

    /// 清除账户面板缓存
    ///
    /// 缓存失败不影响主流程
    pub async fn invalidate_dashboard(&self, account_id: i64) {
        let key = CacheKey::dashboard(account_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(account_id = account_id, error = %e, "清除面板缓存失败");
        }
    }

    // ==================== 私有方法 ====================

    /// 在事务中评估并写入成就徽章
    ///
    /// `current_balance` 为本事务内已锁定账户的最新余额
    async fn grant_conquest_in_tx(
        &self,
        tx: &mut PgConnection,
        account_id: i64,
        current_balance: i64,
    ) -> Result<Vec<Badge>> {
        let (approved_donations, lifetime_earned) =
            DonationRepository::approved_totals_in_tx(&mut *tx, account_id).await?;

        let progress = DonorProgress {
            approved_donations,
            current_balance,
            lifetime_earned,
        };

        let candidates =
            BadgeRepository::list_conquest_candidates_in_tx(&mut *tx, account_id).await?;

        let mut granted = Vec::new();
        for badge in select_conquest_grants(&candidates, &progress, self.measure) {
            let inserted = AccountBadgeRepository::insert_in_tx(
                &mut *tx,
                account_id,
                badge.id,
                AwardSource::Conquest,
            )
            .await?;

            // 只有真正写入的记录才算新授予
            if inserted.is_some() {
                granted.push(badge.clone());
            }
        }

        Ok(granted)
    }

    /// 将前置检查失败转换为购买结果，其他错误继续上抛
    fn refuse_purchase(
        account_id: i64,
        badge_id: i64,
        err: RewardsError,
    ) -> Result<PurchaseBadgeResponse> {
        let Some(code) = PurchaseCode::from_error(&err) else {
            return Err(err);
        };

        rewards_metrics::record_badge_purchase(code.as_str());
        warn!(
            account_id = account_id,
            badge_id = badge_id,
            code = code.as_str(),
            reason = %err,
            "徽章购买被拒绝"
        );

        Ok(PurchaseBadgeResponse::refused(code, &err))
    }
}
