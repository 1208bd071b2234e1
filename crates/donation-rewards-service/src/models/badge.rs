//! 徽章相关实体定义
//!
//! 包含徽章定义、账户持有记录，以及成就徽章的达成判定

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rewards_shared::config::CoinThresholdMeasure;

use super::enums::{AwardSource, BadgeKind};

/// 徽章定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(default)]
    pub icon_ref: Option<String>,
    pub kind: BadgeKind,
    /// 购买价格，仅 Purchase 类型有意义
    pub coin_cost: i64,
    /// 所需已批准捐赠次数，仅 Conquest 类型有意义
    #[sqlx(default)]
    pub donation_count_threshold: Option<i64>,
    /// 所需金币，仅 Conquest 类型有意义，比较口径见 [`CoinThresholdMeasure`]
    #[sqlx(default)]
    pub coin_balance_threshold: Option<i64>,
    /// 下线的徽章不参与展示、评估和购买
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Badge {
    /// 是否可被购买
    pub fn is_purchasable(&self) -> bool {
        self.active && self.kind == BadgeKind::Purchase
    }

    /// 是否参与成就评估
    pub fn is_conquest_candidate(&self) -> bool {
        self.active && self.kind == BadgeKind::Conquest
    }

    /// 生效的捐赠次数门槛（0 及负数视为未设置）
    fn effective_donation_threshold(&self) -> Option<i64> {
        self.donation_count_threshold.filter(|t| *t > 0)
    }

    /// 生效的金币门槛（0 及负数视为未设置）
    fn effective_coin_threshold(&self) -> Option<i64> {
        self.coin_balance_threshold.filter(|t| *t > 0)
    }

    /// 判断成就条件是否满足
    ///
    /// 任一门槛达成即满足；两个门槛都未设置的徽章永远不会自动授予
    pub fn conquest_met(&self, progress: &DonorProgress, measure: CoinThresholdMeasure) -> bool {
        let by_donations = self
            .effective_donation_threshold()
            .is_some_and(|t| progress.approved_donations >= t);
        let by_coins = self
            .effective_coin_threshold()
            .is_some_and(|t| progress.coin_measure(measure) >= t);

        by_donations || by_coins
    }
}

/// 捐赠人进度快照
///
/// 在同一事务内采集，作为成就判定的输入
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorProgress {
    /// 已批准的捐赠次数
    pub approved_donations: i64,
    /// 当前可用余额
    pub current_balance: i64,
    /// 已批准捐赠累计获得的金币
    pub lifetime_earned: i64,
}

impl DonorProgress {
    /// 按配置口径返回用于金币门槛比较的数值
    pub fn coin_measure(&self, measure: CoinThresholdMeasure) -> i64 {
        match measure {
            CoinThresholdMeasure::CurrentBalance => self.current_balance,
            CoinThresholdMeasure::LifetimeEarned => self.lifetime_earned,
        }
    }
}

/// 从候选徽章中挑出满足条件的成就徽章
///
/// 调用方负责排除已持有的徽章；这里仍会跳过非成就或已下线的徽章
pub fn select_conquest_grants<'a>(
    candidates: &'a [Badge],
    progress: &DonorProgress,
    measure: CoinThresholdMeasure,
) -> Vec<&'a Badge> {
    candidates
        .iter()
        .filter(|b| b.is_conquest_candidate() && b.conquest_met(progress, measure))
        .collect()
}

/// 账户持有徽章
///
/// (account_id, badge_id) 唯一，同一徽章不能重复持有
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountBadge {
    pub id: i64,
    pub account_id: i64,
    pub badge_id: i64,
    pub source: AwardSource,
    pub awarded_at: DateTime<Utc>,
}

/// 账户持有徽章及徽章定义
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedBadge {
    pub account_badge_id: i64,
    pub source: AwardSource,
    pub awarded_at: DateTime<Utc>,
    pub badge: Badge,
}
