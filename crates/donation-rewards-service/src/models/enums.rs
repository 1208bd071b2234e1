//! 枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 捐赠状态
///
/// 只允许 Pending -> Approved / Rejected 的一次性迁移，两个终态都不可再变更
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    /// 待审核 - 提交后的初始状态
    #[default]
    Pending,
    /// 已批准 - 已为捐赠人发放金币
    Approved,
    /// 已拒绝 - 必须附带拒绝原因
    Rejected,
}

impl DonationStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// 判断能否迁移到目标状态
    pub fn can_transition_to(&self, target: DonationStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// 徽章类型
///
/// 决定徽章的获取方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeKind {
    /// 成就徽章 - 满足捐赠次数或金币门槛时自动授予
    #[default]
    Conquest,
    /// 购买徽章 - 使用金币兑换，从不自动授予
    Purchase,
    /// 特殊徽章 - 仅由运营手工处理
    Special,
}

impl BadgeKind {
    /// 展示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Conquest => "自动成就",
            Self::Purchase => "金币购买",
            Self::Special => "特殊徽章",
        }
    }
}

/// 徽章获得来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AwardSource {
    /// 成就评估自动授予
    Conquest,
    /// 金币购买
    Purchase,
}

impl AwardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conquest => "CONQUEST",
            Self::Purchase => "PURCHASE",
        }
    }
}

/// 账户角色（展示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Member,
}
