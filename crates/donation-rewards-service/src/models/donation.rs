//! 捐赠相关实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::DonationStatus;

/// 捐赠类型
///
/// 定义每种回收物批准后奖励的金币数，服务层只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DonationType {
    pub id: i64,
    pub name: String,
    pub coin_reward: i64,
    pub created_at: DateTime<Utc>,
}

/// 捐赠
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: i64,
    pub donor_id: i64,
    pub donation_type_id: i64,
    pub status: DonationStatus,
    /// 证据照片引用（URL 或存储键），内容不做校验
    pub evidence_ref: String,
    #[sqlx(default)]
    pub description: Option<String>,
    /// 拒绝原因，状态为 Rejected 时必填
    #[sqlx(default)]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// 离开 Pending 时写入，之后不再变化
    #[sqlx(default)]
    pub validated_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub validated_by: Option<i64>,
}

impl Donation {
    pub fn is_pending(&self) -> bool {
        self.status == DonationStatus::Pending
    }
}

/// 新建捐赠
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_id: i64,
    pub donation_type_id: i64,
    pub evidence_ref: String,
    pub description: Option<String>,
}

/// 捐赠及其关联名称
///
/// 列表查询时一次 JOIN 取回，供展示投影使用
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DonationDetail {
    pub id: i64,
    pub donor_id: i64,
    pub donor_username: String,
    pub donation_type_id: i64,
    pub donation_type_name: String,
    pub coin_reward: i64,
    pub status: DonationStatus,
    pub evidence_ref: String,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[sqlx(default)]
    pub validated_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub validated_by_username: Option<String>,
}
