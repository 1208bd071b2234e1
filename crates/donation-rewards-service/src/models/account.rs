//! 账户实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Role;

/// 账户
///
/// `coin_balance` 只在两个原子操作中变更：捐赠批准入账、徽章购买扣款
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    /// 可进入管理后台
    pub is_staff: bool,
    pub is_superuser: bool,
    /// 当前可用金币
    pub coin_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// 是否具备管理员能力
    pub fn is_admin(&self) -> bool {
        self.is_active && (self.is_staff || self.is_superuser)
    }

    pub fn role(&self) -> Role {
        if self.is_staff { Role::Admin } else { Role::Member }
    }

    /// 余额是否足以支付
    pub fn can_afford(&self, cost: i64) -> bool {
        self.coin_balance >= cost
    }
}

/// 新建账户
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}
