//! 调用方身份
//!
//! 身份认证由外部完成，这里只描述已认证的调用方以及管理员能力检查。
//! 所有仅限管理员的操作都接收 [`AdminPrincipal`]，调用处必须显式完成检查。

use serde::{Deserialize, Serialize};

use crate::error::{Result, RewardsError};
use crate::models::Account;

/// 已认证的调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: i64,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Principal {
    pub fn new(account_id: i64, is_active: bool, is_staff: bool, is_superuser: bool) -> Self {
        Self {
            account_id,
            is_active,
            is_staff,
            is_superuser,
        }
    }

    /// 普通成员
    pub fn member(account_id: i64) -> Self {
        Self::new(account_id, true, false, false)
    }

    pub fn is_admin(&self) -> bool {
        self.is_active && (self.is_staff || self.is_superuser)
    }

    /// 检查管理员能力
    pub fn require_admin(&self) -> Result<AdminPrincipal> {
        if self.is_admin() {
            Ok(AdminPrincipal(*self))
        } else {
            Err(RewardsError::Forbidden)
        }
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self::new(
            account.id,
            account.is_active,
            account.is_staff,
            account.is_superuser,
        )
    }
}

/// 已通过管理员检查的调用方
///
/// 只能通过 [`Principal::require_admin`] 构造
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminPrincipal(Principal);

impl AdminPrincipal {
    pub fn account_id(&self) -> i64 {
        self.0.account_id
    }

    pub fn principal(&self) -> &Principal {
        &self.0
    }
}
