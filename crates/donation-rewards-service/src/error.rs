//! 捐赠奖励服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use rewards_shared::error::SharedError;
use thiserror::Error;

use crate::models::DonationStatus;

/// 并发冲突对应的 SQLSTATE：序列化失败、死锁、唯一约束竞争
const CONFLICT_SQLSTATES: [&str; 3] = ["40001", "40P01", "23505"];

/// 捐赠奖励服务错误类型
#[derive(Debug, Error)]
pub enum RewardsError {
    // === 审核相关错误 ===
    #[error("捐赠已审核: donation_id={donation_id}, status={}", .status.as_str())]
    AlreadyValidated {
        donation_id: i64,
        status: DonationStatus,
    },

    #[error("拒绝捐赠时必须填写原因")]
    MissingRejectionReason,

    #[error("捐赠不存在: {0}")]
    DonationNotFound(i64),

    #[error("捐赠类型不存在: {0}")]
    DonationTypeNotFound(i64),

    // === 徽章购买相关错误 ===
    #[error("徽章不可购买: badge_id={0}")]
    BadgeNotAvailable(i64),

    #[error("已拥有该徽章: badge_id={0}")]
    AlreadyOwned(i64),

    #[error("金币不足: 需要 {required}, 可用 {available}")]
    InsufficientBalance { required: i64, available: i64 },

    // === 账户相关错误 ===
    #[error("账户不存在: {0}")]
    AccountNotFound(i64),

    #[error("无权执行该操作")]
    Forbidden,

    #[error("参数校验失败: {field}: {message}")]
    Validation { field: String, message: String },

    // === 系统错误 ===
    #[error("并发冲突，请重试")]
    ConcurrencyConflict,

    #[error("数据库错误: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Shared(#[from] SharedError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 捐赠奖励服务 Result 类型别名
pub type Result<T> = std::result::Result<T, RewardsError>;

impl From<sqlx::Error> for RewardsError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && let Some(code) = db_err.code()
            && CONFLICT_SQLSTATES.contains(&code.as_ref())
        {
            return Self::ConcurrencyConflict;
        }
        Self::Database(err)
    }
}

impl From<validator::ValidationErrors> for RewardsError {
    /// 取第一个字段错误作为字段级错误返回
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors.field_errors().into_iter().next().map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "取值不合法".to_string());
            (field.to_string(), message)
        });

        match first {
            Some((field, message)) => Self::Validation { field, message },
            None => Self::Validation {
                field: "non_field_errors".to_string(),
                message: errors.to_string(),
            },
        }
    }
}

impl RewardsError {
    /// 构造字段级校验错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConcurrencyConflict | Self::Database(_) => true,
            Self::Shared(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::ConcurrencyConflict | Self::Database(_) | Self::Shared(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyValidated { .. } => "ALREADY_VALIDATED",
            Self::MissingRejectionReason => "MISSING_REJECTION_REASON",
            Self::DonationNotFound(_) => "DONATION_NOT_FOUND",
            Self::DonationTypeNotFound(_) => "DONATION_TYPE_NOT_FOUND",
            Self::BadgeNotAvailable(_) => "BADGE_NOT_AVAILABLE",
            Self::AlreadyOwned(_) => "ALREADY_OWNED",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Shared(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 对应的 HTTP 状态码
    ///
    /// 金币不足使用 402，与普通参数错误区分
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AlreadyValidated { .. }
            | Self::MissingRejectionReason
            | Self::BadgeNotAvailable(_)
            | Self::AlreadyOwned(_)
            | Self::Validation { .. } => 400,
            Self::InsufficientBalance { .. } => 402,
            Self::Forbidden => 403,
            Self::DonationNotFound(_) | Self::DonationTypeNotFound(_) | Self::AccountNotFound(_) => {
                404
            }
            Self::ConcurrencyConflict => 409,
            Self::Database(_) | Self::Shared(_) | Self::Internal(_) => 500,
        }
    }

    /// 字段级错误对应的字段名
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRejectionReason => Some("rejection_reason"),
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
