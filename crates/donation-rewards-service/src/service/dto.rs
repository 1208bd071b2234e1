//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::RewardsError;
use crate::models::{
    Account, AwardSource, Badge, BadgeKind, DonationDetail, DonationStatus, OwnedBadge, Role,
};

/// 捐赠描述长度范围（去除首尾空白后）
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 240;

// ==================== 请求 ====================

/// 提交捐赠请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDonationRequest {
    pub donation_type_id: i64,
    /// 证据照片引用（URL 或存储键）
    #[validate(length(min = 1, max = 1024, message = "必须提供捐赠证据"))]
    pub evidence_ref: String,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
}

impl SubmitDonationRequest {
    /// 规范化后的描述，空白描述视为未填写
    pub fn normalized_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let len = trimmed.chars().count();
    if len < DESCRIPTION_MIN_CHARS {
        return Err(ValidationError::new("description_too_short")
            .with_message(format!("描述至少需要 {} 个字符", DESCRIPTION_MIN_CHARS).into()));
    }
    if len > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::new("description_too_long")
            .with_message(format!("描述不能超过 {} 个字符", DESCRIPTION_MAX_CHARS).into()));
    }
    Ok(())
}

/// 审核捐赠请求
///
/// status 只能为 APPROVED 或 REJECTED；拒绝时必须填写原因
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDonationRequest {
    pub status: DonationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl ValidateDonationRequest {
    pub fn approve() -> Self {
        Self {
            status: DonationStatus::Approved,
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            status: DonationStatus::Rejected,
            rejection_reason: Some(reason.into()),
        }
    }
}

/// 注册账户请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    #[validate(length(min = 3, max = 150, message = "用户名长度必须在3-150个字符之间"))]
    pub username: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    pub password: String,
}

// ==================== 响应 ====================

/// 徽章购买结果码
///
/// 业务失败以结构化结果返回，不作为错误抛出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseCode {
    PurchaseOk,
    BadgeNotAvailable,
    AlreadyOwned,
    InsufficientBalance,
}

impl PurchaseCode {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PurchaseOk => 200,
            Self::BadgeNotAvailable | Self::AlreadyOwned => 400,
            Self::InsufficientBalance => 402,
        }
    }

    /// 从购买前置检查失败的错误映射，其他错误返回 None
    pub fn from_error(err: &RewardsError) -> Option<Self> {
        match err {
            RewardsError::BadgeNotAvailable(_) => Some(Self::BadgeNotAvailable),
            RewardsError::AlreadyOwned(_) => Some(Self::AlreadyOwned),
            RewardsError::InsufficientBalance { .. } => Some(Self::InsufficientBalance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseOk => "PURCHASE_OK",
            Self::BadgeNotAvailable => "BADGE_NOT_AVAILABLE",
            Self::AlreadyOwned => "ALREADY_OWNED",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
        }
    }
}

/// 徽章购买响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBadgeResponse {
    pub success: bool,
    pub code: PurchaseCode,
    pub message: String,
    /// 购买成功后的剩余余额
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_balance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeView>,
}

impl PurchaseBadgeResponse {
    pub fn purchased(badge: &Badge, remaining_balance: i64) -> Self {
        Self {
            success: true,
            code: PurchaseCode::PurchaseOk,
            message: format!("成功购买徽章 {}", badge.name),
            remaining_balance: Some(remaining_balance),
            badge: Some(BadgeView::from(badge)),
        }
    }

    pub fn refused(code: PurchaseCode, err: &RewardsError) -> Self {
        Self {
            success: false,
            code,
            message: err.to_string(),
            remaining_balance: None,
            badge: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

/// 批准捐赠响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveDonationResponse {
    pub success: bool,
    pub message: String,
    pub donation_id: i64,
    /// 本次入账金币
    pub coin_reward: i64,
    /// 捐赠人最新余额
    pub balance: i64,
    /// 本次新获得的徽章名称
    pub granted_badges: Vec<String>,
}

/// 拒绝捐赠响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectDonationResponse {
    pub success: bool,
    pub message: String,
    pub donation_id: i64,
    pub reason: String,
}

/// 审核结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationResponse {
    Approved(ApproveDonationResponse),
    Rejected(RejectDonationResponse),
}

/// 成就评估结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditOutcome {
    /// 入账后的余额
    pub balance: i64,
    pub granted: Vec<Badge>,
}

// ==================== 展示投影 ====================

/// 捐赠展示
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    pub id: i64,
    pub donor_id: i64,
    pub donor_username: String,
    pub donation_type_id: i64,
    pub donation_type_name: String,
    pub coin_reward: i64,
    pub status: DonationStatus,
    pub evidence_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<String>,
}

impl From<DonationDetail> for DonationView {
    fn from(d: DonationDetail) -> Self {
        Self {
            id: d.id,
            donor_id: d.donor_id,
            donor_username: d.donor_username,
            donation_type_id: d.donation_type_id,
            donation_type_name: d.donation_type_name,
            coin_reward: d.coin_reward,
            status: d.status,
            evidence_ref: d.evidence_ref,
            description: d.description,
            rejection_reason: d.rejection_reason,
            submitted_at: d.submitted_at,
            validated_at: d.validated_at,
            validated_by: d.validated_by_username,
        }
    }
}

/// 徽章展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeView {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
    pub kind: BadgeKind,
    pub kind_display: String,
    pub coin_cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_count_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_balance_threshold: Option<i64>,
}

impl From<&Badge> for BadgeView {
    fn from(b: &Badge) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            description: b.description.clone(),
            icon_ref: b.icon_ref.clone(),
            kind: b.kind,
            kind_display: b.kind.display_name().to_string(),
            coin_cost: b.coin_cost,
            donation_count_threshold: b.donation_count_threshold,
            coin_balance_threshold: b.coin_balance_threshold,
        }
    }
}

/// 账户持有徽章展示
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBadgeView {
    pub badge: BadgeView,
    pub source: AwardSource,
    pub awarded_at: DateTime<Utc>,
}

impl From<&OwnedBadge> for AccountBadgeView {
    fn from(owned: &OwnedBadge) -> Self {
        Self {
            badge: BadgeView::from(&owned.badge),
            source: owned.source,
            awarded_at: owned.awarded_at,
        }
    }
}

/// 个人面板
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub account_id: i64,
    pub username: String,
    pub email: String,
    pub coin_balance: i64,
    pub badges: Vec<AccountBadgeView>,
    pub role: Role,
    pub is_admin: bool,
    pub is_staff: bool,
}

impl DashboardView {
    pub fn build(account: &Account, owned: &[OwnedBadge]) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            coin_balance: account.coin_balance,
            badges: owned.iter().map(AccountBadgeView::from).collect(),
            role: account.role(),
            is_admin: account.is_admin(),
            is_staff: account.is_staff,
        }
    }
}

/// 超级管理员初始化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnsureSuperuserOutcome {
    Created,
    AlreadyExists,
}
