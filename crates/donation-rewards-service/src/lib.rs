//! 捐赠奖励服务
//!
//! 记录回收捐赠，经管理员审核后为捐赠人发放金币，并按规则授予或出售徽章。
//!
//! ## 核心功能
//!
//! - **捐赠提交**：捐赠人提交证据，捐赠进入待审核状态
//! - **捐赠审核**：Pending 到 Approved / Rejected 的一次性迁移
//! - **金币入账**：批准后为捐赠人入账，并在同一事务内评估成就徽章
//! - **成就徽章**：捐赠次数或金币达到门槛时自动授予，每个徽章只授予一次
//! - **购买徽章**：使用金币兑换购买类徽章
//! - **个人面板**：余额、徽章与角色的聚合视图，带缓存
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `auth`: 密码处理与调用方能力检查
//! - `repository`: 数据库仓储层
//! - `service`: 业务服务层
//! - `state`: 服务组装

pub mod auth;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;

use sqlx::migrate::Migrator;

/// 数据库迁移脚本
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub use auth::{AdminPrincipal, Principal};
pub use error::{Result, RewardsError};
pub use models::*;
pub use repository::{
    AccountBadgeRepository, AccountRepository, BadgeRepository, DonationRepository,
};
pub use service::{
    AccountService, BadgeAwardService, BadgeQueryService, DonationService, ValidationService, dto,
};
pub use state::AppState;
