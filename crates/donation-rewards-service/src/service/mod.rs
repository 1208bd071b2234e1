//! 服务层
//!
//! 实现捐赠奖励业务逻辑，协调仓储层和缓存层。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `award_service`: 金币入账、成就评估与徽章购买
//! - `validation_service`: 捐赠审核状态机
//! - `donation_service`: 捐赠提交与查询
//! - `account_service`: 账户注册与个人面板
//! - `query_service`: 徽章查询服务（只读操作）

pub mod account_service;
pub mod award_service;
pub mod donation_service;
pub mod dto;
pub mod query_service;
pub mod validation_service;

pub use account_service::AccountService;
pub use award_service::BadgeAwardService;
pub use donation_service::DonationService;
pub use dto::*;
pub use query_service::BadgeQueryService;
pub use validation_service::ValidationService;
