//! 数据库仓储层
//!
//! 提供所有实体的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 事务控制由调用方（服务层）决定，事务内操作以 `&mut PgConnection` 为参数
//! - 定义 trait 接口以支持 mock 测试

mod account_badge_repo;
mod account_repo;
mod badge_repo;
mod donation_repo;
mod traits;

pub use account_badge_repo::AccountBadgeRepository;
pub use account_repo::AccountRepository;
pub use badge_repo::BadgeRepository;
pub use donation_repo::DonationRepository;
pub use traits::*;
