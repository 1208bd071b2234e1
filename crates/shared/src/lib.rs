//! 共享库
//!
//! 包含捐赠积分服务共用的配置、错误处理、数据库连接、缓存和日志等基础设施代码。

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod observability;
