//! 认证相关
//!
//! 密码处理与调用方能力检查

pub mod password;
pub mod principal;

pub use password::{hash_password, validate_password_policy, verify_password};
pub use principal::{AdminPrincipal, Principal};
