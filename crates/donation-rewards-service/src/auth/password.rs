//! 密码处理
//!
//! 提供密码强度校验、哈希和验证功能

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::{Result, RewardsError};

/// 密码最小长度
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// 校验密码强度
///
/// 至少 6 位，且同时包含字母和数字
pub fn validate_password_policy(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(RewardsError::validation(
            "password",
            format!("密码长度至少为 {} 位", MIN_PASSWORD_LENGTH),
        ));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(RewardsError::validation("password", "密码必须包含至少一个字母"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(RewardsError::validation("password", "密码必须包含至少一个数字"));
    }
    Ok(())
}

/// 对密码进行哈希处理
///
/// 使用 bcrypt 算法生成密码哈希
pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).map_err(|e| RewardsError::Internal(format!("密码哈希失败: {}", e)))
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    verify(password, hash).map_err(|e| RewardsError::Internal(format!("密码验证失败: {}", e)))
}
