//! 账户仓储
//!
//! 提供账户与金币余额的数据访问，余额变更只在事务中进行

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};

use super::traits::AccountRepositoryTrait;
use crate::error::Result;
use crate::models::{Account, NewAccount};

/// 账户仓储
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 根据 ID 获取账户
    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_active, is_staff, is_superuser,
                   coin_balance, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// 根据用户名获取账户
    pub async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_active, is_staff, is_superuser,
                   coin_balance, created_at, updated_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    // ==================== 写入操作 ====================

    /// 创建账户
    ///
    /// 新账户默认启用、余额为 0；用户名冲突时返回 None
    pub async fn create_account(&self, account: &NewAccount) -> Result<Option<Account>> {
        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, email, password_hash, is_active, is_staff, is_superuser, coin_balance)
            VALUES ($1, $2, $3, TRUE, $4, $5, 0)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, email, password_hash, is_active, is_staff, is_superuser,
                      coin_balance, created_at, updated_at
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取账户（带行级锁）
    ///
    /// 读取余额前必须先锁定账户行，保证并发入账与扣款串行执行
    pub async fn get_account_for_update(
        tx: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_active, is_staff, is_superuser,
                   coin_balance, created_at, updated_at
            FROM accounts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(account)
    }

    /// 在事务中调整余额
    ///
    /// 使用增量更新，返回调整后的余额
    pub async fn adjust_balance_in_tx(tx: &mut PgConnection, id: i64, delta: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET coin_balance = coin_balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING coin_balance
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_one(tx)
        .await?;

        Ok(row.get("coin_balance"))
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.get_account(id).await
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.get_account_by_username(username).await
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Option<Account>> {
        self.create_account(account).await
    }
}
