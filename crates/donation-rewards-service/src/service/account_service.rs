//! 账户服务
//!
//! 账户注册、初始超级管理员创建以及个人面板查询。
//!
//! ## 缓存策略
//!
//! - 个人面板: 键 `rewards:dashboard:{account_id}`，TTL 由配置决定（默认 5 分钟）
//! - 批准入账、购买徽章、成就授予提交后清除

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, instrument, warn};
use validator::Validate;

use rewards_shared::cache::{Cache, CacheKey};
use rewards_shared::config::RewardsConfig;

use crate::auth::{hash_password, validate_password_policy};
use crate::error::{Result, RewardsError};
use crate::models::{Account, NewAccount};
use crate::repository::{AccountBadgeRepositoryTrait, AccountRepositoryTrait};
use crate::service::dto::{DashboardView, EnsureSuperuserOutcome, RegisterAccountRequest};

/// 校验注册邮箱域名
///
/// 未配置域名时不限制；比较时忽略大小写
pub fn check_email_domain(email: &str, domain: Option<&str>) -> Result<()> {
    let Some(domain) = domain.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(());
    };

    if email.trim().to_lowercase().ends_with(&domain.to_lowercase()) {
        Ok(())
    } else {
        Err(RewardsError::validation(
            "email",
            format!("请使用 {} 结尾的机构邮箱", domain),
        ))
    }
}

/// 账户服务
pub struct AccountService<AR, ABR>
where
    AR: AccountRepositoryTrait,
    ABR: AccountBadgeRepositoryTrait,
{
    account_repo: Arc<AR>,
    account_badge_repo: Arc<ABR>,
    cache: Arc<Cache>,
    institutional_email_domain: Option<String>,
    dashboard_ttl: Duration,
}

impl<AR, ABR> AccountService<AR, ABR>
where
    AR: AccountRepositoryTrait,
    ABR: AccountBadgeRepositoryTrait,
{
    pub fn new(
        account_repo: Arc<AR>,
        account_badge_repo: Arc<ABR>,
        cache: Arc<Cache>,
        config: &RewardsConfig,
    ) -> Self {
        Self {
            account_repo,
            account_badge_repo,
            cache,
            institutional_email_domain: config.institutional_email_domain.clone(),
            dashboard_ttl: Duration::from_secs(config.dashboard_cache_ttl_seconds),
        }
    }

    /// 注册新账户
    ///
    /// 新账户为启用状态、非管理员、余额 0
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterAccountRequest) -> Result<Account> {
        request.validate()?;
        check_email_domain(&request.email, self.institutional_email_domain.as_deref())?;
        validate_password_policy(&request.password)?;

        let username = request.username.trim().to_string();
        if self
            .account_repo
            .get_account_by_username(&username)
            .await?
            .is_some()
        {
            return Err(RewardsError::validation("username", "用户名已存在"));
        }

        let new_account = NewAccount {
            username,
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            is_staff: false,
            is_superuser: false,
        };

        let account = self
            .account_repo
            .create_account(&new_account)
            .await?
            .ok_or_else(|| RewardsError::validation("username", "用户名已存在"))?;

        info!(account_id = account.id, "账户注册成功");
        Ok(account)
    }

    /// 确保超级管理员存在
    ///
    /// 用户名已存在时不做任何修改
    #[instrument(skip(self, email, password))]
    pub async fn ensure_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<EnsureSuperuserOutcome> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(RewardsError::validation(
                "bootstrap_admin",
                "超级管理员用户名和密码不能为空",
            ));
        }

        if self
            .account_repo
            .get_account_by_username(username)
            .await?
            .is_some()
        {
            info!("超级管理员已存在，跳过创建");
            return Ok(EnsureSuperuserOutcome::AlreadyExists);
        }

        let new_account = NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            is_staff: true,
            is_superuser: true,
        };

        match self.account_repo.create_account(&new_account).await? {
            Some(account) => {
                info!(account_id = account.id, "超级管理员已创建");
                Ok(EnsureSuperuserOutcome::Created)
            }
            None => Ok(EnsureSuperuserOutcome::AlreadyExists),
        }
    }

    /// 个人面板
    ///
    /// 优先读取缓存，缓存不可用时回退到数据库
    #[instrument(skip(self))]
    pub async fn dashboard(&self, account_id: i64) -> Result<DashboardView> {
        let key = CacheKey::dashboard(account_id);
        self.get_cached_or_fetch(&key, self.dashboard_ttl, || async {
            self.fetch_dashboard(account_id).await
        })
        .await
    }

    // ==================== 私有方法 ====================

    async fn fetch_dashboard(&self, account_id: i64) -> Result<DashboardView> {
        let account = self
            .account_repo
            .get_account(account_id)
            .await?
            .ok_or(RewardsError::AccountNotFound(account_id))?;
        let owned = self.account_badge_repo.list_owned_badges(account_id).await?;

        Ok(DashboardView::build(&account, &owned))
    }

    /// 带缓存的数据获取辅助方法
    ///
    /// 缓存读写失败只记录警告
    async fn get_cached_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.cache.get::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get failed, falling back to database");
            }
        }

        let data = fetch().await?;

        if let Err(e) = self.cache.set(key, &data, ttl).await {
            warn!(key = %key, error = %e, "Cache set failed");
        }

        Ok(data)
    }
}
