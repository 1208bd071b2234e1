//! 统一日志初始化模块
//!
//! 所有入口通过单一函数配置 tracing subscriber，确保一致的日志格式和过滤规则。
//! 指标通过 `metrics` facade 记录，是否安装 recorder 由宿主进程决定。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

pub use crate::config::ObservabilityConfig;

/// 日志资源守卫
///
/// 持有到进程退出，drop 时输出关闭日志。
pub struct ObservabilityGuard {
    _tracing_guard: Option<tracing::TracingGuard>,
}

impl ObservabilityGuard {
    /// 创建一个空的 Guard（用于测试）
    pub fn empty() -> Self {
        Self {
            _tracing_guard: None,
        }
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!("Shutting down observability...");
    }
}

/// 初始化日志
///
/// # Example
///
/// ```ignore
/// use rewards_shared::{config::AppConfig, observability};
///
/// let config = AppConfig::load("donation-rewards-service")?;
/// let obs = config.observability.clone().with_service_name(&config.service_name);
/// let _guard = observability::init(&obs)?;
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    let tracing_guard = tracing::init(config)?;
    metrics::describe_metrics();

    info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json = config.json_logs(),
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        _tracing_guard: Some(tracing_guard),
    })
}
