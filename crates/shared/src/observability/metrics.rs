//! 业务指标模块
//!
//! 基于 metrics facade 记录业务计数器。未安装 recorder 时所有记录都是空操作，
//! 导出方式由宿主进程决定。

/// 注册业务指标描述
pub fn describe_metrics() {
    metrics::describe_counter!(
        "donations_submitted_total",
        "Total number of submitted donations"
    );
    metrics::describe_counter!(
        "donations_validated_total",
        "Total number of donation validations by outcome"
    );
    metrics::describe_counter!(
        "badges_granted_total",
        "Total number of badges granted by source"
    );
    metrics::describe_counter!(
        "badge_purchases_total",
        "Total number of badge purchase attempts by result"
    );
}

/// 记录捐赠提交
#[inline]
pub fn record_donation_submitted() {
    metrics::counter!("donations_submitted_total").increment(1);
}

/// 记录捐赠审核（outcome: approved / rejected）
#[inline]
pub fn record_donation_validated(outcome: &str) {
    metrics::counter!(
        "donations_validated_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录徽章授予（source: conquest / purchase）
#[inline]
pub fn record_badges_granted(source: &str, count: u64) {
    if count == 0 {
        return;
    }
    metrics::counter!(
        "badges_granted_total",
        "source" => source.to_string()
    )
    .increment(count);
}

/// 记录徽章购买结果
#[inline]
pub fn record_badge_purchase(result: &str) {
    metrics::counter!(
        "badge_purchases_total",
        "result" => result.to_string()
    )
    .increment(1);
}
