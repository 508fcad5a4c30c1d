// ==========================================
// 刑释日期计算系统 - 配置层
// ==========================================
// 职责: 一次运行内只读共享的外部配置 (提前释放方案/批次)
// 红线: 核心不持有跨运行可变共享状态, 配置由调用方注入
// ==========================================

pub mod early_release;

// 重导出核心配置类型
pub use early_release::{
    EarlyReleaseConfiguration, EarlyReleaseConfigurations, ReleasePointMultiplier,
    Sds40TrancheConfiguration, Tranche,
};
