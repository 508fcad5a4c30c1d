// ==========================================
// 刑释日期计算系统 - 核心库
// ==========================================
// 系统定位: 纯进程内计算模块 (由宿主服务同步调用)
// 技术栈: Rust + chrono + serde + tracing
// 红线: 单次运行 = 单线程同步确定性计算, 核心不持有跨运行可变共享状态
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 提前释放方案
pub mod config;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AdjustmentKind, CalculationRule, DurationUnit, IdentificationTrack, MovementDirection,
    MovementReason, RecallType, ReleaseDateType, TimelineEventType, TrancheName,
};

// 领域实体
pub use domain::{
    Adjustment, AdjustmentAggregate, Booking, BookingAdjustments, CalculatedSentence,
    CalculationOptions, CalculationOutput, CalculationResult, DateBreakdown,
    EffectiveSentenceLength, ExternalMovement, Offence, Offender, ReleasePoint, Sentence,
    SentenceCalculation, SentenceDuration, SentenceGroup,
};

// 引擎
pub use engine::{
    AdjustmentEngine, CalculationOrchestrator, CalculationServices, ClassificationEngine,
    DateCalcCore, ReleasePointResolver, SentenceCombiner, TimelineEngine,
};

// 配置
pub use config::{EarlyReleaseConfiguration, EarlyReleaseConfigurations, Sds40TrancheConfiguration};

// 错误
pub use error::CalculationError;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "刑释日期计算系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
