// ==========================================
// 刑释日期计算系统 - 引擎层
// ==========================================
// 职责: 实现刑期分类/日期计算/时间线模拟的业务规则引擎
// 红线: 引擎无 I/O, 全部规则输出可审计 breakdown
// 红线: 协作者以 trait 注入, 引擎不持有跨运行可变状态
// ==========================================

pub mod adjustment_calc;
pub mod classification;
pub mod combination;
pub mod date_calc_core;
pub mod orchestrator;
pub mod release_point;
pub mod services;
pub mod timeline;

// 重导出核心引擎
pub use adjustment_calc::{AdjustmentEngine, ApplyContext, UNUSED_ADA_MAX_PASSES};
pub use classification::{Classified, ClassificationEngine};
pub use combination::SentenceCombiner;
pub use date_calc_core::DateCalcCore;
pub use orchestrator::CalculationOrchestrator;
pub use release_point::ReleasePointResolver;
pub use services::{
    CalculationServices, EligibilityPolicy, ErsedCalculator, HdcedCalculator,
    StandardEligibilityPolicy, StandardErsedCalculator, StandardHdcedCalculator,
    StandardTusedCalculator, TusedCalculator, WeekendOnlyWorkingDayService, WorkingDayService,
};
pub use timeline::{TimelineEngine, TimelineResult, TimelineTracker};
