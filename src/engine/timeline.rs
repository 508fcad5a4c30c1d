// ==========================================
// 刑释日期计算系统 - 时间线模拟引擎
// ==========================================
// 红线: 同日事件优先级 SENTENCED < ADA/RADA < UAL < TRANCHE < EXTERNAL
// 红线: 运行状态整体归属单次运行, 不跨运行共享
// ==========================================
// 职责: 事件有序重放 / 在押分组维护 / 批次分配与定稿
// 输入: Booking + 提前释放方案配置
// 输出: 终态刑期 + 计算状态 + 在押分组
// ==========================================

mod core;
mod events;
mod tracker;


pub use self::core::{TimelineEngine, TimelineResult};
pub use self::events::{build_timeline, TimelineEvent};
pub use self::tracker::{HandleResult, TimelineTracker};
