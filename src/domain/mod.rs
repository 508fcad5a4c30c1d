// ==========================================
// 刑释日期计算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、法制断代常量
// 红线: 不含引擎逻辑, 不含 I/O
// ==========================================

pub mod adjustments;
pub mod booking;
pub mod calculation;
pub mod duration;
pub mod legislation;
pub mod offence;
pub mod result;
pub mod sentence;
pub mod types;

// 重导出核心类型
pub use adjustments::{Adjustment, AdjustmentAggregate, BookingAdjustments};
pub use booking::{Booking, CalculationOptions, ExternalMovement, Offender};
pub use calculation::{DateBreakdown, ReleasePoint, SentenceCalculation};
pub use duration::{SentenceDuration, DTO_AGGREGATE_CAP_MONTHS};
pub use offence::Offence;
pub use result::{
    CalculatedSentence, CalculationOutput, CalculationResult, EffectiveSentenceLength,
    SentenceGroup,
};
pub use sentence::{
    AFineSentence, BotusSentence, CompositeSentence, DetentionTrainingOrderSentence,
    ExtendedDeterminateSentence, Sentence, SopcSentence, StandardDeterminateSentence,
};
pub use types::{
    AdjustmentKind, CalculationRule, DurationUnit, IdentificationTrack, MovementDirection,
    MovementReason, RecallType, ReleaseDateType, TimelineEventType, TrancheAllocationType,
    TrancheName,
};
