// ==========================================
// 刑释日期计算系统 - 时间线事件收集
// ==========================================
// 职责: 把判决/调整/批次/外部移动汇入 日期 -> 事件 有序映射
// 红线: 同日事件按固定类型优先级排序, 同类事件合并去重
// ==========================================

use crate::config::{EarlyReleaseConfigurations, Tranche};
use crate::domain::adjustments::Adjustment;
use crate::domain::booking::{Booking, ExternalMovement};
use crate::domain::types::{
    AdjustmentKind, MovementDirection, TimelineEventType, TrancheAllocationType,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// TimelineEvent - 带载荷的时间线事件
// ==========================================
#[derive(Debug, Clone)]
pub enum TimelineEvent {
    Sentenced { sentence_ids: Vec<Uuid> },
    AdditionalDays { adjustments: Vec<Adjustment> },
    RestorationDays { adjustments: Vec<Adjustment> },
    UnlawfullyAtLarge { adjustments: Vec<Adjustment> },
    TrancheCommencement { tranche: Tranche },
    ExternalMovement { movement: ExternalMovement },
}

impl TimelineEvent {
    /// 事件类型 (决定同日处理优先级)
    pub fn event_type(&self) -> TimelineEventType {
        match self {
            TimelineEvent::Sentenced { .. } => TimelineEventType::Sentenced,
            TimelineEvent::AdditionalDays { .. } => TimelineEventType::AdditionalDays,
            TimelineEvent::RestorationDays { .. } => TimelineEventType::RestorationDays,
            TimelineEvent::UnlawfullyAtLarge { .. } => TimelineEventType::UnlawfullyAtLarge,
            TimelineEvent::TrancheCommencement { tranche } => {
                match tranche.allocation_type {
                    TrancheAllocationType::HdcRecall => TimelineEventType::Sds40TrancheThree,
                    _ => TimelineEventType::EarlyReleaseTranche,
                }
            }
            TimelineEvent::ExternalMovement { movement } => match movement.direction {
                MovementDirection::In => TimelineEventType::ExternalAdmission,
                MovementDirection::Out => TimelineEventType::ExternalRelease,
            },
        }
    }
}

/// 收集一次运行的全部有日期事件
///
/// # 规则
/// 1. 每个刑期的判决日 -> SENTENCED (同日判决合并为一个事件)
/// 2. 每条 ADA/RADA/UAL 调整的 applies_to_sentences_from -> 对应事件 (同日同类合并)
/// 3. 生效方案的每个批次生效日 -> TRANCHE 事件
/// 4. 每条外部移动日期 -> EXTERNAL 事件
/// 5. 同日事件按类型优先级升序排列
pub fn build_timeline(
    booking: &Booking,
    configurations: &EarlyReleaseConfigurations,
) -> BTreeMap<NaiveDate, Vec<TimelineEvent>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<TimelineEvent>> = BTreeMap::new();

    // 判决事件 (同日合并)
    let mut sentenced_by_date: BTreeMap<NaiveDate, Vec<Uuid>> = BTreeMap::new();
    for sentence in &booking.sentences {
        sentenced_by_date
            .entry(sentence.sentenced_at())
            .or_default()
            .push(sentence.id());
    }
    for (date, sentence_ids) in sentenced_by_date {
        by_date
            .entry(date)
            .or_default()
            .push(TimelineEvent::Sentenced { sentence_ids });
    }

    // 调整事件 (同日同类合并)
    push_adjustment_events(
        &mut by_date,
        booking,
        AdjustmentKind::AdditionalDaysAwarded,
        |adjustments| TimelineEvent::AdditionalDays { adjustments },
    );
    push_adjustment_events(
        &mut by_date,
        booking,
        AdjustmentKind::RestorationOfAdditionalDaysAwarded,
        |adjustments| TimelineEvent::RestorationDays { adjustments },
    );
    push_adjustment_events(
        &mut by_date,
        booking,
        AdjustmentKind::UnlawfullyAtLarge,
        |adjustments| TimelineEvent::UnlawfullyAtLarge { adjustments },
    );

    // 批次事件
    if let Some(config) = configurations.active() {
        for tranche in &config.tranches {
            by_date
                .entry(tranche.commencement_date)
                .or_default()
                .push(TimelineEvent::TrancheCommencement { tranche: *tranche });
        }
    }

    // 外部移动事件
    for movement in &booking.external_movements {
        by_date
            .entry(movement.date)
            .or_default()
            .push(TimelineEvent::ExternalMovement {
                movement: *movement,
            });
    }

    // 同日按类型优先级排序
    for events in by_date.values_mut() {
        events.sort_by_key(|e| e.event_type().priority());
    }
    by_date
}

/// 按类别取调整并按日期合并入映射
fn push_adjustment_events(
    by_date: &mut BTreeMap<NaiveDate, Vec<TimelineEvent>>,
    booking: &Booking,
    kind: AdjustmentKind,
    make_event: impl Fn(Vec<Adjustment>) -> TimelineEvent,
) {
    let mut grouped: BTreeMap<NaiveDate, Vec<Adjustment>> = BTreeMap::new();
    for adjustment in booking.adjustments.of_kind(kind) {
        grouped
            .entry(adjustment.applies_to_sentences_from)
            .or_default()
            .push(adjustment.clone());
    }
    for (date, adjustments) in grouped {
        by_date
            .entry(date)
            .or_default()
            .push(make_event(adjustments));
    }
}
