// ==========================================
// 刑释日期计算系统 - 时间线模拟引擎核心
// ==========================================
// 职责: 按时间顺序重放全部事件, 增量重算受影响刑期,
//       维护在押分组与最晚释放指针, 分配提前释放批次
// 红线: 事件处理顺序 = 日期升序 + 同日固定类型优先级
// 红线: 批次分配单调, 不得回退
// ==========================================

use crate::config::{EarlyReleaseConfigurations, Tranche};
use crate::domain::adjustments::Adjustment;
use crate::domain::booking::Booking;
use crate::domain::calculation::SentenceCalculation;
use crate::domain::legislation;
use crate::domain::sentence::Sentence;
use crate::domain::types::{
    AdjustmentKind, CalculationRule, MovementDirection, ReleaseDateType, TrancheName,
};
use crate::engine::adjustment_calc::{AdjustmentEngine, ApplyContext};
use crate::engine::classification::ClassificationEngine;
use crate::engine::combination::SentenceCombiner;
use crate::engine::release_point::ReleasePointResolver;
use crate::engine::services::CalculationServices;
use crate::engine::timeline::events::{build_timeline, TimelineEvent};
use crate::engine::timeline::tracker::{HandleResult, TimelineTracker};
use crate::error::CalculationError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// TimelineResult - 模拟结果 (交由编排器提取)
// ==========================================
pub struct TimelineResult {
    pub sentences: Vec<Sentence>,                         // 终态刑期列表 (含复合体)
    pub calculations: HashMap<Uuid, SentenceCalculation>, // 终态计算状态
    pub groups: Vec<crate::domain::result::SentenceGroup>,
    pub allocated_tranche: Option<TrancheName>,
    pub tranche_commencement: Option<NaiveDate>,
    pub show_hints: bool,
}

// ==========================================
// TimelineEngine - 时间线模拟引擎
// ==========================================
pub struct TimelineEngine {
    classification: ClassificationEngine,
    adjustment: AdjustmentEngine,
    resolver: ReleasePointResolver,
    services: CalculationServices,
    configurations: Arc<EarlyReleaseConfigurations>,
}

impl TimelineEngine {
    pub fn new(
        services: CalculationServices,
        configurations: Arc<EarlyReleaseConfigurations>,
    ) -> Self {
        Self {
            classification: ClassificationEngine::new(services.policy.clone()),
            adjustment: AdjustmentEngine::new(services.clone()),
            resolver: ReleasePointResolver::new(configurations.clone()),
            services,
            configurations,
        }
    }

    /// 执行完整时间线模拟
    ///
    /// # 步骤
    /// 1. 收集全部有日期事件 (日期升序, 同日按类型优先级)
    /// 2. 逐日: 越过释放指针即关组; 分派事件; 需要且未被压制时重算
    /// 3. 终态: 关闭残留分组, 执行批次定稿规则
    #[instrument(skip(self, booking), fields(sentences = booking.sentences.len()))]
    pub fn run(&self, booking: &Booking) -> Result<TimelineResult, CalculationError> {
        let initial_pointer = booking
            .earliest_sentence_date()
            .ok_or(CalculationError::EmptyBooking)?;
        let mut tracker = TimelineTracker::new(initial_pointer);
        let timeline = build_timeline(booking, &self.configurations);

        info!(event_days = timeline.len(), "时间线模拟开始");

        for (date, day_events) in timeline {
            // 日期越过释放指针且有开放分组 -> 该在押期已结束
            if date > tracker.latest_release && !tracker.current_group.is_empty() {
                tracker.close_group();
            }

            let mut requires_recalc = false;
            let mut suppressed = false;
            for event in day_events {
                let result = self.dispatch(&event, date, booking, &mut tracker)?;
                requires_recalc |= result.requires_recalc;
                suppressed |= result.suppress_recalc;
            }
            if requires_recalc && !suppressed {
                self.recalculate(date, booking, &mut tracker)?;
            }
        }

        // 终态: 残留分组冲入结果
        tracker.close_group();
        self.finalize_tranche(booking, &mut tracker);

        let mut sentences: Vec<Sentence> = tracker.working_sentences.into_values().collect();
        sentences.sort_by_key(|s| (s.sentenced_at(), s.id()));
        Ok(TimelineResult {
            sentences,
            calculations: tracker.calculations,
            groups: tracker.released_groups,
            allocated_tranche: tracker.allocated_tranche,
            tranche_commencement: tracker.tranche_commencement,
            show_hints: tracker.show_hints,
        })
    }

    // ==========================================
    // 事件分派
    // ==========================================

    fn dispatch(
        &self,
        event: &TimelineEvent,
        date: NaiveDate,
        booking: &Booking,
        tracker: &mut TimelineTracker,
    ) -> Result<HandleResult, CalculationError> {
        match event {
            TimelineEvent::Sentenced { sentence_ids } => {
                self.handle_sentenced(date, sentence_ids, booking, tracker)
            }
            TimelineEvent::AdditionalDays { adjustments } => {
                Ok(self.handle_awarded_days(date, adjustments, 1, tracker))
            }
            TimelineEvent::RestorationDays { adjustments } => {
                Ok(self.handle_awarded_days(date, adjustments, -1, tracker))
            }
            TimelineEvent::UnlawfullyAtLarge { adjustments } => {
                Ok(self.handle_ual(date, adjustments, tracker))
            }
            TimelineEvent::TrancheCommencement { tranche } => {
                Ok(self.handle_tranche(date, tranche, tracker))
            }
            TimelineEvent::ExternalMovement { movement } => {
                Ok(self.handle_external_movement(date, movement, booking, tracker))
            }
        }
    }

    // ==========================================
    // 判决事件
    // ==========================================

    /// 新判决并入当前分组, 重跑连续刑组合, 初始化新刑期的计算状态
    fn handle_sentenced(
        &self,
        date: NaiveDate,
        sentence_ids: &[Uuid],
        booking: &Booking,
        tracker: &mut TimelineTracker,
    ) -> Result<HandleResult, CalculationError> {
        tracker.out_of_prison = false;
        // 新判决开启/延续在押期, 解除先前在押期的指针冻结
        tracker.release_pointer_frozen = false;
        if tracker.current_group.is_empty() {
            tracker.current_group_start = Some(date);
        }

        // 在押级调整共享源 (组合前取样)
        let shared_aggregate = tracker.any_group_calculation().map(|c| c.adjustments);

        // 组合输入 = 当前分组成员 + 本日新判决
        let mut combine_input: Vec<Sentence> = tracker
            .current_group
            .iter()
            .filter_map(|id| tracker.working_sentences.get(id).cloned())
            .collect();
        for id in sentence_ids {
            let sentence = booking
                .sentences
                .iter()
                .find(|s| s.id() == *id)
                .expect("判决事件引用的刑期必在请求内");
            combine_input.push(sentence.clone());
        }
        let combined = SentenceCombiner::combine(&combine_input)?;

        // 被复合体吸收的成分退出独立核算
        let combined_ids: Vec<Uuid> = combined.iter().map(|s| s.id()).collect();
        for old_id in tracker.current_group.clone() {
            if !combined_ids.contains(&old_id) {
                tracker.working_sentences.remove(&old_id);
                tracker.calculations.remove(&old_id);
            }
        }

        for sentence in combined {
            let id = sentence.id();
            let classified = self
                .classification
                .classify(&sentence, &booking.offender)?;

            match tracker.calculations.get_mut(&id) {
                Some(calc) => {
                    // 既有刑期 (或重组复合体): 形态性结论刷新, 累加器保留;
                    // 乘数按其自身判决日重新解析, 不受本日事件影响
                    calc.track = classified.track;
                    calc.date_types = classified.date_types;
                    calc.release_point = self.resolver.resolve(
                        classified.track,
                        sentence.sentenced_at(),
                        tracker.tranche_commencement,
                    );
                }
                None => {
                    // 新刑期: 按事件日播种当前/历史乘数
                    let release_point = self.resolver.resolve(
                        classified.track,
                        date,
                        tracker.tranche_commencement,
                    );
                    let mut calc = SentenceCalculation::seed(
                        id,
                        classified.track,
                        classified.date_types,
                        release_point,
                        sentence.sentenced_at(),
                    );
                    // 在押级调整共享 + 判决前加罚缓冲
                    if let Some(shared) = shared_aggregate {
                        calc.adjustments.share_custody_level_from(&shared);
                    }
                    if tracker.pada != 0 {
                        calc.adjustments.awarded_during_custody += tracker.pada;
                    }
                    tracker.calculations.insert(id, calc);
                }
            }

            // 羁押类扣减按锚点全量重算 (幂等)
            self.reapply_deductions(&sentence, booking, tracker);

            tracker.working_sentences.insert(id, sentence);
            if !tracker.current_group.contains(&id) {
                tracker.current_group.push(id);
            }
        }
        tracker.pada = 0;

        debug!(date = %date, group_size = tracker.current_group.len(), "判决事件处理完成");
        Ok(HandleResult::recalc())
    }

    /// 羁押/保释类扣减: 按 applies_to_sentences_from 锚点归集到适用刑期
    fn reapply_deductions(
        &self,
        sentence: &Sentence,
        booking: &Booking,
        tracker: &mut TimelineTracker,
    ) {
        let Some(calc) = tracker.calculations.get_mut(&sentence.id()) else {
            return;
        };
        let sentenced_at = sentence.sentenced_at();
        let sum_for = |kind: AdjustmentKind| -> i64 {
            booking
                .adjustments
                .of_kind(kind)
                .iter()
                .filter(|a| a.applies_to_sentences_from <= sentenced_at)
                .map(|a| a.days)
                .sum()
        };
        calc.adjustments.remand = sum_for(AdjustmentKind::Remand);
        calc.adjustments.tagged_bail = sum_for(AdjustmentKind::TaggedBail);
        calc.adjustments.recall_remand = sum_for(AdjustmentKind::RecallRemand);
        calc.adjustments.recall_tagged_bail = sum_for(AdjustmentKind::RecallTaggedBail);
    }

    // ==========================================
    // 加罚/恢复事件
    // ==========================================

    /// ADA (sign=+1) / RADA (sign=-1)
    ///
    /// # 规则
    /// - 无在押刑期: 标准召回活动时丢弃, 否则入 PADA 缓冲
    /// - 有在押刑期: 落入定期召回许可窗口的记入许可期累加器, 否则记入在押累加器
    fn handle_awarded_days(
        &self,
        date: NaiveDate,
        adjustments: &[Adjustment],
        sign: i64,
        tracker: &mut TimelineTracker,
    ) -> HandleResult {
        let net: i64 = adjustments.iter().map(|a| a.days).sum::<i64>() * sign;
        if net == 0 {
            return HandleResult::none();
        }

        if tracker.current_group.is_empty() {
            if tracker.has_active_standard_recall() {
                debug!(date = %date, net, "标准召回期间的加罚被丢弃");
                return HandleResult::none();
            }
            tracker.pada += net;
            return HandleResult::none();
        }

        for id in tracker.current_group.clone() {
            let in_ftr_licence_window = tracker
                .working_sentences
                .get(&id)
                .and_then(|s| s.recall_type())
                .map(|r| r.is_fixed_term_recall())
                .unwrap_or(false)
                && tracker
                    .calculations
                    .get(&id)
                    .map(|c| date > c.adjusted_release)
                    .unwrap_or(false);
            if let Some(calc) = tracker.calculations.get_mut(&id) {
                if in_ftr_licence_window {
                    calc.adjustments.awarded_after_release += net;
                } else {
                    calc.adjustments.awarded_during_custody += net;
                }
            }
        }
        HandleResult::recalc()
    }

    // ==========================================
    // 非法在逃事件
    // ==========================================

    /// 按事件日在各刑期调整后释放日的前后拆分在押期/许可期受体
    fn handle_ual(
        &self,
        date: NaiveDate,
        adjustments: &[Adjustment],
        tracker: &mut TimelineTracker,
    ) -> HandleResult {
        let total: i64 = adjustments.iter().map(|a| a.days).sum();
        if total == 0 {
            return HandleResult::none();
        }
        let ids: Vec<Uuid> = tracker.working_sentences.keys().copied().collect();
        for id in ids {
            let is_ftr = tracker
                .working_sentences
                .get(&id)
                .and_then(|s| s.recall_type())
                .map(|r| r.is_fixed_term_recall())
                .unwrap_or(false);
            if let Some(calc) = tracker.calculations.get_mut(&id) {
                if date <= calc.adjusted_release {
                    calc.adjustments.ual_during_custody += total;
                } else if is_ftr {
                    calc.adjustments.ual_after_ftr += total;
                } else {
                    calc.adjustments.ual_after_release += total;
                }
            }
        }
        tracker.latest_ual_end = adjustments
            .iter()
            .filter_map(|a| a.to_date)
            .max()
            .or(Some(date))
            .max(tracker.latest_ual_end);
        HandleResult::recalc()
    }

    // ==========================================
    // 批次生效事件
    // ==========================================

    /// 批次生效: 快照批次前状态, 清零未消耗 ADA, 切换受影响刑期的乘数
    fn handle_tranche(
        &self,
        date: NaiveDate,
        tranche: &Tranche,
        tracker: &mut TimelineTracker,
    ) -> HandleResult {
        if tranche.commencement_date != date {
            return HandleResult::none();
        }
        // 生效日人在押外 -> 本批次不分配
        if tracker.out_of_prison {
            return HandleResult::none();
        }
        let Some(config) = self.configurations.active() else {
            return HandleResult::none();
        };

        // 资格刑期: 当前在押且被本批次覆盖
        let eligible: Vec<Uuid> = tracker
            .current_group
            .iter()
            .filter(|id| {
                let Some(sentence) = tracker.working_sentences.get(*id) else {
                    return false;
                };
                let Some(calc) = tracker.calculations.get(*id) else {
                    return false;
                };
                config.filter_applies(sentence, calc.track) && tranche.allocates(sentence)
            })
            .copied()
            .collect();
        if eligible.is_empty() {
            return HandleResult::none();
        }

        // 单调分配: 不回退到更早批次
        let allocated = match tracker.allocated_tranche {
            Some(existing) => existing.max(tranche.name),
            None => tranche.name,
        };
        tracker.allocated_tranche = Some(allocated);
        tracker.tranche_commencement = Some(date);
        tracker.show_hints = true;

        if tracker.before_tranche_snapshot.is_none() {
            tracker.before_tranche_snapshot = Some(tracker.calculations.clone());
        }

        for id in eligible {
            if let Some(calc) = tracker.calculations.get_mut(&id) {
                // 未消耗 ADA 必须在新乘数下重新推算
                calc.adjustments.reset_unused_ada();
                calc.release_point = self.resolver.resolve(calc.track, date, Some(date));
                calc.allocated_tranche = Some(tranche.name);
            }
        }

        info!(date = %date, tranche = %tranche.name, "提前释放批次生效");
        HandleResult::recalc()
    }

    // ==========================================
    // 外部移动事件
    // ==========================================

    /// 收押清除在押外状态; 释放冻结释放指针并压制本日剩余重算
    fn handle_external_movement(
        &self,
        date: NaiveDate,
        movement: &crate::domain::booking::ExternalMovement,
        booking: &Booking,
        tracker: &mut TimelineTracker,
    ) -> HandleResult {
        match movement.direction {
            MovementDirection::In => {
                tracker.out_of_prison = false;
                HandleResult::none()
            }
            MovementDirection::Out => {
                tracker.out_of_prison = true;

                // 例外 1: 紧随其后的"再捕类"收押 -> 不冻结
                let next_recapture = booking
                    .external_movements
                    .iter()
                    .filter(|m| {
                        m.direction == MovementDirection::In && m.date >= date
                    })
                    .min_by_key(|m| m.date)
                    .map(|m| m.reason.is_recapture_like())
                    .unwrap_or(false);
                if next_recapture {
                    return HandleResult::none();
                }
                // 例外 2: 停表日之后的释放移动不再冻结
                if date >= legislation::movement_stop_clock_date() {
                    return HandleResult::none();
                }
                // 例外 3: 移动落在已记录的 UAL 区间内 -> 属在逃离监, 非真实释放
                if tracker.latest_ual_end.is_some_and(|end| end >= date) {
                    return HandleResult::none();
                }

                tracker.latest_release = date;
                tracker.release_pointer_frozen = true;
                debug!(date = %date, "外部释放移动冻结释放指针");
                HandleResult::suppress()
            }
        }
    }

    // ==========================================
    // 重算
    // ==========================================

    /// 对开放分组全量执行调整计算, 并推进最晚在押释放指针
    fn recalculate(
        &self,
        date: NaiveDate,
        booking: &Booking,
        tracker: &mut TimelineTracker,
    ) -> Result<(), CalculationError> {
        let ctx = ApplyContext {
            offender: &booking.offender,
            return_to_custody_date: booking.return_to_custody_date,
            options: booking.options,
        };
        for id in tracker.current_group.clone() {
            let sentence = tracker
                .working_sentences
                .get(&id)
                .cloned()
                .expect("分组成员必在工作集");
            if let Some(calc) = tracker.calculations.get_mut(&id) {
                self.adjustment.apply(&sentence, calc, &ctx)?;
            }
        }

        if tracker.release_pointer_frozen {
            return Ok(());
        }

        // 指针 = max(支配刑期的判决日, 调整后释放日的前一工作日)
        // 召回刑期的在押期以 PRRD 为准
        let latest = tracker
            .current_group
            .iter()
            .filter_map(|id| {
                tracker.calculations.get(id).map(|c| {
                    let release = c
                        .date_of(ReleaseDateType::Prrd)
                        .unwrap_or(c.adjusted_release);
                    (*id, release)
                })
            })
            .max_by_key(|(id, release)| (*release, *id));
        if let Some((id, release)) = latest {
            let (working_day, _adjusted) = self.services.working_day.previous_working_day(release);
            let start = tracker
                .working_sentences
                .get(&id)
                .map(|s| s.sentenced_at())
                .unwrap_or(release);
            tracker.latest_release = working_day.max(start);
            tracker.latest_release_sentence = Some(id);
        }
        debug!(date = %date, latest_release = %tracker.latest_release, "重算完成");
        Ok(())
    }

    // ==========================================
    // 批次定稿
    // ==========================================

    /// 批次后默认规则 + 批次后调整修正
    ///
    /// # 规则
    /// 1. 受影响刑期的 HDCED/ERSED/PED 早于生效日时前移至生效日
    /// 2. 全部刑期起算于生效日当日或之前时, 对 [生效日, CRD) 内的
    ///    UAL+ADA-RADA 净天数做前移修正 (钳制不早于生效日)
    /// 3. 生效日当日及之后存在任何调整时压制提前释放提示
    fn finalize_tranche(&self, booking: &Booking, tracker: &mut TimelineTracker) {
        if tracker.before_tranche_snapshot.is_none() {
            return;
        }
        let Some(commencement) = tracker.tranche_commencement else {
            return;
        };

        let defaulting_rules = [
            (ReleaseDateType::Hdced, CalculationRule::HdcedAdjustedAfterTrancheCommencement),
            (ReleaseDateType::Ersed, CalculationRule::ErsedAdjustedAfterTrancheCommencement),
            (ReleaseDateType::Ped, CalculationRule::PedAdjustedAfterTrancheCommencement),
        ];

        // 规则 1: 前移至生效日
        for calc in tracker.calculations.values_mut() {
            if calc.allocated_tranche.is_none() {
                continue;
            }
            for (date_type, rule) in defaulting_rules {
                if let Some(breakdown) = calc.breakdowns.get_mut(&date_type) {
                    if breakdown.adjusted < commencement {
                        breakdown.adjusted = commencement;
                        breakdown.adjusted_days =
                            (breakdown.adjusted - breakdown.unadjusted).num_days();
                        breakdown.rules.insert(rule);
                    }
                }
            }
        }

        // 规则 2: 批次后调整修正
        let all_started_before = tracker
            .working_sentences
            .values()
            .all(|s| s.sentenced_at() <= commencement);
        if all_started_before {
            let ids: Vec<Uuid> = tracker.calculations.keys().copied().collect();
            for id in ids {
                let Some(calc) = tracker.calculations.get(&id) else {
                    continue;
                };
                let tranche_in_scope = matches!(
                    calc.allocated_tranche,
                    Some(TrancheName::TrancheOne) | Some(TrancheName::TrancheTwo)
                );
                let Some(crd) = calc.date_of(ReleaseDateType::Crd) else {
                    continue;
                };
                if !tranche_in_scope {
                    continue;
                }
                let delta = Self::post_tranche_delta(booking, commencement, crd);
                if delta == 0 {
                    continue;
                }
                let calc = tracker.calculations.get_mut(&id).expect("已确认存在");
                for (date_type, rule) in defaulting_rules {
                    if let Some(breakdown) = calc.breakdowns.get_mut(&date_type) {
                        if breakdown.rules.contains(&rule) {
                            breakdown.shift_adjusted(delta, commencement);
                        }
                    }
                }
            }
        }

        // 规则 3: 提示压制
        let hint_kinds = [
            AdjustmentKind::UnlawfullyAtLarge,
            AdjustmentKind::AdditionalDaysAwarded,
            AdjustmentKind::RestorationOfAdditionalDaysAwarded,
            AdjustmentKind::Remand,
            AdjustmentKind::TaggedBail,
        ];
        let any_after = hint_kinds.iter().any(|kind| {
            booking
                .adjustments
                .of_kind(*kind)
                .iter()
                .any(|a| a.applies_to_sentences_from >= commencement)
        });
        if any_after {
            tracker.show_hints = false;
        }
    }

    /// [生效日, CRD) 内的 UAL + ADA - RADA 净天数
    fn post_tranche_delta(booking: &Booking, commencement: NaiveDate, crd: NaiveDate) -> i64 {
        let in_window = |a: &Adjustment| {
            a.applies_to_sentences_from >= commencement && a.applies_to_sentences_from < crd
        };
        let sum = |kind: AdjustmentKind| -> i64 {
            booking
                .adjustments
                .of_kind(kind)
                .iter()
                .filter(|a| in_window(a))
                .map(|a| a.days)
                .sum()
        };
        sum(AdjustmentKind::UnlawfullyAtLarge) + sum(AdjustmentKind::AdditionalDaysAwarded)
            - sum(AdjustmentKind::RestorationOfAdditionalDaysAwarded)
    }
}
