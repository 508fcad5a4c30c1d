// ==========================================
// 刑释日期计算系统 - 调整与日期计算引擎
// ==========================================
// 职责: 由分类集合 + 锚定日 + 名义刑期 + 调整累加器推算各类释放日期
// 输入: Sentence + SentenceCalculation (可变) + 运行上下文
// 输出: 更新 SentenceCalculation (调整后日期 + 可审计 breakdown)
// 红线: 同一输入与状态下幂等; 每步以分类集合为准入守卫
// 红线: 未消耗 ADA 修正为两轮有界定点, 轮数不得变更
// ==========================================

use crate::domain::booking::{CalculationOptions, Offender};
use crate::domain::calculation::{DateBreakdown, SentenceCalculation};
use crate::domain::duration::DTO_AGGREGATE_CAP_MONTHS;
use crate::domain::legislation::{self, ADULT_AGE_YEARS, TUSED_WINDOW_DAYS};
use crate::domain::sentence::Sentence;
use crate::domain::types::{CalculationRule, IdentificationTrack, ReleaseDateType};
use crate::engine::date_calc_core::DateCalcCore;
use crate::engine::release_point::ReleasePointResolver;
use crate::engine::services::CalculationServices;
use crate::error::CalculationError;
use chrono::{Duration, NaiveDate};
use tracing::instrument;

/// 未消耗 ADA 定点修正的轮数上限
pub const UNUSED_ADA_MAX_PASSES: usize = 2;

// ==========================================
// ApplyContext - 一次计算运行的只读上下文
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub offender: &'a Offender,
    pub return_to_custody_date: Option<NaiveDate>,
    pub options: CalculationOptions,
}

// ==========================================
// AdjustmentEngine - 调整与日期计算引擎
// ==========================================
pub struct AdjustmentEngine {
    services: CalculationServices,
}

impl AdjustmentEngine {
    pub fn new(services: CalculationServices) -> Self {
        Self { services }
    }

    /// 对单个刑期执行完整日期计算
    ///
    /// # 步骤
    /// 1. 名义长度换算 (DTO 聚合上限在此生效)
    /// 2. 两轮未消耗 ADA / 未消耗许可期 ADA 定点修正
    /// 3. 按分类集合逐一记录各日期类型的 breakdown
    #[instrument(skip(self, sentence, calc, ctx), fields(sentence_id = %calc.sentence_id, track = %calc.track))]
    pub fn apply(
        &self,
        sentence: &Sentence,
        calc: &mut SentenceCalculation,
        ctx: &ApplyContext<'_>,
    ) -> Result<(), CalculationError> {
        let anchor = sentence.sentenced_at();

        // 重分类 (如链重组) 后残留的旧日期类型明细一律剔除
        let date_types = calc.date_types.clone();
        calc.breakdowns
            .retain(|k, _| date_types.contains(k) || *k == ReleaseDateType::Ersed);

        // ==========================================
        // 步骤1: 名义长度换算
        // ==========================================
        let expiry_duration = sentence.expiry_duration();
        let custodial_duration = sentence.custodial_duration();
        let apply_dto_cap = sentence.is_dto_like() && sentence.parts_inner().is_some();

        let (expiry_days, dto_capped) = if apply_dto_cap {
            expiry_duration.length_in_days_capped(anchor, DTO_AGGREGATE_CAP_MONTHS)
        } else {
            (expiry_duration.length_in_days(anchor), false)
        };
        let custodial_days = if apply_dto_cap {
            expiry_days
        } else {
            custodial_duration.length_in_days(anchor)
        };

        calc.expiry_length_days = expiry_days;
        calc.release_length_days = calc.release_point.apply_ceil(custodial_days);
        calc.unadjusted_expiry = DateCalcCore::date_from_days(anchor, expiry_days);
        calc.unadjusted_release = DateCalcCore::date_from_days(anchor, calc.release_length_days);

        // ==========================================
        // 步骤2: 两轮未消耗 ADA 定点修正
        // ==========================================
        let mut prrd: Option<(NaiveDate, NaiveDate)> = None;
        for _pass in 0..UNUSED_ADA_MAX_PASSES {
            self.correct_unused_ada(calc, anchor);
            prrd = self.correct_unused_licence_ada(sentence, calc, ctx)?;
        }

        // ==========================================
        // 步骤3: 按分类集合记录 breakdown
        // ==========================================
        self.record_release(sentence, calc, dto_capped);
        self.record_expiry(calc, dto_capped);
        self.record_ped(sentence, calc, anchor, custodial_days);
        self.record_led(sentence, calc, anchor, expiry_days);
        self.record_npd(sentence, calc, anchor, expiry_days);
        self.record_tused(sentence, calc, ctx);
        self.record_transfer_dates(sentence, calc, &expiry_duration, anchor);
        self.record_hdced(sentence, calc);
        self.record_ersed(sentence, calc, ctx);
        if let Some((unadjusted, adjusted)) = prrd {
            calc.record(ReleaseDateType::Prrd, DateBreakdown::new(unadjusted, adjusted));
        }
        Ok(())
    }

    // ==========================================
    // 未消耗 ADA 修正
    // ==========================================

    /// 单轮修正: 施加调整 -> 检出越过届满日的 ADA -> 记为未消耗
    fn correct_unused_ada(&self, calc: &mut SentenceCalculation, anchor: NaiveDate) {
        let adjustments = calc.adjustments;
        let adjusted_expiry = calc.unadjusted_expiry + Duration::days(adjustments.expiry_total());

        // 全额 ADA 下的毛释放日
        let gross_offset = adjustments.ual_during_custody + adjustments.awarded_during_custody
            - adjustments.deducted();
        let gross_release = calc.unadjusted_release + Duration::days(gross_offset);

        let overrun = (gross_release - adjusted_expiry).num_days();
        calc.adjustments.unused_ada = if overrun > 0 {
            overrun.min(adjustments.awarded_during_custody.max(0))
        } else {
            0
        };

        calc.adjusted_expiry = adjusted_expiry;
        let adjusted_release =
            calc.unadjusted_release + Duration::days(calc.adjustments.release_total());
        if adjusted_release < anchor {
            calc.is_immediate_release = true;
            calc.adjusted_release = anchor;
        } else {
            calc.is_immediate_release = false;
            calc.adjusted_release = adjusted_release;
        }
    }

    /// 单轮许可期修正: PRRD 越过届满日的许可期 ADA 记为未消耗
    ///
    /// # 返回
    /// - PRRD 的 (未调整, 调整后) 日期对 (分类集合不含 PRRD 时为 None)
    fn correct_unused_licence_ada(
        &self,
        sentence: &Sentence,
        calc: &mut SentenceCalculation,
        ctx: &ApplyContext<'_>,
    ) -> Result<Option<(NaiveDate, NaiveDate)>, CalculationError> {
        if !calc.requires(ReleaseDateType::Prrd) {
            calc.adjustments.unused_licence_ada = 0;
            return Ok(None);
        }
        let adjustments = calc.adjustments;
        let recall = sentence.recall_type();

        let (unadjusted, gross) = match recall {
            Some(r) if r.is_fixed_term_recall() => {
                let rtc = ctx.return_to_custody_date.ok_or(
                    CalculationError::MissingReturnToCustodyDate {
                        sentence_id: sentence.id(),
                    },
                )?;
                let fixed = r.fixed_term_days().unwrap_or(0);
                let unadjusted = DateCalcCore::date_from_days(rtc, fixed);
                let gross = unadjusted
                    + Duration::days(
                        adjustments.awarded_after_release + adjustments.ual_after_ftr
                            - adjustments.recall_remand
                            - adjustments.recall_tagged_bail,
                    );
                (unadjusted, gross)
            }
            // 标准召回: 在押至调整后届满日
            _ => (calc.unadjusted_expiry, calc.adjusted_expiry),
        };

        let overrun = (gross - calc.adjusted_expiry).num_days();
        calc.adjustments.unused_licence_ada = if overrun > 0 {
            overrun.min(adjustments.awarded_after_release.max(0))
        } else {
            0
        };
        let adjusted = gross.min(calc.adjusted_expiry);
        Ok(Some((unadjusted, adjusted)))
    }

    // ==========================================
    // 各日期类型的 breakdown 记录
    // ==========================================

    /// CRD/ARD (或 DTO 的 MTD) 释放日
    fn record_release(&self, _sentence: &Sentence, calc: &mut SentenceCalculation, dto_capped: bool) {
        let release_type = if calc.requires(ReleaseDateType::Crd) {
            Some(ReleaseDateType::Crd)
        } else if calc.requires(ReleaseDateType::Ard) {
            Some(ReleaseDateType::Ard)
        } else if calc.requires(ReleaseDateType::Mtd) {
            Some(ReleaseDateType::Mtd)
        } else {
            None
        };
        let Some(release_type) = release_type else {
            return;
        };

        let mut breakdown = DateBreakdown::new(calc.unadjusted_release, calc.adjusted_release);
        if calc.is_immediate_release {
            breakdown = breakdown.with_rule(CalculationRule::ImmediateRelease);
        }
        if calc.adjustments.unused_ada > 0 {
            breakdown =
                breakdown.with_extra(CalculationRule::UnusedAda, calc.adjustments.unused_ada);
        }
        if dto_capped {
            breakdown = breakdown.with_rule(CalculationRule::DtoAggregateCapped);
        }
        if calc.allocated_tranche.is_some() && calc.track.is_early_release_affected() {
            breakdown = breakdown.with_rule(CalculationRule::SdsEarlyReleaseApplies);
        }
        calc.record(release_type, breakdown);
    }

    /// SED/SLED 届满日 (与释放日同一记账口径)
    fn record_expiry(&self, calc: &mut SentenceCalculation, dto_capped: bool) {
        let expiry_type = if calc.requires(ReleaseDateType::Sled) {
            Some(ReleaseDateType::Sled)
        } else if calc.requires(ReleaseDateType::Sed) {
            Some(ReleaseDateType::Sed)
        } else {
            None
        };
        let Some(expiry_type) = expiry_type else {
            return;
        };
        let mut breakdown = DateBreakdown::new(calc.unadjusted_expiry, calc.adjusted_expiry);
        if dto_capped {
            breakdown = breakdown.with_rule(CalculationRule::DtoAggregateCapped);
        }
        calc.record(expiry_type, breakdown);
    }

    /// PED 假释资格日 (仅当轨道给出假释点时记录)
    fn record_ped(
        &self,
        _sentence: &Sentence,
        calc: &mut SentenceCalculation,
        anchor: NaiveDate,
        custodial_days: i64,
    ) {
        if !calc.requires(ReleaseDateType::Ped) {
            return;
        }
        let Some(point) = ReleasePointResolver::ped_point(calc.track) else {
            calc.unadjusted_ped = None;
            return;
        };
        let unadjusted = DateCalcCore::date_at_point(anchor, custodial_days, point);
        calc.unadjusted_ped = Some(unadjusted);
        let adjusted = unadjusted + Duration::days(calc.adjustments.release_total());
        calc.record(ReleaseDateType::Ped, DateBreakdown::new(unadjusted, adjusted));
    }

    /// LED 许可届满日
    ///
    /// # 规则
    /// - 全新制 ORA/非 ORA 混合连续刑: 调整后释放日 + floor(ORA 日数/2) - 未消耗许可期 ADA
    /// - 其余: 起算日 + ceil(届满日数*3/4) - 1, 再施加净调整并回扣未消耗 ADA 净值
    fn record_led(
        &self,
        sentence: &Sentence,
        calc: &mut SentenceCalculation,
        anchor: NaiveDate,
        expiry_days: i64,
    ) {
        if !calc.requires(ReleaseDateType::Led) {
            return;
        }
        let adjustments = calc.adjustments;

        if let Some(ora_days) = Self::post_era_ora_mix_days(sentence) {
            let half = DateCalcCore::half_days_floor(ora_days);
            let unadjusted = calc.unadjusted_release + Duration::days(half);
            let adjusted = calc.adjusted_release
                + Duration::days(half - adjustments.unused_licence_ada);
            let breakdown = DateBreakdown::new(unadjusted, adjusted)
                .with_rule(CalculationRule::LedConsecutiveOraAndNonOra);
            calc.record(ReleaseDateType::Led, breakdown);
            return;
        }

        let led_days = DateCalcCore::three_quarter_days(expiry_days);
        let unadjusted = DateCalcCore::date_from_days(anchor, led_days);
        let gross_offset = adjustments.ual_during_custody + adjustments.awarded_during_custody
            - adjustments.deducted();
        let adjusted = unadjusted + Duration::days(gross_offset - adjustments.unused_ada_net());
        calc.record(ReleaseDateType::Led, DateBreakdown::new(unadjusted, adjusted));
    }

    /// NPD 非假释日
    ///
    /// # 规则
    /// - 跨法制链 (名义 CRD 标记): 新制成分日数折半得名义 CRD,
    ///   旧制成分日数自名义 CRD 次日起乘 2/3
    /// - 其余: 起算日 + ceil(届满日数*2/3) - 1 + 净调整
    fn record_npd(
        &self,
        sentence: &Sentence,
        calc: &mut SentenceCalculation,
        anchor: NaiveDate,
        expiry_days: i64,
    ) {
        if !calc.requires(ReleaseDateType::Npd) {
            return;
        }
        let offset = calc.adjustments.release_total();

        if let Some((old_days, new_days)) = Self::split_era_days(sentence) {
            let notional_crd_days = (new_days + 1).div_euclid(2).max(1);
            let notional_crd = DateCalcCore::date_from_days(anchor, notional_crd_days);
            let unadjusted =
                notional_crd + Duration::days(DateCalcCore::two_thirds_days(old_days));
            let adjusted = unadjusted + Duration::days(offset);
            let breakdown =
                DateBreakdown::new(unadjusted, adjusted).with_rule(CalculationRule::NpdSplitEra);
            calc.record(ReleaseDateType::Npd, breakdown);
            return;
        }

        let npd_days = DateCalcCore::two_thirds_days(expiry_days);
        let unadjusted = DateCalcCore::date_from_days(anchor, npd_days);
        let adjusted = unadjusted + Duration::days(offset);
        calc.record(ReleaseDateType::Npd, DateBreakdown::new(unadjusted, adjusted));
    }

    /// TUSED 补充监管届满日
    ///
    /// # 规则
    /// - BOTUS: 历史覆盖值晚于当前释放日时整体前抄, 否则清除
    /// - 其余: (届满日数 - 释放日数) < 365 且 释放时满 18 岁才计算, 否则清除
    fn record_tused(
        &self,
        sentence: &Sentence,
        calc: &mut SentenceCalculation,
        ctx: &ApplyContext<'_>,
    ) {
        if let Sentence::Botus(botus) = sentence {
            match botus.historic_tused {
                Some(historic)
                    if calc.track == IdentificationTrack::BotusWithHistoricTused
                        && historic > calc.adjusted_release =>
                {
                    let breakdown = DateBreakdown::new(historic, historic)
                        .with_rule(CalculationRule::TusedFromHistoricOverride);
                    calc.record(ReleaseDateType::Tused, breakdown);
                }
                _ => calc.clear(ReleaseDateType::Tused),
            }
            return;
        }

        let applicable = calc.requires(ReleaseDateType::Tused)
            && (calc.expiry_length_days - calc.release_length_days) < TUSED_WINDOW_DAYS
            && ctx.offender.age_at(calc.unadjusted_release) >= ADULT_AGE_YEARS;
        if applicable {
            let breakdown = self.services.tused.get_calculation_breakdown(calc);
            calc.record(ReleaseDateType::Tused, breakdown);
        } else {
            calc.clear(ReleaseDateType::Tused);
        }
    }

    /// ETD/LTD 转移日 (DTO, 非立即释放时按刑期带宽取 ±1/±2 个月)
    fn record_transfer_dates(
        &self,
        _sentence: &Sentence,
        calc: &mut SentenceCalculation,
        expiry_duration: &crate::domain::duration::SentenceDuration,
        anchor: NaiveDate,
    ) {
        if !calc.requires(ReleaseDateType::Etd) && !calc.requires(ReleaseDateType::Ltd) {
            return;
        }
        if calc.is_immediate_release {
            calc.clear(ReleaseDateType::Etd);
            calc.clear(ReleaseDateType::Ltd);
            return;
        }
        match DateCalcCore::transfer_window_months(expiry_duration, anchor) {
            Some(months) => {
                if calc.requires(ReleaseDateType::Etd) {
                    calc.record(
                        ReleaseDateType::Etd,
                        DateBreakdown::new(
                            DateCalcCore::minus_months(calc.unadjusted_release, months),
                            DateCalcCore::minus_months(calc.adjusted_release, months),
                        ),
                    );
                }
                if calc.requires(ReleaseDateType::Ltd) {
                    calc.record(
                        ReleaseDateType::Ltd,
                        DateBreakdown::new(
                            DateCalcCore::plus_months(calc.unadjusted_release, months),
                            DateCalcCore::plus_months(calc.adjusted_release, months),
                        ),
                    );
                }
            }
            None => {
                calc.clear(ReleaseDateType::Etd);
                calc.clear(ReleaseDateType::Ltd);
            }
        }
    }

    /// HDCED (专项计算器协作)
    fn record_hdced(&self, sentence: &Sentence, calc: &mut SentenceCalculation) {
        if !calc.requires(ReleaseDateType::Hdced) {
            return;
        }
        match self.services.hdced.calculate_hdced(sentence, calc) {
            Some(breakdown) => calc.record(ReleaseDateType::Hdced, breakdown),
            None => calc.clear(ReleaseDateType::Hdced),
        }
    }

    /// ERSED (仅当运行选项要求时协作计算)
    fn record_ersed(
        &self,
        sentence: &Sentence,
        calc: &mut SentenceCalculation,
        ctx: &ApplyContext<'_>,
    ) {
        if !ctx.options.calculate_ersed {
            return;
        }
        match self.services.ersed.generate_breakdown(sentence, calc) {
            Some(breakdown) => calc.record(ReleaseDateType::Ersed, breakdown),
            None => calc.clear(ReleaseDateType::Ersed),
        }
    }

    // ==========================================
    // 链形态辅助 (纯函数)
    // ==========================================

    /// 全新制 ORA/非 ORA 混合连续刑的 ORA 成分日数
    fn post_era_ora_mix_days(sentence: &Sentence) -> Option<i64> {
        let Sentence::Consecutive(composite) = sentence else {
            return None;
        };
        let parts = &composite.parts;
        let all_post = parts.iter().all(|p| {
            !legislation::is_before_cja_laspo(p.sentenced_at(), p.offence().reference_date())
        });
        let any_ora = parts.iter().any(|p| p.is_ora());
        let any_non_ora = parts.iter().any(|p| !p.is_ora());
        if !(all_post && any_ora && any_non_ora) {
            return None;
        }
        Some(
            parts
                .iter()
                .filter(|p| p.is_ora())
                .map(|p| p.expiry_duration().length_in_days(p.sentenced_at()))
                .sum(),
        )
    }

    /// 跨法制链的 (旧制日数, 新制日数)
    fn split_era_days(sentence: &Sentence) -> Option<(i64, i64)> {
        let parts = sentence.parts_inner()?;
        let mut old_days = 0i64;
        let mut new_days = 0i64;
        for part in parts {
            let days = part.expiry_duration().length_in_days(part.sentenced_at());
            if legislation::is_before_cja_laspo(part.sentenced_at(), part.offence().reference_date())
            {
                old_days += days;
            } else {
                new_days += days;
            }
        }
        if old_days > 0 && new_days > 0 {
            Some((old_days, new_days))
        } else {
            None
        }
    }
}
