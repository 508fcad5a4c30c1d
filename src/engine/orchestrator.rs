// ==========================================
// 刑释日期计算系统 - 计算编排器
// ==========================================
// 用途: 协调时间线模拟与最终结果提取, 作为核心的唯一入口
// 红线: 单次调用 = 单线程同步确定性计算, 重复调用结果逐字节一致
// ==========================================

use crate::config::EarlyReleaseConfigurations;
use crate::domain::booking::Booking;
use crate::domain::calculation::{DateBreakdown, SentenceCalculation};
use crate::domain::result::{
    CalculatedSentence, CalculationOutput, CalculationResult, EffectiveSentenceLength,
};
use crate::domain::types::{CalculationRule, ReleaseDateType};
use crate::engine::services::CalculationServices;
use crate::engine::timeline::{TimelineEngine, TimelineResult};
use crate::error::CalculationError;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// CalculationOrchestrator - 计算编排器
// ==========================================
pub struct CalculationOrchestrator {
    timeline: TimelineEngine,
}

impl CalculationOrchestrator {
    /// 按注入的协作者与方案配置创建编排器
    pub fn new(
        services: CalculationServices,
        configurations: Arc<EarlyReleaseConfigurations>,
    ) -> Self {
        Self {
            timeline: TimelineEngine::new(services, configurations),
        }
    }

    /// 标准协作者 + SDS40 默认方案
    pub fn with_defaults() -> Self {
        Self::new(
            CalculationServices::default(),
            Arc::new(EarlyReleaseConfigurations::sds40_default()),
        )
    }

    /// 执行一次完整计算
    #[instrument(skip(self, booking), fields(offender = %booking.offender.reference))]
    pub fn calculate(&self, booking: &Booking) -> Result<CalculationOutput, CalculationError> {
        let timeline_result = self.timeline.run(booking)?;
        let result = Self::extract(&timeline_result);

        info!(
            dates = result.dates.len(),
            groups = timeline_result.groups.len(),
            affected_by_sds40 = result.affected_by_sds40,
            "计算完成"
        );

        let sentences: Vec<CalculatedSentence> = timeline_result
            .sentences
            .into_iter()
            .filter_map(|sentence| {
                timeline_result
                    .calculations
                    .get(&sentence.id())
                    .cloned()
                    .map(|calculation| CalculatedSentence {
                        sentence,
                        calculation,
                    })
            })
            .collect();

        Ok(CalculationOutput {
            sentences,
            groups: timeline_result.groups,
            result,
        })
    }

    // ==========================================
    // 最终结果提取
    // ==========================================

    /// 合并各刑期的日期: 每类型取最晚, 并施行互斥规则
    ///
    /// # 规则
    /// - ARD 与 CRD 并存时, 以较晚者所属类型为准, 另一类型剔除
    /// - SED 与 SLED 同理 (SLED 蕴含许可期)
    fn extract(timeline_result: &TimelineResult) -> CalculationResult {
        // 固定遍历顺序, 保证同日并列时的裁决确定性
        let mut calculations: Vec<&SentenceCalculation> =
            timeline_result.calculations.values().collect();
        calculations.sort_by_key(|c| c.sentence_id);

        let mut dates: BTreeMap<ReleaseDateType, NaiveDate> = BTreeMap::new();
        let mut breakdowns: BTreeMap<ReleaseDateType, DateBreakdown> = BTreeMap::new();
        for calc in &calculations {
            for (date_type, breakdown) in &calc.breakdowns {
                let is_later = dates
                    .get(date_type)
                    .map(|existing| breakdown.adjusted > *existing)
                    .unwrap_or(true);
                if is_later {
                    dates.insert(*date_type, breakdown.adjusted);
                    breakdowns.insert(*date_type, breakdown.clone());
                }
            }
        }

        Self::resolve_exclusive(&mut dates, &mut breakdowns, ReleaseDateType::Crd, ReleaseDateType::Ard);
        Self::resolve_exclusive(&mut dates, &mut breakdowns, ReleaseDateType::Sled, ReleaseDateType::Sed);

        // 有效刑期长度: 最早判决日 -> 最晚届满日
        let earliest_start = timeline_result
            .sentences
            .iter()
            .map(|s| s.sentenced_at())
            .min();
        let latest_expiry = [ReleaseDateType::Sled, ReleaseDateType::Sed]
            .iter()
            .filter_map(|t| dates.get(t))
            .max()
            .copied();
        let effective_sentence_length = match (earliest_start, latest_expiry) {
            (Some(start), Some(end)) => EffectiveSentenceLength::from_range(start, end),
            _ => EffectiveSentenceLength::default(),
        };

        let affected_by_sds40 = calculations.iter().any(|calc| {
            calc.breakdowns
                .values()
                .any(|b| b.rules.contains(&CalculationRule::SdsEarlyReleaseApplies))
        });

        CalculationResult {
            dates,
            breakdown_by_release_date_type: breakdowns,
            effective_sentence_length,
            sds_early_release_allocated_tranche: timeline_result.allocated_tranche,
            sds_early_release_tranche: if affected_by_sds40 {
                timeline_result.allocated_tranche
            } else {
                None
            },
            affected_by_sds40,
            show_sds40_hints: timeline_result.show_hints && affected_by_sds40,
        }
    }

    /// 互斥对裁决: 两者并存时保留较晚者
    fn resolve_exclusive(
        dates: &mut BTreeMap<ReleaseDateType, NaiveDate>,
        breakdowns: &mut BTreeMap<ReleaseDateType, DateBreakdown>,
        preferred: ReleaseDateType,
        fallback: ReleaseDateType,
    ) {
        if let (Some(&preferred_date), Some(&fallback_date)) =
            (dates.get(&preferred), dates.get(&fallback))
        {
            let dropped = if preferred_date >= fallback_date {
                fallback
            } else {
                preferred
            };
            dates.remove(&dropped);
            breakdowns.remove(&dropped);
        }
    }
}
