// ==========================================
// 刑释日期计算系统 - 计算状态领域模型
// ==========================================
// 职责: 每刑期每运行一份的可变计算状态 + 可审计 breakdown
// 生命周期: 时间线首次触达刑期时创建, 事件重放期间反复变更,
//           分组定稿后只读
// 红线: 计算状态只归属一次运行, 不得跨运行共享
// ==========================================

use crate::domain::adjustments::AdjustmentAggregate;
use crate::domain::types::{CalculationRule, IdentificationTrack, ReleaseDateType, TrancheName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

// ==========================================
// ReleasePoint - 释放点乘数 (精确分数)
// ==========================================
// 红线: 日数乘法用整数向上取整, 禁止浮点 (规避舍入漂移)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePoint {
    pub numerator: i64,   // 分子
    pub denominator: i64, // 分母
}

impl ReleasePoint {
    pub const HALF: ReleasePoint = ReleasePoint { numerator: 1, denominator: 2 };
    pub const TWO_FIFTHS: ReleasePoint = ReleasePoint { numerator: 2, denominator: 5 };
    pub const TWO_THIRDS: ReleasePoint = ReleasePoint { numerator: 2, denominator: 3 };
    pub const THREE_QUARTERS: ReleasePoint = ReleasePoint { numerator: 3, denominator: 4 };
    pub const FULL: ReleasePoint = ReleasePoint { numerator: 1, denominator: 1 };

    /// 对日数施加乘数, 向上取整
    pub fn apply_ceil(&self, days: i64) -> i64 {
        (days * self.numerator + self.denominator - 1).div_euclid(self.denominator)
    }
}

// ==========================================
// DateBreakdown - 单一日期类型的计算明细
// ==========================================
// 用途: 供审计/校验回溯 (未调整日, 调整后日, 净天数, 触发规则)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBreakdown {
    pub unadjusted: NaiveDate,                             // 未调整日期
    pub adjusted: NaiveDate,                               // 调整后日期
    pub adjusted_days: i64,                                // 净调整天数 (调整后 - 未调整)
    pub rules: BTreeSet<CalculationRule>,                  // 触发过的规则标签
    pub extra_adjustments: BTreeMap<CalculationRule, i64>, // 规则附加天数子项
}

impl DateBreakdown {
    /// 由未调整/调整后日期构造明细 (净天数取两者之差)
    pub fn new(unadjusted: NaiveDate, adjusted: NaiveDate) -> Self {
        Self {
            unadjusted,
            adjusted,
            adjusted_days: (adjusted - unadjusted).num_days(),
            rules: BTreeSet::new(),
            extra_adjustments: BTreeMap::new(),
        }
    }

    /// 追加规则标签
    pub fn with_rule(mut self, rule: CalculationRule) -> Self {
        self.rules.insert(rule);
        self
    }

    /// 追加规则附加天数子项
    pub fn with_extra(mut self, rule: CalculationRule, days: i64) -> Self {
        self.rules.insert(rule);
        self.extra_adjustments.insert(rule, days);
        self
    }

    /// 把调整后日期平移若干天并同步净天数 (批次后修正专用)
    pub fn shift_adjusted(&mut self, days: i64, floor: NaiveDate) {
        let shifted = self.adjusted + chrono::Duration::days(days);
        self.adjusted = shifted.max(floor);
        self.adjusted_days = (self.adjusted - self.unadjusted).num_days();
    }
}

// ==========================================
// SentenceCalculation - 每刑期计算状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceCalculation {
    pub sentence_id: Uuid,                                   // 归属刑期
    pub track: IdentificationTrack,                          // 识别轨道
    pub date_types: BTreeSet<ReleaseDateType>,               // 分类得到的适用日期类型
    pub release_point: ReleasePoint,                         // 当前生效的释放点乘数
    pub expiry_length_days: i64,                             // 未调整届满日数
    pub release_length_days: i64,                            // 未调整在押日数
    pub unadjusted_expiry: NaiveDate,                        // 未调整届满日
    pub unadjusted_release: NaiveDate,                       // 未调整释放日
    pub adjusted_expiry: NaiveDate,                          // 调整后届满日
    pub adjusted_release: NaiveDate,                         // 调整后释放日
    pub unadjusted_ped: Option<NaiveDate>,                   // 未调整假释资格日 (EDS/SOPC)
    pub adjustments: AdjustmentAggregate,                    // 调整累加器
    pub breakdowns: BTreeMap<ReleaseDateType, DateBreakdown>, // 日期类型 -> 计算明细
    pub is_immediate_release: bool,                          // 立即释放标记
    pub allocated_tranche: Option<TrancheName>,              // 分配批次
}

impl SentenceCalculation {
    /// 按分类结果播种计算状态, 具体日期由调整计算引擎首轮填充
    pub fn seed(
        sentence_id: Uuid,
        track: IdentificationTrack,
        date_types: BTreeSet<ReleaseDateType>,
        release_point: ReleasePoint,
        sentenced_at: NaiveDate,
    ) -> Self {
        Self {
            sentence_id,
            track,
            date_types,
            release_point,
            expiry_length_days: 0,
            release_length_days: 0,
            unadjusted_expiry: sentenced_at,
            unadjusted_release: sentenced_at,
            adjusted_expiry: sentenced_at,
            adjusted_release: sentenced_at,
            unadjusted_ped: None,
            adjustments: AdjustmentAggregate::new(),
            breakdowns: BTreeMap::new(),
            is_immediate_release: false,
            allocated_tranche: None,
        }
    }

    /// 判断某一日期类型是否在分类集合内
    pub fn requires(&self, date_type: ReleaseDateType) -> bool {
        self.date_types.contains(&date_type)
    }

    /// 读取某一日期类型的调整后日期
    pub fn date_of(&self, date_type: ReleaseDateType) -> Option<NaiveDate> {
        self.breakdowns.get(&date_type).map(|b| b.adjusted)
    }

    /// 记录 (覆盖) 某一日期类型的计算明细
    pub fn record(&mut self, date_type: ReleaseDateType, breakdown: DateBreakdown) {
        self.breakdowns.insert(date_type, breakdown);
    }

    /// 移除某一日期类型的计算明细 (如 TUSED 不再适用)
    pub fn clear(&mut self, date_type: ReleaseDateType) {
        self.breakdowns.remove(&date_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_point_half_rounds_up() {
        assert_eq!(ReleasePoint::HALF.apply_ceil(731), 366);
        assert_eq!(ReleasePoint::HALF.apply_ceil(730), 365);
    }

    #[test]
    fn test_release_point_two_fifths() {
        assert_eq!(ReleasePoint::TWO_FIFTHS.apply_ceil(731), 293);
        assert_eq!(ReleasePoint::TWO_FIFTHS.apply_ceil(730), 292);
    }

    #[test]
    fn test_release_point_full_term() {
        assert_eq!(ReleasePoint::FULL.apply_ceil(365), 365);
    }

    #[test]
    fn test_breakdown_delta() {
        let unadjusted = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let adjusted = NaiveDate::from_ymd_opt(2020, 12, 22).unwrap();
        let breakdown = DateBreakdown::new(unadjusted, adjusted);
        assert_eq!(breakdown.adjusted_days, -10);
    }

    #[test]
    fn test_breakdown_shift_clamps_to_floor() {
        let unadjusted = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let mut breakdown = DateBreakdown::new(unadjusted, unadjusted);
        let floor = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        breakdown.shift_adjusted(3, floor);
        // 平移后仍早于下限 -> 钳制到下限
        assert_eq!(breakdown.adjusted, floor);
    }
}
