// ==========================================
// 刑释日期计算系统 - 计算结果领域模型
// ==========================================
// 职责: 在押分组 + 有效刑期长度 + 最终合并结果
// 红线: SentenceGroup 在押期关闭时创建, 归属最终输出, 之后不可变
// ==========================================

use crate::domain::calculation::{DateBreakdown, SentenceCalculation};
use crate::domain::sentence::Sentence;
use crate::domain::types::{ReleaseDateType, TrancheName};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// SentenceGroup - 在押分组 (同一连续在押期)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceGroup {
    pub sentence_ids: Vec<Uuid>,            // 分组成员
    pub episode_start: NaiveDate,           // 在押期起始
    pub episode_end: NaiveDate,             // 在押期结束 (释放日)
    pub open_licence_sentences: Vec<Uuid>,  // 释放时许可期仍未届满的成员
}

// ==========================================
// EffectiveSentenceLength - 有效刑期长度
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSentenceLength {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl EffectiveSentenceLength {
    /// 由起算日与届满日 (闭区间) 推算年/月/日构成
    ///
    /// # 规则
    /// - 先取整年, 再取整月, 余数按天计 (与公历加法一致)
    pub fn from_range(start: NaiveDate, end_inclusive: NaiveDate) -> Self {
        if end_inclusive < start {
            return Self::default();
        }
        let target = end_inclusive.succ_opt().expect("日期运算溢出");

        let mut years = 0u32;
        while start
            .checked_add_months(Months::new((years + 1) * 12))
            .map(|d| d <= target)
            .unwrap_or(false)
        {
            years += 1;
        }
        let after_years = start
            .checked_add_months(Months::new(years * 12))
            .expect("日期运算溢出");

        let mut months = 0u32;
        while after_years
            .checked_add_months(Months::new(months + 1))
            .map(|d| d <= target)
            .unwrap_or(false)
        {
            months += 1;
        }
        let after_months = after_years
            .checked_add_months(Months::new(months))
            .expect("日期运算溢出");

        let days = (target - after_months).num_days() as u32;
        Self { years, months, days }
    }
}

impl std::fmt::Display for EffectiveSentenceLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.years, self.months, self.days)
    }
}

// ==========================================
// CalculationResult - 最终合并结果 (对外契约)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub dates: BTreeMap<ReleaseDateType, NaiveDate>,                        // 日期类型 -> 日期
    pub breakdown_by_release_date_type: BTreeMap<ReleaseDateType, DateBreakdown>, // 日期类型 -> 明细
    pub effective_sentence_length: EffectiveSentenceLength,                 // 有效刑期长度
    pub sds_early_release_allocated_tranche: Option<TrancheName>,           // 分配批次
    pub sds_early_release_tranche: Option<TrancheName>,                     // 实际生效批次
    pub affected_by_sds40: bool,                                            // 受提前释放方案影响
    pub show_sds40_hints: bool,                                             // 是否展示方案提示
}

// ==========================================
// CalculatedSentence - 刑期 + 定稿计算状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedSentence {
    pub sentence: Sentence,
    pub calculation: SentenceCalculation,
}

// ==========================================
// CalculationOutput - 一次运行的完整输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    pub sentences: Vec<CalculatedSentence>, // 最终刑期列表 (含复合刑)
    pub groups: Vec<SentenceGroup>,         // 在押分组列表
    pub result: CalculationResult,          // 对外合并结果
}
