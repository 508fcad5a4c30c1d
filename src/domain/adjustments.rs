// ==========================================
// 刑释日期计算系统 - 在押调整领域模型
// ==========================================
// 职责: 输入侧调整记录 + 每刑期调整累加器
// 红线: 累加器按类别记账, 扣减/加算在派生方法中汇总
// ==========================================

use crate::domain::types::AdjustmentKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Adjustment - 调整记录 (输入)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,                  // 调整类别
    pub days: i64,                             // 天数
    pub from_date: Option<NaiveDate>,          // 适用区间起始
    pub to_date: Option<NaiveDate>,            // 适用区间结束
    pub applies_to_sentences_from: NaiveDate,  // 时间线排序锚点
}

impl Adjustment {
    pub fn new(kind: AdjustmentKind, days: i64, applies_to_sentences_from: NaiveDate) -> Self {
        Self {
            kind,
            days,
            from_date: None,
            to_date: None,
            applies_to_sentences_from,
        }
    }
}

// ==========================================
// BookingAdjustments - 调整集合 (按类别)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingAdjustments {
    by_kind: BTreeMap<String, Vec<Adjustment>>,
}

impl BookingAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条调整记录
    pub fn push(&mut self, adjustment: Adjustment) {
        self.by_kind
            .entry(adjustment.kind.to_string())
            .or_default()
            .push(adjustment);
    }

    /// 取某一类别的全部调整 (按输入顺序)
    pub fn of_kind(&self, kind: AdjustmentKind) -> &[Adjustment] {
        self.by_kind
            .get(&kind.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 全部调整记录的迭代器
    pub fn iter_all(&self) -> impl Iterator<Item = &Adjustment> {
        self.by_kind.values().flatten()
    }
}

// ==========================================
// AdjustmentAggregate - 每刑期调整累加器
// ==========================================
// 生命周期: 随 SentenceCalculation 创建, 时间线重放期间反复累加
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentAggregate {
    pub remand: i64,                 // 审前羁押
    pub tagged_bail: i64,            // 电子监控保释
    pub recall_remand: i64,          // 召回期羁押
    pub recall_tagged_bail: i64,     // 召回期电子监控保释
    pub ual_during_custody: i64,     // 在押期间非法在逃
    pub ual_after_release: i64,      // 释放后非法在逃
    pub ual_after_ftr: i64,          // 定期召回许可期内非法在逃
    pub awarded_during_custody: i64, // 在押期间净加罚 (ADA - RADA)
    pub awarded_after_release: i64,  // 许可期内净加罚 (定期召回窗口)
    pub unused_ada: i64,             // 未消耗 ADA
    pub unused_licence_ada: i64,     // 未消耗许可期 ADA
}

impl AdjustmentAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在押口径的扣减合计
    pub fn deducted(&self) -> i64 {
        self.remand + self.tagged_bail + self.recall_remand + self.recall_tagged_bail
    }

    /// 释放日的净调整天数 (未消耗 ADA 不计入)
    pub fn release_total(&self) -> i64 {
        self.ual_during_custody + (self.awarded_during_custody - self.unused_ada)
            - self.deducted()
    }

    /// 届满日的净调整天数
    ///
    /// # 规则
    /// - ADA 只影响释放日, 不影响届满日
    /// - 召回期扣减只影响召回后释放日
    pub fn expiry_total(&self) -> i64 {
        self.ual_during_custody - self.remand - self.tagged_bail
    }

    /// 未消耗 ADA 净值 (许可届满日推算用)
    pub fn unused_ada_net(&self) -> i64 {
        self.unused_ada - self.unused_licence_ada
    }

    /// 把在押级调整共享到新加入刑期的累加器
    ///
    /// 判决事件合并新成分时调用: 同一在押期内累计的 UAL/加罚对新成员同等适用
    pub fn share_custody_level_from(&mut self, other: &AdjustmentAggregate) {
        self.ual_during_custody += other.ual_during_custody;
        self.awarded_during_custody += other.awarded_during_custody;
    }

    /// 清零未消耗 ADA (批次生效后必须重新推算)
    pub fn reset_unused_ada(&mut self) {
        self.unused_ada = 0;
        self.unused_licence_ada = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_total_nets_unused_ada() {
        let aggregate = AdjustmentAggregate {
            remand: 10,
            awarded_during_custody: 7,
            unused_ada: 3,
            ual_during_custody: 2,
            ..Default::default()
        };
        // 2 + (7 - 3) - 10 = -4
        assert_eq!(aggregate.release_total(), -4);
    }

    #[test]
    fn test_expiry_total_excludes_ada() {
        let aggregate = AdjustmentAggregate {
            remand: 10,
            tagged_bail: 5,
            awarded_during_custody: 7,
            ual_during_custody: 4,
            ..Default::default()
        };
        assert_eq!(aggregate.expiry_total(), -11);
    }

    #[test]
    fn test_share_custody_level() {
        let source = AdjustmentAggregate {
            ual_during_custody: 6,
            awarded_during_custody: 4,
            remand: 10,
            ..Default::default()
        };
        let mut target = AdjustmentAggregate::new();
        target.share_custody_level_from(&source);
        assert_eq!(target.ual_during_custody, 6);
        assert_eq!(target.awarded_during_custody, 4);
        // 羁押类扣减不共享
        assert_eq!(target.remand, 0);
    }

    #[test]
    fn test_booking_adjustments_by_kind() {
        let mut adjustments = BookingAdjustments::new();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        adjustments.push(Adjustment::new(AdjustmentKind::Remand, 10, date));
        adjustments.push(Adjustment::new(AdjustmentKind::Remand, 5, date));
        adjustments.push(Adjustment::new(AdjustmentKind::AdditionalDaysAwarded, 3, date));
        assert_eq!(adjustments.of_kind(AdjustmentKind::Remand).len(), 2);
        assert_eq!(adjustments.of_kind(AdjustmentKind::TaggedBail).len(), 0);
        assert_eq!(adjustments.iter_all().count(), 3);
    }
}
