// ==========================================
// 刑释日期计算系统 - 名义刑期长度运算
// ==========================================
// 职责: 多单位刑期 (年/月/周/日) 锚定起算日的日数换算与聚合
// 红线: 先加年, 再加月, 最后加 周*7+日, 月末滚动按公历加法解析
// ==========================================

use crate::domain::types::DurationUnit;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DTO 聚合刑期的法定上限 (月)
pub const DTO_AGGREGATE_CAP_MONTHS: u32 = 24;

// ==========================================
// SentenceDuration - 名义刑期
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceDuration {
    pub years: u32,  // 年
    pub months: u32, // 月
    pub weeks: u32,  // 周
    pub days: u32,   // 日
}

impl SentenceDuration {
    /// 创建空刑期
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建单一单位刑期
    pub fn of(amount: u32, unit: DurationUnit) -> Self {
        let mut duration = Self::new();
        duration.append(amount, unit);
        duration
    }

    /// 叠加一个数量到既有刑期 (同单位相加)
    pub fn append(&mut self, amount: u32, unit: DurationUnit) {
        match unit {
            DurationUnit::Years => self.years += amount,
            DurationUnit::Months => self.months += amount,
            DurationUnit::Weeks => self.weeks += amount,
            DurationUnit::Days => self.days += amount,
        }
    }

    /// 判断是否为零刑期
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.weeks == 0 && self.days == 0
    }

    /// 计算刑期结束日 (开区间: 起算日 + 刑期)
    ///
    /// # 规则
    /// 1. 先加年 (按 12 个月折算)
    /// 2. 再加月
    /// 3. 最后加 周*7 + 日
    /// 月末滚动 (如 1月31日 + 1个月) 按公历日期加法解析
    pub fn end_date_exclusive(&self, anchor: NaiveDate) -> NaiveDate {
        let with_years = anchor
            .checked_add_months(Months::new(self.years * 12))
            .expect("刑期年数超出日期表示范围");
        let with_months = with_years
            .checked_add_months(Months::new(self.months))
            .expect("刑期月数超出日期表示范围");
        with_months
            .checked_add_days(Days::new(u64::from(self.weeks) * 7 + u64::from(self.days)))
            .expect("刑期日数超出日期表示范围")
    }

    /// 计算锚定起算日的刑期日数
    pub fn length_in_days(&self, anchor: NaiveDate) -> i64 {
        (self.end_date_exclusive(anchor) - anchor).num_days()
    }

    /// 判断刑期是否不短于给定数量的单位 (锚定同一起算日比较)
    pub fn at_least(&self, amount: u32, unit: DurationUnit, anchor: NaiveDate) -> bool {
        self.length_in_days(anchor) >= Self::of(amount, unit).length_in_days(anchor)
    }

    /// 判断刑期是否短于给定数量的单位
    pub fn under(&self, amount: u32, unit: DurationUnit, anchor: NaiveDate) -> bool {
        !self.at_least(amount, unit, anchor)
    }

    /// 聚合多段刑期 (同单位求和, 用于连续刑链)
    pub fn aggregate(durations: &[SentenceDuration]) -> SentenceDuration {
        durations.iter().fold(SentenceDuration::new(), |mut acc, d| {
            acc.years += d.years;
            acc.months += d.months;
            acc.weeks += d.weeks;
            acc.days += d.days;
            acc
        })
    }

    /// 计算带月数上限的刑期日数 (DTO 聚合专用)
    ///
    /// # 规则
    /// - 取 min(聚合日数, 锚定起算日的 cap_months 个月日数)
    /// - 返回 (日数, 是否触发上限)
    pub fn length_in_days_capped(&self, anchor: NaiveDate, cap_months: u32) -> (i64, bool) {
        let raw = self.length_in_days(anchor);
        let cap = SentenceDuration::of(cap_months, DurationUnit::Months).length_in_days(anchor);
        if raw > cap {
            (cap, true)
        } else {
            (raw, false)
        }
    }
}

impl fmt::Display for SentenceDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}y/{}m/{}w/{}d",
            self.years, self.months, self.weeks, self.days
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_year_length_over_leap_year() {
        let duration = SentenceDuration::of(2, DurationUnit::Years);
        // 2020 闰年: 2020-01-01 -> 2022-01-01 = 731 天
        assert_eq!(duration.length_in_days(ymd(2020, 1, 1)), 731);
    }

    #[test]
    fn test_month_end_rollover() {
        let duration = SentenceDuration::of(1, DurationUnit::Months);
        // 1月31日 + 1个月 按公历加法落在 2月28日
        assert_eq!(duration.end_date_exclusive(ymd(2021, 1, 31)), ymd(2021, 2, 28));
    }

    #[test]
    fn test_append_order_years_then_months_then_days() {
        let mut duration = SentenceDuration::new();
        duration.append(1, DurationUnit::Years);
        duration.append(2, DurationUnit::Months);
        duration.append(1, DurationUnit::Weeks);
        duration.append(3, DurationUnit::Days);
        // 2020-01-15 + 1y = 2021-01-15, + 2m = 2021-03-15, + 10d = 2021-03-25
        assert_eq!(duration.end_date_exclusive(ymd(2020, 1, 15)), ymd(2021, 3, 25));
    }

    #[test]
    fn test_aggregate_equals_append() {
        // 聚合与逐项叠加等价 (结合律)
        let d1 = SentenceDuration::of(12, DurationUnit::Months);
        let d2 = SentenceDuration::of(6, DurationUnit::Months);
        let aggregated = SentenceDuration::aggregate(&[d1, d2]);

        let mut appended = d1;
        appended.append(6, DurationUnit::Months);

        let anchor = ymd(2020, 3, 1);
        assert_eq!(
            aggregated.length_in_days(anchor),
            appended.length_in_days(anchor)
        );
    }

    #[test]
    fn test_dto_aggregate_cap() {
        // 三段 DTO 共 30 个月, 上限 24 个月
        let parts = [
            SentenceDuration::of(10, DurationUnit::Months),
            SentenceDuration::of(10, DurationUnit::Months),
            SentenceDuration::of(10, DurationUnit::Months),
        ];
        let aggregated = SentenceDuration::aggregate(&parts);
        let anchor = ymd(2023, 1, 1);
        let (days, capped) = aggregated.length_in_days_capped(anchor, DTO_AGGREGATE_CAP_MONTHS);
        assert!(capped);
        assert_eq!(
            days,
            SentenceDuration::of(24, DurationUnit::Months).length_in_days(anchor)
        );
    }

    #[test]
    fn test_under_twelve_months() {
        let anchor = ymd(2020, 1, 1);
        assert!(SentenceDuration::of(6, DurationUnit::Months).under(12, DurationUnit::Months, anchor));
        assert!(!SentenceDuration::of(12, DurationUnit::Months).under(12, DurationUnit::Months, anchor));
    }

    #[test]
    fn test_zero_duration() {
        let duration = SentenceDuration::new();
        assert!(duration.is_zero());
        assert_eq!(duration.length_in_days(ymd(2020, 1, 1)), 0);
    }
}
