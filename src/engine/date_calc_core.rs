// ==========================================
// 刑释日期计算系统 - 日期运算纯函数库
// ==========================================
// 职责: 提供释放点换算、分数点位、转移窗口的纯逻辑
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 分数点位一律整数向上取整, 舍入口径不得变更
// ==========================================

use crate::domain::calculation::ReleasePoint;
use crate::domain::duration::SentenceDuration;
use crate::domain::types::DurationUnit;
use chrono::{Duration, Months, NaiveDate};

// ==========================================
// DateCalcCore - 纯函数工具类
// ==========================================
pub struct DateCalcCore;

impl DateCalcCore {
    /// 由起算日与日数推算闭区间末日
    ///
    /// # 规则
    /// - 日数按含起算日计: 1 天的刑期当日届满
    /// - 日数 <= 0 时退回起算日 (零刑期边界情形)
    pub fn date_from_days(start: NaiveDate, days: i64) -> NaiveDate {
        if days <= 0 {
            return start;
        }
        start + Duration::days(days - 1)
    }

    /// 刑期日数的分数点位日 (向上取整)
    pub fn date_at_point(start: NaiveDate, length_days: i64, point: ReleasePoint) -> NaiveDate {
        Self::date_from_days(start, point.apply_ceil(length_days))
    }

    /// 3/4 点日数 (LED 标准公式)
    pub fn three_quarter_days(length_days: i64) -> i64 {
        ReleasePoint::THREE_QUARTERS.apply_ceil(length_days)
    }

    /// 2/3 点日数 (NPD 标准公式)
    pub fn two_thirds_days(length_days: i64) -> i64 {
        ReleasePoint::TWO_THIRDS.apply_ceil(length_days)
    }

    /// 折半日数向下取整 (LED 连续刑 ORA/非 ORA 规则)
    pub fn half_days_floor(length_days: i64) -> i64 {
        length_days.div_euclid(2)
    }

    /// DTO 转移窗口月数
    ///
    /// # 规则
    /// - 刑期 >= 8 个月 且 < 18 个月 -> 1 个月
    /// - 刑期 >= 18 个月 且 <= 24 个月 -> 2 个月
    /// - 其余 -> 无转移日
    pub fn transfer_window_months(duration: &SentenceDuration, anchor: NaiveDate) -> Option<u32> {
        let days = duration.length_in_days(anchor);
        let eight = SentenceDuration::of(8, DurationUnit::Months).length_in_days(anchor);
        let eighteen = SentenceDuration::of(18, DurationUnit::Months).length_in_days(anchor);
        let twenty_four = SentenceDuration::of(24, DurationUnit::Months).length_in_days(anchor);
        if days >= eight && days < eighteen {
            Some(1)
        } else if days >= eighteen && days <= twenty_four {
            Some(2)
        } else {
            None
        }
    }

    /// 日期前移若干个月 (ETD)
    pub fn minus_months(date: NaiveDate, months: u32) -> NaiveDate {
        date.checked_sub_months(Months::new(months))
            .expect("日期运算溢出")
    }

    /// 日期后移若干个月 (LTD)
    pub fn plus_months(date: NaiveDate, months: u32) -> NaiveDate {
        date.checked_add_months(Months::new(months))
            .expect("日期运算溢出")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_from_days_inclusive() {
        // 2020-01-01 起算 366 天 (2020 为闰年) -> 2020-12-31
        assert_eq!(DateCalcCore::date_from_days(ymd(2020, 1, 1), 366), ymd(2020, 12, 31));
        // 1 天刑期当日届满
        assert_eq!(DateCalcCore::date_from_days(ymd(2020, 1, 1), 1), ymd(2020, 1, 1));
        // 零刑期退回起算日
        assert_eq!(DateCalcCore::date_from_days(ymd(2020, 1, 1), 0), ymd(2020, 1, 1));
    }

    #[test]
    fn test_half_point_release() {
        // 731 天的一半向上取整 = 366 天 -> 2021-01-01
        let release = DateCalcCore::date_at_point(ymd(2020, 1, 1), 731, ReleasePoint::HALF);
        assert_eq!(release, ymd(2021, 1, 1));
    }

    #[test]
    fn test_fraction_days_rounding() {
        assert_eq!(DateCalcCore::three_quarter_days(730), 548); // ceil(547.5)
        assert_eq!(DateCalcCore::two_thirds_days(365), 244);    // ceil(243.33)
        assert_eq!(DateCalcCore::half_days_floor(365), 182);    // floor(182.5)
    }

    #[test]
    fn test_transfer_window_bands() {
        let anchor = ymd(2023, 1, 1);
        let six = SentenceDuration::of(6, DurationUnit::Months);
        let twelve = SentenceDuration::of(12, DurationUnit::Months);
        let eighteen = SentenceDuration::of(18, DurationUnit::Months);
        let twenty_four = SentenceDuration::of(24, DurationUnit::Months);
        let thirty = SentenceDuration::of(30, DurationUnit::Months);
        assert_eq!(DateCalcCore::transfer_window_months(&six, anchor), None);
        assert_eq!(DateCalcCore::transfer_window_months(&twelve, anchor), Some(1));
        assert_eq!(DateCalcCore::transfer_window_months(&eighteen, anchor), Some(2));
        assert_eq!(DateCalcCore::transfer_window_months(&twenty_four, anchor), Some(2));
        assert_eq!(DateCalcCore::transfer_window_months(&thirty, anchor), None);
    }
}
