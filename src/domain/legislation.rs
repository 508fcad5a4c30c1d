// ==========================================
// 刑释日期计算系统 - 法定生效日期与法制断代
// ==========================================
// 依据: Criminal Justice Act 2003 (2005-04-04 生效)
// 依据: LASPO 2012 (2012-12-03 生效)
// 依据: Offender Rehabilitation Act 2014 (2015-02-01 生效)
// 依据: PCSC Act 2022 (2022-06-28 生效)
// 红线: 断代判定只依赖判决日/犯罪日, 不依赖时间线状态
// ==========================================

use chrono::NaiveDate;

/// CJA 2003 释放条款生效日
pub fn cja_commencement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2005, 4, 4).expect("合法的固定日期")
}

/// LASPO 2012 生效日
pub fn laspo_commencement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2012, 12, 3).expect("合法的固定日期")
}

/// ORA 2014 生效日 (补充监管期引入)
pub fn ora_commencement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 2, 1).expect("合法的固定日期")
}

/// PCSC 2022 生效日 (DTO 释放点与 SOPC PED 调整)
pub fn pcsc_commencement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 6, 28).expect("合法的固定日期")
}

/// 罚金折算刑全刑期释放条款生效日
pub fn afine_full_term_commencement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 4, 13).expect("合法的固定日期")
}

/// 罚金折算刑全刑期释放的罚金门槛 (英镑)
pub const AFINE_FULL_TERM_THRESHOLD: i64 = 10_000_000;

/// SDS40 第一批次默认生效日
pub fn sds40_tranche_one_default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 10).expect("合法的固定日期")
}

/// SDS40 第二批次默认生效日
pub fn sds40_tranche_two_default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 22).expect("合法的固定日期")
}

/// SDS40 第三批次默认生效日 (HDC 召回)
pub fn sds40_tranche_three_default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 16).expect("合法的固定日期")
}

/// 外部释放移动的停表日
///
/// 此日及之后的外部释放移动不再冻结最晚释放指针
pub fn movement_stop_clock_date() -> NaiveDate {
    sds40_tranche_one_default_date()
}

/// TUSED 适用的补充监管窗口上限 (天)
pub const TUSED_WINDOW_DAYS: i64 = 365;

/// 成年门槛 (TUSED 仅适用于释放时满 18 岁者)
pub const ADULT_AGE_YEARS: i64 = 18;

// ==========================================
// 法制断代判定 (纯函数)
// ==========================================

/// 判断是否属于 CJA/LASPO 之前的旧制刑
///
/// # 规则
/// - 判决日早于 LASPO 生效日 且 犯罪日早于 CJA 生效日
pub fn is_before_cja_laspo(sentenced_at: NaiveDate, committed_at: NaiveDate) -> bool {
    sentenced_at < laspo_commencement_date() && committed_at < cja_commencement_date()
}

/// 判断犯罪日是否早于 ORA 生效日
pub fn is_offence_before_ora(committed_at: NaiveDate) -> bool {
    committed_at < ora_commencement_date()
}

/// 判断判决日是否在 PCSC 生效日当日或之后
pub fn is_sentenced_on_or_after_pcsc(sentenced_at: NaiveDate) -> bool {
    sentenced_at >= pcsc_commencement_date()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_before_cja_laspo_both_early() {
        let sentenced = NaiveDate::from_ymd_opt(2004, 6, 1).unwrap();
        let committed = NaiveDate::from_ymd_opt(2004, 1, 1).unwrap();
        assert!(is_before_cja_laspo(sentenced, committed));
    }

    #[test]
    fn test_before_cja_laspo_offence_after_cja() {
        // 判决在 LASPO 前, 但犯罪在 CJA 后 -> 新制
        let sentenced = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap();
        let committed = NaiveDate::from_ymd_opt(2006, 1, 1).unwrap();
        assert!(!is_before_cja_laspo(sentenced, committed));
    }

    #[test]
    fn test_laspo_boundary_day_is_new_era() {
        let sentenced = laspo_commencement_date();
        let committed = NaiveDate::from_ymd_opt(2004, 1, 1).unwrap();
        assert!(!is_before_cja_laspo(sentenced, committed));
    }

    #[test]
    fn test_pcsc_boundary() {
        assert!(is_sentenced_on_or_after_pcsc(pcsc_commencement_date()));
        assert!(!is_sentenced_on_or_after_pcsc(
            pcsc_commencement_date().pred_opt().unwrap()
        ));
    }
}
