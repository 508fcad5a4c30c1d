// ==========================================
// 刑释日期计算系统 - 犯罪事实领域模型
// ==========================================
// 红线: 由外部判决数据创建, 创建后不可变
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Offence - 犯罪事实
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offence {
    pub committed_at: NaiveDate,           // 犯罪日 (区间犯罪时为起始日)
    pub committed_end: Option<NaiveDate>,  // 犯罪区间结束日 (可选)
    pub offence_code: String,              // 罪名代码
    pub schedule_15_life_offence: bool,    // Schedule 15 终身刑罪名标记
    pub pcsc_marker: bool,                 // PCSC 标记 (SDS+ 判定输入)
}

impl Offence {
    /// 创建单日犯罪事实
    pub fn new(committed_at: NaiveDate, offence_code: impl Into<String>) -> Self {
        Self {
            committed_at,
            committed_end: None,
            offence_code: offence_code.into(),
            schedule_15_life_offence: false,
            pcsc_marker: false,
        }
    }

    /// 法制断代所用的犯罪基准日
    ///
    /// # 规则
    /// - 区间犯罪以结束日为准, 否则以犯罪日为准
    pub fn reference_date(&self) -> NaiveDate {
        self.committed_end.unwrap_or(self.committed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_date_prefers_range_end() {
        let mut offence = Offence::new(
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
            "TH68010",
        );
        offence.committed_end = Some(NaiveDate::from_ymd_opt(2015, 3, 1).unwrap());
        assert_eq!(
            offence.reference_date(),
            NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_reference_date_single_day() {
        let offence = Offence::new(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(), "TH68010");
        assert_eq!(
            offence.reference_date(),
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()
        );
    }
}
