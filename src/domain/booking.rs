// ==========================================
// 刑释日期计算系统 - 计算请求领域模型
// ==========================================
// 职责: 一次计算运行的完整输入 (罪犯 + 刑期 + 调整 + 外部移动 + 选项)
// 红线: 输入视为已验证, 违反前置条件按致命不变量错误向上传播
// ==========================================

use crate::domain::adjustments::BookingAdjustments;
use crate::domain::sentence::Sentence;
use crate::domain::types::{MovementDirection, MovementReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Offender - 罪犯
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offender {
    pub reference: String,         // 外部引用标识
    pub date_of_birth: NaiveDate,  // 出生日期
}

impl Offender {
    pub fn new(reference: impl Into<String>, date_of_birth: NaiveDate) -> Self {
        Self {
            reference: reference.into(),
            date_of_birth,
        }
    }

    /// 计算某一基准日的周岁年龄
    pub fn age_at(&self, date: NaiveDate) -> i64 {
        let mut age = i64::from(date.years_since(self.date_of_birth).unwrap_or(0));
        if date < self.date_of_birth {
            age = 0;
        }
        age
    }
}

// ==========================================
// ExternalMovement - 外部收押/释放移动
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMovement {
    pub date: NaiveDate,               // 移动日期
    pub direction: MovementDirection,  // 方向 (IN/OUT)
    pub reason: MovementReason,        // 原因代码
}

// ==========================================
// CalculationOptions - 运行选项
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOptions {
    pub calculate_ersed: bool, // 是否计算提前遣返资格日
}

// ==========================================
// Booking - 计算请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub offender: Offender,                        // 罪犯
    pub sentences: Vec<Sentence>,                  // 刑期列表 (含连续刑引用)
    pub adjustments: BookingAdjustments,           // 在押调整集合
    pub return_to_custody_date: Option<NaiveDate>, // 召回再收押日
    pub external_movements: Vec<ExternalMovement>, // 外部移动列表
    pub options: CalculationOptions,               // 运行选项
}

impl Booking {
    pub fn new(offender: Offender, sentences: Vec<Sentence>) -> Self {
        Self {
            offender,
            sentences,
            adjustments: BookingAdjustments::new(),
            return_to_custody_date: None,
            external_movements: Vec::new(),
            options: CalculationOptions::default(),
        }
    }

    /// 最早判决日 (时间线初始的最晚释放指针)
    pub fn earliest_sentence_date(&self) -> Option<NaiveDate> {
        self.sentences.iter().map(|s| s.sentenced_at()).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_at_before_birthday() {
        let offender = Offender::new("A1234BC", NaiveDate::from_ymd_opt(2000, 6, 15).unwrap());
        assert_eq!(offender.age_at(NaiveDate::from_ymd_opt(2018, 6, 14).unwrap()), 17);
        assert_eq!(offender.age_at(NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()), 18);
    }
}
