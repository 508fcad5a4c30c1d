// ==========================================
// 刑释日期计算系统 - 引擎层协作者接口
// ==========================================
// 职责: 定义专项日期计算器与工作日调整器的 trait, 实现依赖倒置
// 说明: Engine 层定义 trait 并提供标准实现, 宿主服务可注入替换实现
// 红线: 协作者一律为同步纯函数, 无 I/O, 无跨运行可变状态
// ==========================================

use crate::domain::booking::Offender;
use crate::domain::calculation::{DateBreakdown, SentenceCalculation};
use crate::domain::sentence::Sentence;
use crate::domain::types::DurationUnit;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use std::sync::Arc;

// ==========================================
// WorkingDayService - 工作日调整器
// ==========================================
pub trait WorkingDayService: Send + Sync {
    /// 取该日或其前最近的工作日
    ///
    /// # 返回
    /// - (日期, 是否发生了调整)
    fn previous_working_day(&self, date: NaiveDate) -> (NaiveDate, bool);
}

/// 标准实现: 仅回避周末 (银行假日属外部参考数据, 由宿主实现注入)
pub struct WeekendOnlyWorkingDayService;

impl WorkingDayService for WeekendOnlyWorkingDayService {
    fn previous_working_day(&self, date: NaiveDate) -> (NaiveDate, bool) {
        match date.weekday() {
            Weekday::Sat => (date - Duration::days(1), true),
            Weekday::Sun => (date - Duration::days(2), true),
            _ => (date, false),
        }
    }
}

// ==========================================
// HdcedCalculator - 居家拘留资格日计算器
// ==========================================
pub trait HdcedCalculator: Send + Sync {
    /// 计算 HDCED 明细 (不适用时返回 None)
    fn calculate_hdced(
        &self,
        sentence: &Sentence,
        calc: &SentenceCalculation,
    ) -> Option<DateBreakdown>;
}

/// HDC 最短在押期 (周)
pub const HDC_MINIMUM_CUSTODIAL_WEEKS: u32 = 12;

/// HDC 宵禁窗口上限 (天)
pub const HDC_MAXIMUM_CURFEW_DAYS: i64 = 135;

/// HDC 判决后最短服刑天数
pub const HDC_MINIMUM_DAYS_FROM_SENTENCE: i64 = 28;

/// 标准实现: 调整后释放日回退宵禁窗口, 不早于判决日 + 28 天
pub struct StandardHdcedCalculator;

impl HdcedCalculator for StandardHdcedCalculator {
    fn calculate_hdced(
        &self,
        sentence: &Sentence,
        calc: &SentenceCalculation,
    ) -> Option<DateBreakdown> {
        if calc.is_immediate_release {
            return None;
        }
        if calc.release_length_days < i64::from(HDC_MINIMUM_CUSTODIAL_WEEKS) * 7 {
            return None;
        }
        let floor = sentence.sentenced_at() + Duration::days(HDC_MINIMUM_DAYS_FROM_SENTENCE);
        let unadjusted = (calc.unadjusted_release - Duration::days(HDC_MAXIMUM_CURFEW_DAYS)).max(floor);
        let adjusted = (calc.adjusted_release - Duration::days(HDC_MAXIMUM_CURFEW_DAYS)).max(floor);
        if adjusted >= calc.adjusted_release {
            // 宵禁窗口已不存在
            return None;
        }
        Some(DateBreakdown::new(unadjusted, adjusted))
    }
}

// ==========================================
// ErsedCalculator - 提前遣返资格日计算器
// ==========================================
pub trait ErsedCalculator: Send + Sync {
    /// 生成 ERSED 明细 (不适用时返回 None)
    fn generate_breakdown(
        &self,
        sentence: &Sentence,
        calc: &SentenceCalculation,
    ) -> Option<DateBreakdown>;
}

/// 提前遣返窗口上限 (天)
pub const ERS_MAXIMUM_WINDOW_DAYS: i64 = 365;

/// 标准实现: 释放日回退 min(在押日数一半, 窗口上限)
pub struct StandardErsedCalculator;

impl ErsedCalculator for StandardErsedCalculator {
    fn generate_breakdown(
        &self,
        sentence: &Sentence,
        calc: &SentenceCalculation,
    ) -> Option<DateBreakdown> {
        if sentence.is_recall() || calc.is_immediate_release {
            return None;
        }
        let window = (calc.release_length_days / 2).min(ERS_MAXIMUM_WINDOW_DAYS);
        if window <= 0 {
            return None;
        }
        let floor = sentence.sentenced_at();
        let unadjusted = (calc.unadjusted_release - Duration::days(window)).max(floor);
        let adjusted = (calc.adjusted_release - Duration::days(window)).max(floor);
        Some(DateBreakdown::new(unadjusted, adjusted))
    }
}

// ==========================================
// TusedCalculator - 补充监管届满日计算器
// ==========================================
pub trait TusedCalculator: Send + Sync {
    /// 计算 TUSED (调整后释放日起算)
    fn calculate_tused(&self, calc: &SentenceCalculation) -> NaiveDate;

    /// 生成 TUSED 明细
    fn get_calculation_breakdown(&self, calc: &SentenceCalculation) -> DateBreakdown {
        DateBreakdown::new(
            self.tused_from(calc.unadjusted_release),
            self.calculate_tused(calc),
        )
    }

    /// 由任一释放日推算 TUSED
    fn tused_from(&self, release: NaiveDate) -> NaiveDate;
}

/// 补充监管期长度 (月)
pub const TOP_UP_SUPERVISION_MONTHS: u32 = 12;

/// 标准实现: 释放日 + 12 个月
pub struct StandardTusedCalculator;

impl TusedCalculator for StandardTusedCalculator {
    fn calculate_tused(&self, calc: &SentenceCalculation) -> NaiveDate {
        self.tused_from(calc.adjusted_release)
    }

    fn tused_from(&self, release: NaiveDate) -> NaiveDate {
        release
            .checked_add_months(Months::new(TOP_UP_SUPERVISION_MONTHS))
            .expect("日期运算溢出")
    }
}

// ==========================================
// EligibilityPolicy - TUSED/HDCED 适用性判定
// ==========================================
pub trait EligibilityPolicy: Send + Sync {
    /// 判断 TUSED 是否可进入分类集合
    fn tused_applies(&self, sentence: &Sentence, offender: &Offender) -> bool;

    /// 判断 HDCED 是否可进入分类集合
    fn hdced_applies(&self, sentence: &Sentence, offender: &Offender) -> bool;
}

/// 标准判定: ORA 许可期刑且不足 24 个月者有 TUSED;
/// 非召回、12 周至 4 年的定期刑族有 HDCED
pub struct StandardEligibilityPolicy;

impl EligibilityPolicy for StandardEligibilityPolicy {
    fn tused_applies(&self, sentence: &Sentence, _offender: &Offender) -> bool {
        sentence.is_ora()
            && sentence
                .expiry_duration()
                .under(24, DurationUnit::Months, sentence.sentenced_at())
    }

    fn hdced_applies(&self, sentence: &Sentence, _offender: &Offender) -> bool {
        let is_determinate_family = matches!(
            sentence,
            Sentence::StandardDeterminate(_) | Sentence::SingleTerm(_) | Sentence::Consecutive(_)
        );
        is_determinate_family
            && !sentence.is_recall()
            && !sentence.is_sds_plus()
            && !sentence.offence().schedule_15_life_offence
            && sentence.duration_at_least(HDC_MINIMUM_CUSTODIAL_WEEKS, DurationUnit::Weeks)
            && !sentence.duration_at_least(4, DurationUnit::Years)
    }
}

// ==========================================
// CalculationServices - 协作者组合
// ==========================================
// 一次运行内只读共享, 标准实现可整体或逐项替换
#[derive(Clone)]
pub struct CalculationServices {
    pub working_day: Arc<dyn WorkingDayService>,
    pub hdced: Arc<dyn HdcedCalculator>,
    pub ersed: Arc<dyn ErsedCalculator>,
    pub tused: Arc<dyn TusedCalculator>,
    pub policy: Arc<dyn EligibilityPolicy>,
}

impl Default for CalculationServices {
    fn default() -> Self {
        Self {
            working_day: Arc::new(WeekendOnlyWorkingDayService),
            hdced: Arc::new(StandardHdcedCalculator),
            ersed: Arc::new(StandardErsedCalculator),
            tused: Arc::new(StandardTusedCalculator),
            policy: Arc::new(StandardEligibilityPolicy),
        }
    }
}
