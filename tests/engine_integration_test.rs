// ==========================================
// 引擎间集成测试
// ==========================================
// 职责: 验证分类 -> 调整计算 -> 时间线 -> 提取的完整数据流转
// 场景: 标准定期刑 / 连续刑 ORA 混合 / DTO 聚合上限 /
//       批次前移规则 / BOTUS 历史 TUSED
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use chrono::Duration;
use release_dates_engine::domain::booking::Offender;
use release_dates_engine::domain::sentence::Sentence;
use release_dates_engine::engine::services::{CalculationServices, EligibilityPolicy};
use release_dates_engine::{
    Adjustment, AdjustmentKind, CalculationOrchestrator, CalculationRule, EarlyReleaseConfigurations,
    IdentificationTrack, ReleaseDateType, TrancheName,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use test_helpers::{
    create_test_booking, create_test_botus, create_test_dto, create_test_sds, make_consecutive_to,
    ymd,
};

/// 把 TUSED/HDCED 适用性判定整体关断 (模拟宿主注入的保守判定)
struct NoExtrasPolicy;

impl EligibilityPolicy for NoExtrasPolicy {
    fn tused_applies(&self, _sentence: &Sentence, _offender: &Offender) -> bool {
        false
    }

    fn hdced_applies(&self, _sentence: &Sentence, _offender: &Offender) -> bool {
        false
    }
}

fn orchestrator_without_extras() -> CalculationOrchestrator {
    let services = CalculationServices {
        policy: Arc::new(NoExtrasPolicy),
        ..CalculationServices::default()
    };
    CalculationOrchestrator::new(
        services,
        Arc::new(EarlyReleaseConfigurations::sds40_default()),
    )
}

// ==========================================
// 场景 1: 标准定期刑, 零调整
// ==========================================
#[test]
fn test_standard_ora_two_years_zero_adjustments() {
    let sentence = create_test_sds(24, ymd(2020, 1, 1), true);
    let id = sentence.id();
    let booking = create_test_booking(vec![sentence]);
    let output = orchestrator_without_extras().calculate(&booking).unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == id)
        .unwrap()
        .calculation;
    assert_eq!(calc.track, IdentificationTrack::SdsStandardRelease);
    assert_eq!(
        calc.date_types,
        BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd])
    );

    let crd = &output.result.breakdown_by_release_date_type[&ReleaseDateType::Crd];
    assert_eq!(crd.adjusted_days, 0);
    assert_eq!(crd.adjusted, crd.unadjusted);
}

// ==========================================
// 场景 2: 同一刑期 + 10 天羁押扣减
// ==========================================
#[test]
fn test_standard_with_ten_day_remand() {
    let sentence = create_test_sds(24, ymd(2020, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::Remand,
        10,
        ymd(2020, 1, 1),
    ));
    let output = orchestrator_without_extras().calculate(&booking).unwrap();

    let crd = &output.result.breakdown_by_release_date_type[&ReleaseDateType::Crd];
    assert_eq!(crd.adjusted_days, -10);
    assert_eq!(crd.adjusted, crd.unadjusted - Duration::days(10));
}

// ==========================================
// 场景 3: 连续刑 ORA/非 ORA 混合的 LED 折半规则
// ==========================================
#[test]
fn test_consecutive_ora_non_ora_led_rule() {
    let first = create_test_sds(12, ymd(2020, 1, 1), true);
    let root_id = first.id();
    let ora_days = first
        .expiry_duration()
        .length_in_days(first.sentenced_at());
    let mut second = create_test_sds(6, ymd(2020, 3, 1), false);
    make_consecutive_to(&mut second, root_id);

    let booking = create_test_booking(vec![first, second]);
    let output = orchestrator_without_extras().calculate(&booking).unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == root_id)
        .unwrap()
        .calculation;
    let led = calc.breakdowns.get(&ReleaseDateType::Led).unwrap();
    assert!(led
        .rules
        .contains(&CalculationRule::LedConsecutiveOraAndNonOra));
    // 许可届满 = 调整后释放日 + floor(ORA 成分日数 / 2)
    assert_eq!(
        led.adjusted,
        calc.adjusted_release + Duration::days(ora_days / 2)
    );
    assert!(output.result.dates.contains_key(&ReleaseDateType::Led));
}

// ==========================================
// 场景 4: 三段 DTO 连续刑触发 24 个月聚合上限
// ==========================================
#[test]
fn test_dto_aggregate_capped_at_twenty_four_months() {
    let first = create_test_dto(10, ymd(2023, 1, 1));
    let root_id = first.id();
    let mut second = create_test_dto(10, ymd(2023, 1, 1));
    make_consecutive_to(&mut second, root_id);
    let second_id = second.id();
    let mut third = create_test_dto(10, ymd(2023, 1, 1));
    make_consecutive_to(&mut third, second_id);

    let booking = create_test_booking(vec![first, second, third]);
    let output = orchestrator_without_extras().calculate(&booking).unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == root_id)
        .unwrap()
        .calculation;
    // 聚合 30 个月被钳制到 24 个月 (2023-01-01 -> 2025-01-01 = 731 天)
    assert_eq!(calc.expiry_length_days, 731);
    let sed = calc.breakdowns.get(&ReleaseDateType::Sed).unwrap();
    assert!(sed.rules.contains(&CalculationRule::DtoAggregateCapped));
    assert_eq!(sed.adjusted, ymd(2024, 12, 31));
}

// ==========================================
// 场景 5: HDCED 早于批次生效日 -> 前移至生效日
// ==========================================
#[test]
fn test_hdced_defaulted_to_tranche_commencement() {
    // 19 个月 ORA, 2024-06-01 判决: 批次生效时在押, 切换 2/5 乘数后
    // HDCED (释放日 - 135 天) 落在生效日之前 5 天
    let sentence = create_test_sds(19, ymd(2024, 6, 1), true);
    let id = sentence.id();
    let booking = create_test_booking(vec![sentence]);
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    assert_eq!(
        output.result.sds_early_release_allocated_tranche,
        Some(TrancheName::TrancheOne)
    );
    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == id)
        .unwrap()
        .calculation;
    let hdced = calc.breakdowns.get(&ReleaseDateType::Hdced).unwrap();
    assert_eq!(hdced.adjusted, ymd(2024, 9, 10));
    assert!(hdced
        .rules
        .contains(&CalculationRule::HdcedAdjustedAfterTrancheCommencement));
}

// ==========================================
// 场景 6: BOTUS 历史 TUSED 覆盖值
// ==========================================
#[test]
fn test_botus_historic_tused_override() {
    let historic = ymd(2023, 12, 1);
    let sentence = create_test_botus(14, ymd(2023, 1, 1), Some(historic));
    let id = sentence.id();
    let booking = create_test_booking(vec![sentence]);
    let output = orchestrator_without_extras().calculate(&booking).unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == id)
        .unwrap()
        .calculation;
    assert_eq!(calc.track, IdentificationTrack::BotusWithHistoricTused);
    let tused = calc.breakdowns.get(&ReleaseDateType::Tused).unwrap();
    assert_eq!(tused.adjusted, historic);
    assert!(tused
        .rules
        .contains(&CalculationRule::TusedFromHistoricOverride));
}

// ==========================================
// 提前释放方案整体效果
// ==========================================
#[test]
fn test_sds40_reduces_release_point_for_in_custody_sentence() {
    // 同一刑期: 批次生效前释放完毕 -> 不受影响; 生效时在押 -> 受影响
    let early = create_test_sds(24, ymd(2020, 1, 1), true);
    let booking = create_test_booking(vec![early]);
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();
    assert!(!output.result.affected_by_sds40);
    assert_eq!(output.result.sds_early_release_tranche, None);

    let late = create_test_sds(24, ymd(2024, 6, 1), true);
    let booking = create_test_booking(vec![late]);
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();
    assert!(output.result.affected_by_sds40);
    assert_eq!(
        output.result.sds_early_release_tranche,
        Some(TrancheName::TrancheOne)
    );
}
