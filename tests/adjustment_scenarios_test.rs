// ==========================================
// 调整与召回场景集成测试
// ==========================================
// 职责: 验证时间线对 ADA/RADA/UAL/召回 的记账与重算
// 场景: 在押加罚 / 恢复 / 非法在逃 / 定期召回 PRRD /
//       标准召回期间丢弃加罚 / 输入顺序无关性
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use chrono::Duration;
use release_dates_engine::{
    Adjustment, AdjustmentKind, CalculationOrchestrator, RecallType, ReleaseDateType,
};
use test_helpers::{
    create_test_booking, create_test_sds, create_test_sds_recall, ymd,
};

#[test]
fn test_ada_extends_release_date() {
    let baseline_sentence = create_test_sds(12, ymd(2023, 1, 1), true);
    let baseline = CalculationOrchestrator::with_defaults()
        .calculate(&create_test_booking(vec![baseline_sentence]))
        .unwrap();

    let sentence = create_test_sds(12, ymd(2023, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::AdditionalDaysAwarded,
        5,
        ymd(2023, 3, 1),
    ));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    assert_eq!(
        output.result.dates[&ReleaseDateType::Crd],
        baseline.result.dates[&ReleaseDateType::Crd] + Duration::days(5)
    );
}

#[test]
fn test_rada_nets_against_ada() {
    let sentence = create_test_sds(12, ymd(2023, 1, 1), true);
    let id = sentence.id();
    let mut booking = create_test_booking(vec![sentence]);
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::AdditionalDaysAwarded,
        5,
        ymd(2023, 3, 1),
    ));
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::RestorationOfAdditionalDaysAwarded,
        2,
        ymd(2023, 4, 1),
    ));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == id)
        .unwrap()
        .calculation;
    assert_eq!(calc.adjustments.awarded_during_custody, 3);
}

#[test]
fn test_ual_during_custody_moves_expiry_and_release() {
    let baseline_sentence = create_test_sds(24, ymd(2023, 1, 1), true);
    let baseline = CalculationOrchestrator::with_defaults()
        .calculate(&create_test_booking(vec![baseline_sentence]))
        .unwrap();

    let sentence = create_test_sds(24, ymd(2023, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::UnlawfullyAtLarge,
        10,
        ymd(2023, 2, 1),
    ));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    assert_eq!(
        output.result.dates[&ReleaseDateType::Crd],
        baseline.result.dates[&ReleaseDateType::Crd] + Duration::days(10)
    );
    assert_eq!(
        output.result.dates[&ReleaseDateType::Sled],
        baseline.result.dates[&ReleaseDateType::Sled] + Duration::days(10)
    );
}

#[test]
fn test_fixed_term_recall_prrd() {
    let sentence = create_test_sds_recall(24, ymd(2022, 1, 1), RecallType::FixedTermRecall28);
    let mut booking = create_test_booking(vec![sentence]);
    booking.return_to_custody_date = Some(ymd(2023, 6, 1));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    // 28 天定期召回: 再收押日起第 28 天在押 (含首日)
    assert_eq!(
        output.result.dates[&ReleaseDateType::Prrd],
        ymd(2023, 6, 28)
    );
    // 召回覆盖: HDCED 不得出现
    assert!(!output.result.dates.contains_key(&ReleaseDateType::Hdced));
}

#[test]
fn test_standard_recall_prrd_runs_to_expiry() {
    let sentence = create_test_sds_recall(24, ymd(2022, 1, 1), RecallType::StandardRecall);
    let id = sentence.id();
    let mut booking = create_test_booking(vec![sentence]);
    booking.return_to_custody_date = Some(ymd(2023, 6, 1));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == id)
        .unwrap()
        .calculation;
    assert_eq!(
        calc.breakdowns[&ReleaseDateType::Prrd].adjusted,
        calc.adjusted_expiry
    );
}

#[test]
fn test_awarded_days_dropped_during_standard_recall_between_episodes() {
    // 标准召回刑期已释放, 两个在押期之间的加罚被丢弃
    let recall = create_test_sds_recall(6, ymd(2020, 1, 1), RecallType::StandardRecall);
    let later = create_test_sds(12, ymd(2021, 6, 1), true);
    let later_id = later.id();
    let mut booking = create_test_booking(vec![recall, later]);
    booking.return_to_custody_date = Some(ymd(2020, 2, 1));
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::AdditionalDaysAwarded,
        7,
        ymd(2021, 1, 15),
    ));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == later_id)
        .unwrap()
        .calculation;
    assert_eq!(calc.adjustments.awarded_during_custody, 0);
}

#[test]
fn test_awarded_days_buffered_without_recall_between_episodes() {
    // 无召回时, 两个在押期之间的加罚入 PADA 缓冲并注入后续刑期
    let first = create_test_sds(6, ymd(2020, 1, 1), true);
    let later = create_test_sds(12, ymd(2021, 6, 1), true);
    let later_id = later.id();
    let mut booking = create_test_booking(vec![first, later]);
    booking.adjustments.push(Adjustment::new(
        AdjustmentKind::AdditionalDaysAwarded,
        7,
        ymd(2021, 1, 15),
    ));
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    let calc = &output
        .sentences
        .iter()
        .find(|s| s.sentence.id() == later_id)
        .unwrap()
        .calculation;
    assert_eq!(calc.adjustments.awarded_during_custody, 7);
}

#[test]
fn test_ersed_only_computed_when_requested() {
    let sentence = create_test_sds(24, ymd(2023, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);

    let without = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();
    assert!(!without.result.dates.contains_key(&ReleaseDateType::Ersed));

    booking.options.calculate_ersed = true;
    let with = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();
    let ersed = with.result.dates[&ReleaseDateType::Ersed];
    assert!(ersed < with.result.dates[&ReleaseDateType::Crd]);
}

#[test]
fn test_adjustment_input_order_does_not_change_result() {
    // 事件优先级与日期排序固定, 输入列表顺序不影响结果
    let make_booking = |reversed: bool| {
        let sentence = create_test_sds(24, ymd(2023, 1, 1), true);
        let mut booking = create_test_booking(vec![sentence]);
        let mut adjustments = vec![
            Adjustment::new(AdjustmentKind::AdditionalDaysAwarded, 3, ymd(2023, 5, 1)),
            Adjustment::new(AdjustmentKind::UnlawfullyAtLarge, 4, ymd(2023, 5, 1)),
            Adjustment::new(AdjustmentKind::Remand, 10, ymd(2023, 1, 1)),
        ];
        if reversed {
            adjustments.reverse();
        }
        for adjustment in adjustments {
            booking.adjustments.push(adjustment);
        }
        booking
    };

    let orchestrator = CalculationOrchestrator::with_defaults();
    let forward = orchestrator.calculate(&make_booking(false)).unwrap();
    let backward = orchestrator.calculate(&make_booking(true)).unwrap();
    assert_eq!(
        serde_json::to_string(&forward.result.dates).unwrap(),
        serde_json::to_string(&backward.result.dates).unwrap()
    );
}
