// ==========================================
// 外部移动场景集成测试
// ==========================================
// 职责: 验证外部释放移动对释放指针的冻结与例外
// 场景: 冻结 / 再捕例外 / 停表日例外
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use release_dates_engine::{
    CalculationOrchestrator, ExternalMovement, MovementDirection, MovementReason,
};
use test_helpers::{create_test_booking, create_test_sds, ymd};

#[test]
fn test_release_movement_freezes_latest_release() {
    let sentence = create_test_sds(24, ymd(2020, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);
    booking.external_movements.push(ExternalMovement {
        date: ymd(2020, 6, 1),
        direction: MovementDirection::Out,
        reason: MovementReason::ParoleRelease,
    });
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    assert_eq!(output.groups.len(), 1);
    assert_eq!(output.groups[0].episode_end, ymd(2020, 6, 1));
}

#[test]
fn test_recapture_readmission_prevents_freeze() {
    let sentence = create_test_sds(24, ymd(2020, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);
    booking.external_movements.push(ExternalMovement {
        date: ymd(2020, 6, 1),
        direction: MovementDirection::Out,
        reason: MovementReason::Other,
    });
    booking.external_movements.push(ExternalMovement {
        date: ymd(2020, 6, 5),
        direction: MovementDirection::In,
        reason: MovementReason::Recapture,
    });
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    // 释放指针不被冻结: 在押期跑到正常释放日 (2 年半程 = 2021-01-01)
    assert_eq!(output.groups[0].episode_end, ymd(2021, 1, 1));
}

#[test]
fn test_release_movement_after_stop_clock_not_frozen() {
    let sentence = create_test_sds(24, ymd(2024, 1, 1), true);
    let mut booking = create_test_booking(vec![sentence]);
    booking.external_movements.push(ExternalMovement {
        date: ymd(2024, 10, 1),
        direction: MovementDirection::Out,
        reason: MovementReason::ParoleRelease,
    });
    let output = CalculationOrchestrator::with_defaults()
        .calculate(&booking)
        .unwrap();

    // 停表日之后的释放移动不冻结指针
    assert!(output.groups[0].episode_end > ymd(2024, 10, 1));
}
