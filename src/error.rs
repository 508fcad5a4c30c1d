// ==========================================
// 刑释日期计算系统 - 核心错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// 红线: 不变量违反为致命错误, 立即向上传播, 核心内不重试不恢复;
//       领域边界情形 (零刑期/DTO 上限/TUSED 不适用) 用条件逻辑处理, 不抛错
// ==========================================

use crate::domain::types::ReleaseDateType;
use thiserror::Error;
use uuid::Uuid;

/// 核心计算错误类型 (均为不变量违反)
#[derive(Error, Debug)]
pub enum CalculationError {
    // ===== 连续刑链错误 =====
    #[error("连续刑引用的前驱不存在: sentence_id={sentence_id}, consecutive_to={target}")]
    ConsecutiveChainBroken { sentence_id: Uuid, target: Uuid },

    #[error("连续刑链存在环: sentence_id={sentence_id}")]
    ConsecutiveChainCycle { sentence_id: Uuid },

    // ===== 计算前置条件错误 =====
    #[error("分类要求 {date_type} 但缺少前置计算日期: sentence_id={sentence_id}")]
    MissingPrerequisiteDate {
        sentence_id: Uuid,
        date_type: ReleaseDateType,
    },

    #[error("定期召回缺少再收押日: sentence_id={sentence_id}")]
    MissingReturnToCustodyDate { sentence_id: Uuid },

    // ===== 输入形态错误 =====
    #[error("计算请求不含任何刑期")]
    EmptyBooking,

    #[error("复合刑成分列表为空: sentence_id={sentence_id}")]
    EmptyCompositeSentence { sentence_id: Uuid },

    #[error("无法分类的刑期形态: sentence_id={sentence_id}, 原因={reason}")]
    UnsupportedSentenceShape { sentence_id: Uuid, reason: String },

    // ===== 注入协作者错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
