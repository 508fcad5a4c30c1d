// ==========================================
// 刑释日期计算系统 - 领域类型定义
// ==========================================
// 依据: Criminal Justice Act 2003 / LASPO 2012 释放条款
// 依据: SDS40 提前释放方案 (2024 年刑期释放点调整)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 释放日期类型 (Release Date Type)
// ==========================================
// 红线: ARD 与 CRD 互斥; SED 与 SLED 互斥 (SLED 蕴含许可期存在)
// 序列化格式: SCREAMING_SNAKE_CASE (与上游判决数据一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseDateType {
    Ard,   // Automatic Release Date - 自动释放日
    Crd,   // Conditional Release Date - 条件释放日
    Sed,   // Sentence Expiry Date - 刑期届满日
    Sled,  // Sentence & Licence Expiry Date - 刑期与许可届满日
    Npd,   // Non-Parole Date - 非假释日
    Prrd,  // Post-Recall Release Date - 召回后释放日
    Led,   // Licence Expiry Date - 许可届满日
    Hdced, // Home Detention Curfew Eligibility Date - 居家拘留资格日
    Ped,   // Parole Eligibility Date - 假释资格日
    Tused, // Top-Up Supervision Expiry Date - 补充监管届满日
    Etd,   // Early Transfer Date - 提前转移日 (DTO)
    Ltd,   // Late Transfer Date - 延后转移日 (DTO)
    Mtd,   // Mid Term Date - 中期日 (DTO)
    Ersed, // Early Removal Scheme Eligibility Date - 提前遣返资格日
}

impl fmt::Display for ReleaseDateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReleaseDateType::Ard => "ARD",
            ReleaseDateType::Crd => "CRD",
            ReleaseDateType::Sed => "SED",
            ReleaseDateType::Sled => "SLED",
            ReleaseDateType::Npd => "NPD",
            ReleaseDateType::Prrd => "PRRD",
            ReleaseDateType::Led => "LED",
            ReleaseDateType::Hdced => "HDCED",
            ReleaseDateType::Ped => "PED",
            ReleaseDateType::Tused => "TUSED",
            ReleaseDateType::Etd => "ETD",
            ReleaseDateType::Ltd => "LTD",
            ReleaseDateType::Mtd => "MTD",
            ReleaseDateType::Ersed => "ERSED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 识别轨道 (Identification Track)
// ==========================================
// 用途: 决定该刑期适用哪一族释放点乘数与规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentificationTrack {
    SdsStandardRelease,      // 标准定期刑 (SDS40 提前释放方案覆盖范围)
    SdsPlusRelease,          // SDS+ (释放点 2/3, 不受提前释放方案影响)
    SdsBeforeCjaLaspo,       // CJA/LASPO 之前的旧制定期刑
    EdsAutomaticRelease,     // 延长定期刑 - 自动释放
    EdsDiscretionaryRelease, // 延长定期刑 - 裁量释放 (含 PED)
    SopcPedAtHalfway,        // SOPC - PED 位于 1/2 点
    SopcPedAtTwoThirds,      // SOPC - PED 位于 2/3 点
    AfineArdAtHalfway,       // 罚金折算刑 - ARD 位于 1/2 点
    AfineArdAtFullTerm,      // 罚金折算刑 - 全刑期释放 (巨额罚金)
    DtoBeforePcsc,           // DTO - PCSC 生效前
    DtoAfterPcsc,            // DTO - PCSC 生效后
    Botus,                   // 补充监管违规 (BOTUS)
    BotusWithHistoricTused,  // BOTUS - 携带历史 TUSED 覆盖值
}

impl IdentificationTrack {
    /// 判断该轨道是否在 SDS40 提前释放方案覆盖范围内
    ///
    /// 红线: 仅标准定期刑受方案影响, SDS+/EDS/SOPC/DTO 均不受影响
    pub fn is_early_release_affected(&self) -> bool {
        matches!(self, IdentificationTrack::SdsStandardRelease)
    }

    /// 判断是否为 DTO 族轨道
    pub fn is_dto(&self) -> bool {
        matches!(
            self,
            IdentificationTrack::DtoBeforePcsc | IdentificationTrack::DtoAfterPcsc
        )
    }
}

impl fmt::Display for IdentificationTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentificationTrack::SdsStandardRelease => "SDS_STANDARD_RELEASE",
            IdentificationTrack::SdsPlusRelease => "SDS_PLUS_RELEASE",
            IdentificationTrack::SdsBeforeCjaLaspo => "SDS_BEFORE_CJA_LASPO",
            IdentificationTrack::EdsAutomaticRelease => "EDS_AUTOMATIC_RELEASE",
            IdentificationTrack::EdsDiscretionaryRelease => "EDS_DISCRETIONARY_RELEASE",
            IdentificationTrack::SopcPedAtHalfway => "SOPC_PED_AT_HALFWAY",
            IdentificationTrack::SopcPedAtTwoThirds => "SOPC_PED_AT_TWO_THIRDS",
            IdentificationTrack::AfineArdAtHalfway => "AFINE_ARD_AT_HALFWAY",
            IdentificationTrack::AfineArdAtFullTerm => "AFINE_ARD_AT_FULL_TERM",
            IdentificationTrack::DtoBeforePcsc => "DTO_BEFORE_PCSC",
            IdentificationTrack::DtoAfterPcsc => "DTO_AFTER_PCSC",
            IdentificationTrack::Botus => "BOTUS",
            IdentificationTrack::BotusWithHistoricTused => "BOTUS_WITH_HISTORIC_TUSED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 召回类型 (Recall Type)
// ==========================================
// 召回覆盖提前释放资格: HDCED 移除, PRRD 加入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecallType {
    StandardRecall,    // 标准召回 (释放至刑期届满或假释)
    FixedTermRecall14, // 定期召回 14 天
    FixedTermRecall28, // 定期召回 28 天
}

impl RecallType {
    /// 判断是否为定期召回
    pub fn is_fixed_term_recall(&self) -> bool {
        matches!(
            self,
            RecallType::FixedTermRecall14 | RecallType::FixedTermRecall28
        )
    }

    /// 定期召回的在押天数 (标准召回返回 None)
    pub fn fixed_term_days(&self) -> Option<i64> {
        match self {
            RecallType::FixedTermRecall14 => Some(14),
            RecallType::FixedTermRecall28 => Some(28),
            RecallType::StandardRecall => None,
        }
    }
}

impl fmt::Display for RecallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecallType::StandardRecall => "STANDARD_RECALL",
            RecallType::FixedTermRecall14 => "FIXED_TERM_RECALL_14",
            RecallType::FixedTermRecall28 => "FIXED_TERM_RECALL_28",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 调整类型 (Adjustment Kind)
// ==========================================
// 输入侧的在押调整类别, 时间线按 applies_to_sentences_from 排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    Remand,                             // 审前羁押 (扣减)
    TaggedBail,                         // 电子监控保释 (扣减)
    RecallRemand,                       // 召回期羁押 (扣减)
    RecallTaggedBail,                   // 召回期电子监控保释 (扣减)
    UnlawfullyAtLarge,                  // 非法在逃 (加算)
    AdditionalDaysAwarded,              // 纪律加罚天数 ADA (加算)
    RestorationOfAdditionalDaysAwarded, // 加罚天数恢复 RADA (回扣)
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdjustmentKind::Remand => "REMAND",
            AdjustmentKind::TaggedBail => "TAGGED_BAIL",
            AdjustmentKind::RecallRemand => "RECALL_REMAND",
            AdjustmentKind::RecallTaggedBail => "RECALL_TAGGED_BAIL",
            AdjustmentKind::UnlawfullyAtLarge => "UNLAWFULLY_AT_LARGE",
            AdjustmentKind::AdditionalDaysAwarded => "ADDITIONAL_DAYS_AWARDED",
            AdjustmentKind::RestorationOfAdditionalDaysAwarded => {
                "RESTORATION_OF_ADDITIONAL_DAYS_AWARDED"
            }
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 时间线事件类型 (Timeline Event Type)
// ==========================================
// 红线: 同日事件按固定优先级处理
//   SENTENCED < ADDITIONAL/RESTORATION < UAL < TRANCHE < EXTERNAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineEventType {
    Sentenced,           // 判决生效
    AdditionalDays,      // 纪律加罚 (ADA)
    RestorationDays,     // 加罚恢复 (RADA)
    UnlawfullyAtLarge,   // 非法在逃 (UAL)
    EarlyReleaseTranche, // 提前释放批次生效
    Sds40TrancheThree,   // SDS40 第三批次生效 (HDC 召回专用)
    ExternalAdmission,   // 外部收押移动
    ExternalRelease,     // 外部释放移动
}

impl TimelineEventType {
    /// 同日事件处理优先级 (小值先处理)
    pub fn priority(&self) -> u8 {
        match self {
            TimelineEventType::Sentenced => 0,
            TimelineEventType::AdditionalDays => 1,
            TimelineEventType::RestorationDays => 2,
            TimelineEventType::UnlawfullyAtLarge => 3,
            TimelineEventType::EarlyReleaseTranche => 4,
            TimelineEventType::Sds40TrancheThree => 5,
            TimelineEventType::ExternalAdmission => 6,
            TimelineEventType::ExternalRelease => 7,
        }
    }
}

impl fmt::Display for TimelineEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimelineEventType::Sentenced => "SENTENCED",
            TimelineEventType::AdditionalDays => "ADDITIONAL_DAYS",
            TimelineEventType::RestorationDays => "RESTORATION_DAYS",
            TimelineEventType::UnlawfullyAtLarge => "UNLAWFULLY_AT_LARGE",
            TimelineEventType::EarlyReleaseTranche => "EARLY_RELEASE_TRANCHE",
            TimelineEventType::Sds40TrancheThree => "SDS_40_TRANCHE_3",
            TimelineEventType::ExternalAdmission => "EXTERNAL_ADMISSION",
            TimelineEventType::ExternalRelease => "EXTERNAL_RELEASE",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 计算规则标签 (Calculation Rule)
// ==========================================
// 用途: 标注 breakdown 中触发过的特殊规则, 供审计回溯
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationRule {
    ImmediateRelease,                      // 调整后释放点早于刑期起算日
    UnusedAda,                             // 存在未消耗的 ADA
    LedConsecutiveOraAndNonOra,            // LED 连续刑 ORA/非 ORA 折半规则
    NpdSplitEra,                           // NPD 跨法制分段算法 (名义 CRD)
    TusedFromHistoricOverride,             // TUSED 取自历史覆盖值 (BOTUS)
    DtoAggregateCapped,                    // DTO 聚合刑期触发 24 个月上限
    SdsEarlyReleaseApplies,                // SDS40 提前释放乘数已适用
    HdcedAdjustedAfterTrancheCommencement, // HDCED 前移至批次生效日
    ErsedAdjustedAfterTrancheCommencement, // ERSED 前移至批次生效日
    PedAdjustedAfterTrancheCommencement,   // PED 前移至批次生效日
}

// ==========================================
// 批次名称 (Tranche Name)
// ==========================================
// 红线: 批次分配单调, 运行内一旦分配不得回退到更早批次
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrancheName {
    TrancheOne,
    TrancheTwo,
    TrancheThree,
}

impl fmt::Display for TrancheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrancheName::TrancheOne => "TRANCHE_1",
            TrancheName::TrancheTwo => "TRANCHE_2",
            TrancheName::TrancheThree => "TRANCHE_3",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 批次分配类型 (Tranche Allocation Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrancheAllocationType {
    SentenceLengthUnder, // 按刑期上限分配 (刑期 < duration_years)
    SentenceLengthOver,  // 按刑期下限分配 (刑期 >= duration_years)
    HdcRecall,           // HDC 召回专用批次
}

// ==========================================
// 外部移动方向 (Movement Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDirection {
    In,  // 收押
    Out, // 释放
}

// ==========================================
// 外部移动原因 (Movement Reason)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementReason {
    Sentencing,      // 判决收押
    Recall,          // 召回收押
    Recapture,       // 在逃再捕
    ReturnFromCourt, // 出庭返回
    HdcRelease,      // HDC 释放
    ParoleRelease,   // 假释释放
    EndOfSentence,   // 刑满释放
    Other,           // 其他
}

impl MovementReason {
    /// 判断是否为"在逃再捕"类收押
    ///
    /// 此类收押紧随释放移动出现时, 释放移动不冻结最晚释放指针
    pub fn is_recapture_like(&self) -> bool {
        matches!(self, MovementReason::Recapture | MovementReason::ReturnFromCourt)
    }
}

// ==========================================
// 刑期长度单位 (Duration Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DurationUnit::Days => "DAYS",
            DurationUnit::Weeks => "WEEKS",
            DurationUnit::Months => "MONTHS",
            DurationUnit::Years => "YEARS",
        };
        write!(f, "{}", s)
    }
}
