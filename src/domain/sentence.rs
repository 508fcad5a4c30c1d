// ==========================================
// 刑释日期计算系统 - 刑期领域模型
// ==========================================
// 职责: 刑期变体的封闭枚举与共享访问器
// 红线: 连续刑的有序成分列表非空且无环 (成分不得直接或传递地包含自身)
// 红线: 变体分派一律用穷尽 match, 新增变体由编译器强制补全
// ==========================================

use crate::domain::duration::SentenceDuration;
use crate::domain::offence::Offence;
use crate::domain::types::{DurationUnit, RecallType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// StandardDeterminateSentence - 标准定期刑 (SDS)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDeterminateSentence {
    pub id: Uuid,                        // 稳定标识
    pub offence: Offence,                // 犯罪事实
    pub duration: SentenceDuration,      // 名义刑期
    pub sentenced_at: NaiveDate,         // 判决日
    pub recall_type: Option<RecallType>, // 召回状态
    pub consecutive_to: Option<Uuid>,    // 连续刑前驱引用
    pub is_sds_plus: bool,               // SDS+ 标记 (释放点 2/3)
    pub has_ora_licence: bool,           // ORA 许可期标记
}

// ==========================================
// ExtendedDeterminateSentence - 延长定期刑 (EDS)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedDeterminateSentence {
    pub id: Uuid,
    pub offence: Offence,
    pub custodial_duration: SentenceDuration, // 在押刑期
    pub extension_duration: SentenceDuration, // 延长许可期
    pub sentenced_at: NaiveDate,
    pub recall_type: Option<RecallType>,
    pub consecutive_to: Option<Uuid>,
    pub automatic_release: bool, // 自动释放标记 (否则为裁量释放, 含 PED)
}

// ==========================================
// SopcSentence - 特别关注罪犯刑 (SOPC)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SopcSentence {
    pub id: Uuid,
    pub offence: Offence,
    pub custodial_duration: SentenceDuration,
    pub licence_duration: SentenceDuration, // 固定附加许可期
    pub sentenced_at: NaiveDate,
    pub recall_type: Option<RecallType>,
    pub consecutive_to: Option<Uuid>,
    pub sentenced_under_18: bool, // 判决时未满 18 岁标记
}

// ==========================================
// AFineSentence - 罚金折算刑 (默认刑期)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AFineSentence {
    pub id: Uuid,
    pub offence: Offence,
    pub duration: SentenceDuration,
    pub sentenced_at: NaiveDate,
    pub recall_type: Option<RecallType>,
    pub fine_amount: i64, // 罚金金额 (英镑)
}

// ==========================================
// DetentionTrainingOrderSentence - 拘留培训令 (DTO)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetentionTrainingOrderSentence {
    pub id: Uuid,
    pub offence: Offence,
    pub duration: SentenceDuration,
    pub sentenced_at: NaiveDate,
    pub recall_type: Option<RecallType>,
    pub consecutive_to: Option<Uuid>,
}

// ==========================================
// BotusSentence - 补充监管违规刑 (BOTUS)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotusSentence {
    pub id: Uuid,
    pub offence: Offence,
    pub duration: SentenceDuration,
    pub sentenced_at: NaiveDate,
    pub recall_type: Option<RecallType>,
    pub historic_tused: Option<NaiveDate>, // 历史 TUSED 覆盖值
}

// ==========================================
// CompositeSentence - 复合刑 (连续刑 / 单一刑期)
// ==========================================
// 连续刑: 由时间线按 consecutive_to 链组合而成
// 单一刑期: 上游已并为一个刑期的多判决 (成分同质)
// 标识取链根成分的标识, 保证重组后稳定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSentence {
    pub id: Uuid,
    pub parts: Vec<Sentence>, // 有序成分 (非复合变体)
}

impl CompositeSentence {
    /// 由有序成分构造复合刑, 标识取首成分
    ///
    /// 调用方保证成分非空且不含复合变体
    pub fn from_parts(parts: Vec<Sentence>) -> Self {
        debug_assert!(!parts.is_empty(), "复合刑成分不得为空");
        debug_assert!(
            parts.iter().all(|p| p.parts_inner().is_none()),
            "复合刑成分不得嵌套复合变体"
        );
        Self {
            id: parts[0].id(),
            parts,
        }
    }
}

// ==========================================
// Sentence - 刑期封闭枚举
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sentence_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentence {
    StandardDeterminate(StandardDeterminateSentence),
    ExtendedDeterminate(ExtendedDeterminateSentence),
    Sopc(SopcSentence),
    AFine(AFineSentence),
    DetentionTrainingOrder(DetentionTrainingOrderSentence),
    Botus(BotusSentence),
    Consecutive(CompositeSentence),
    SingleTerm(CompositeSentence),
    DtoSingleTerm(CompositeSentence),
}

impl Sentence {
    /// 稳定标识
    pub fn id(&self) -> Uuid {
        match self {
            Sentence::StandardDeterminate(s) => s.id,
            Sentence::ExtendedDeterminate(s) => s.id,
            Sentence::Sopc(s) => s.id,
            Sentence::AFine(s) => s.id,
            Sentence::DetentionTrainingOrder(s) => s.id,
            Sentence::Botus(s) => s.id,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => s.id,
        }
    }

    /// 判决日 (复合刑取首成分)
    pub fn sentenced_at(&self) -> NaiveDate {
        match self {
            Sentence::StandardDeterminate(s) => s.sentenced_at,
            Sentence::ExtendedDeterminate(s) => s.sentenced_at,
            Sentence::Sopc(s) => s.sentenced_at,
            Sentence::AFine(s) => s.sentenced_at,
            Sentence::DetentionTrainingOrder(s) => s.sentenced_at,
            Sentence::Botus(s) => s.sentenced_at,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => {
                s.parts[0].sentenced_at()
            }
        }
    }

    /// 犯罪事实 (复合刑取首成分)
    pub fn offence(&self) -> &Offence {
        match self {
            Sentence::StandardDeterminate(s) => &s.offence,
            Sentence::ExtendedDeterminate(s) => &s.offence,
            Sentence::Sopc(s) => &s.offence,
            Sentence::AFine(s) => &s.offence,
            Sentence::DetentionTrainingOrder(s) => &s.offence,
            Sentence::Botus(s) => &s.offence,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => {
                s.parts[0].offence()
            }
        }
    }

    /// 届满口径的名义刑期 (EDS/SOPC 含附加许可期, 复合刑聚合成分)
    pub fn expiry_duration(&self) -> SentenceDuration {
        match self {
            Sentence::StandardDeterminate(s) => s.duration,
            Sentence::ExtendedDeterminate(s) => {
                SentenceDuration::aggregate(&[s.custodial_duration, s.extension_duration])
            }
            Sentence::Sopc(s) => {
                SentenceDuration::aggregate(&[s.custodial_duration, s.licence_duration])
            }
            Sentence::AFine(s) => s.duration,
            Sentence::DetentionTrainingOrder(s) => s.duration,
            Sentence::Botus(s) => s.duration,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => {
                let parts: Vec<SentenceDuration> =
                    s.parts.iter().map(|p| p.expiry_duration()).collect();
                SentenceDuration::aggregate(&parts)
            }
        }
    }

    /// 在押口径的名义刑期 (EDS/SOPC 仅在押段, 其余同届满口径)
    pub fn custodial_duration(&self) -> SentenceDuration {
        match self {
            Sentence::ExtendedDeterminate(s) => s.custodial_duration,
            Sentence::Sopc(s) => s.custodial_duration,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => {
                let parts: Vec<SentenceDuration> =
                    s.parts.iter().map(|p| p.custodial_duration()).collect();
                SentenceDuration::aggregate(&parts)
            }
            _ => self.expiry_duration(),
        }
    }

    /// 召回状态 (复合刑取成分中首个非空值)
    pub fn recall_type(&self) -> Option<RecallType> {
        match self {
            Sentence::StandardDeterminate(s) => s.recall_type,
            Sentence::ExtendedDeterminate(s) => s.recall_type,
            Sentence::Sopc(s) => s.recall_type,
            Sentence::AFine(s) => s.recall_type,
            Sentence::DetentionTrainingOrder(s) => s.recall_type,
            Sentence::Botus(s) => s.recall_type,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => {
                s.parts.iter().find_map(|p| p.recall_type())
            }
        }
    }

    /// 判断是否处于召回状态
    pub fn is_recall(&self) -> bool {
        self.recall_type().is_some()
    }

    /// 连续刑前驱引用 (复合变体与罚金/BOTUS 无前驱)
    pub fn consecutive_to(&self) -> Option<Uuid> {
        match self {
            Sentence::StandardDeterminate(s) => s.consecutive_to,
            Sentence::ExtendedDeterminate(s) => s.consecutive_to,
            Sentence::Sopc(s) => s.consecutive_to,
            Sentence::DetentionTrainingOrder(s) => s.consecutive_to,
            Sentence::AFine(_)
            | Sentence::Botus(_)
            | Sentence::Consecutive(_)
            | Sentence::SingleTerm(_)
            | Sentence::DtoSingleTerm(_) => None,
        }
    }

    /// 有序成分列表 (非复合变体返回仅含自身的单元素列表)
    pub fn parts(&self) -> Vec<&Sentence> {
        match self.parts_inner() {
            Some(parts) => parts.iter().collect(),
            None => vec![self],
        }
    }

    /// 复合变体的成分切片 (非复合变体返回 None)
    pub fn parts_inner(&self) -> Option<&[Sentence]> {
        match self {
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) | Sentence::DtoSingleTerm(s) => {
                Some(&s.parts)
            }
            _ => None,
        }
    }

    /// 判断刑期是否不短于给定数量的单位 (锚定判决日)
    pub fn duration_at_least(&self, amount: u32, unit: DurationUnit) -> bool {
        self.expiry_duration()
            .at_least(amount, unit, self.sentenced_at())
    }

    /// 判断是否为 DTO 族刑期 (DTO / DTO 单一刑期 / 全 DTO 连续刑)
    pub fn is_dto_like(&self) -> bool {
        match self {
            Sentence::DetentionTrainingOrder(_) | Sentence::DtoSingleTerm(_) => true,
            Sentence::Consecutive(s) => s
                .parts
                .iter()
                .all(|p| matches!(p, Sentence::DetentionTrainingOrder(_))),
            _ => false,
        }
    }

    /// 判断是否携带 ORA 许可期
    ///
    /// 复合刑只要任一成分为 ORA 即视为携带
    pub fn is_ora(&self) -> bool {
        match self {
            Sentence::StandardDeterminate(s) => s.has_ora_licence,
            Sentence::Consecutive(s) | Sentence::SingleTerm(s) => {
                s.parts.iter().any(|p| p.is_ora())
            }
            _ => false,
        }
    }

    /// 判断是否为 SDS+ 刑期 (复合刑要求全部定期刑成分均为 SDS+)
    pub fn is_sds_plus(&self) -> bool {
        match self {
            Sentence::StandardDeterminate(s) => s.is_sds_plus,
            Sentence::Consecutive(s) => s.parts.iter().all(|p| p.is_sds_plus()),
            _ => false,
        }
    }
}
