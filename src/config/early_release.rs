// ==========================================
// 刑释日期计算系统 - 提前释放方案配置
// ==========================================
// 依据: SDS40 提前释放方案 (2024 年刑期释放点调整)
// 职责: 释放点乘数表 + 批次定义 + 资格过滤
// 红线: 配置在一次运行内只读共享, 运行中不得变更
// ==========================================

use crate::domain::calculation::ReleasePoint;
use crate::domain::legislation;
use crate::domain::sentence::Sentence;
use crate::domain::types::{IdentificationTrack, TrancheAllocationType, TrancheName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ReleasePointMultiplier - 单轨道乘数对
// ==========================================
// historic: 批次生效日之前适用; current: 生效日当日及之后适用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePointMultiplier {
    pub historic: ReleasePoint, // 生效前乘数
    pub current: ReleasePoint,  // 生效后乘数
}

impl ReleasePointMultiplier {
    /// 不随批次变化的恒定乘数
    pub fn constant(point: ReleasePoint) -> Self {
        Self {
            historic: point,
            current: point,
        }
    }
}

// ==========================================
// Tranche - 批次定义
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    pub commencement_date: NaiveDate,              // 生效日
    pub allocation_type: TrancheAllocationType,    // 分配类型
    pub duration_years: Option<u32>,               // 刑期界限 (年, 按分配类型解释)
    pub name: TrancheName,                         // 批次名称
}

impl Tranche {
    /// 判断某一刑期是否落入本批次的分配范围
    ///
    /// # 规则
    /// - 按刑期长度分配的批次只覆盖非召回刑期
    /// - HDC 召回批次只覆盖定期召回刑期
    pub fn allocates(&self, sentence: &Sentence) -> bool {
        match self.allocation_type {
            TrancheAllocationType::SentenceLengthUnder => match self.duration_years {
                Some(years) => {
                    !sentence.is_recall()
                        && !sentence.duration_at_least(years, crate::domain::types::DurationUnit::Years)
                }
                None => !sentence.is_recall(),
            },
            TrancheAllocationType::SentenceLengthOver => match self.duration_years {
                Some(years) => {
                    !sentence.is_recall()
                        && sentence.duration_at_least(years, crate::domain::types::DurationUnit::Years)
                }
                None => !sentence.is_recall(),
            },
            TrancheAllocationType::HdcRecall => sentence
                .recall_type()
                .map(|r| r.is_fixed_term_recall())
                .unwrap_or(false),
        }
    }
}

// ==========================================
// Sds40TrancheConfiguration - 三批次默认生效日
// ==========================================
// 用途: 无专门提前释放配置时的默认值来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sds40TrancheConfiguration {
    pub tranche_one_date: NaiveDate,
    pub tranche_two_date: NaiveDate,
    pub tranche_three_date: NaiveDate,
}

impl Default for Sds40TrancheConfiguration {
    fn default() -> Self {
        Self {
            tranche_one_date: legislation::sds40_tranche_one_default_date(),
            tranche_two_date: legislation::sds40_tranche_two_default_date(),
            tranche_three_date: legislation::sds40_tranche_three_default_date(),
        }
    }
}

// ==========================================
// EarlyReleaseConfiguration - 单一提前释放方案
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyReleaseConfiguration {
    pub multipliers: BTreeMap<String, ReleasePointMultiplier>, // 轨道名 -> 乘数对
    pub tranches: Vec<Tranche>,                                // 有序批次列表
}

impl EarlyReleaseConfiguration {
    /// 按识别轨道取乘数对 (未配置的轨道退回恒定历史乘数)
    pub fn multiplier_for(&self, track: IdentificationTrack) -> Option<ReleasePointMultiplier> {
        self.multipliers.get(&track.to_string()).copied()
    }

    /// 判断刑期是否在方案资格范围内 (轨道受影响 且 任一批次可分配)
    pub fn filter_applies(&self, sentence: &Sentence, track: IdentificationTrack) -> bool {
        track.is_early_release_affected()
            && self.tranches.iter().any(|t| t.allocates(sentence))
    }

    /// 首批次生效日 (无批次上下文时的默认参照)
    pub fn first_commencement_date(&self) -> Option<NaiveDate> {
        self.tranches.first().map(|t| t.commencement_date)
    }

    /// 按批次名称取批次定义
    pub fn tranche_named(&self, name: TrancheName) -> Option<&Tranche> {
        self.tranches.iter().find(|t| t.name == name)
    }
}

// ==========================================
// EarlyReleaseConfigurations - 方案集合 (有序)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyReleaseConfigurations {
    pub configurations: Vec<EarlyReleaseConfiguration>,
    pub tranche_defaults: Sds40TrancheConfiguration,
}

impl EarlyReleaseConfigurations {
    /// SDS40 法定默认方案
    ///
    /// # 规则
    /// - 标准定期刑: 历史乘数 1/2 -> 生效后 2/5
    /// - 第一批次: 刑期 < 5 年; 第二批次: 刑期 >= 5 年; 第三批次: HDC 召回
    pub fn sds40_default() -> Self {
        let defaults = Sds40TrancheConfiguration::default();
        let mut multipliers = BTreeMap::new();
        multipliers.insert(
            IdentificationTrack::SdsStandardRelease.to_string(),
            ReleasePointMultiplier {
                historic: ReleasePoint::HALF,
                current: ReleasePoint::TWO_FIFTHS,
            },
        );

        let configuration = EarlyReleaseConfiguration {
            multipliers,
            tranches: vec![
                Tranche {
                    commencement_date: defaults.tranche_one_date,
                    allocation_type: TrancheAllocationType::SentenceLengthUnder,
                    duration_years: Some(5),
                    name: TrancheName::TrancheOne,
                },
                Tranche {
                    commencement_date: defaults.tranche_two_date,
                    allocation_type: TrancheAllocationType::SentenceLengthOver,
                    duration_years: Some(5),
                    name: TrancheName::TrancheTwo,
                },
                Tranche {
                    commencement_date: defaults.tranche_three_date,
                    allocation_type: TrancheAllocationType::HdcRecall,
                    duration_years: None,
                    name: TrancheName::TrancheThree,
                },
            ],
        };

        Self {
            configurations: vec![configuration],
            tranche_defaults: defaults,
        }
    }

    /// 当前生效的方案 (有序集合的首个)
    pub fn active(&self) -> Option<&EarlyReleaseConfiguration> {
        self.configurations.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::offence::Offence;
    use crate::domain::sentence::StandardDeterminateSentence;
    use crate::domain::types::DurationUnit;
    use crate::domain::SentenceDuration;
    use uuid::Uuid;

    fn sds(years: u32) -> Sentence {
        let sentenced_at = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        Sentence::StandardDeterminate(StandardDeterminateSentence {
            id: Uuid::new_v4(),
            offence: Offence::new(sentenced_at, "TEST"),
            duration: SentenceDuration::of(years, DurationUnit::Years),
            sentenced_at,
            recall_type: None,
            consecutive_to: None,
            is_sds_plus: false,
            has_ora_licence: true,
        })
    }

    #[test]
    fn test_tranche_one_allocates_short_terms() {
        let configs = EarlyReleaseConfigurations::sds40_default();
        let config = configs.active().unwrap();
        let tranche_one = config.tranche_named(TrancheName::TrancheOne).unwrap();
        let tranche_two = config.tranche_named(TrancheName::TrancheTwo).unwrap();

        let short = sds(2);
        let long = sds(6);
        assert!(tranche_one.allocates(&short));
        assert!(!tranche_one.allocates(&long));
        assert!(tranche_two.allocates(&long));
        assert!(!tranche_two.allocates(&short));
    }

    #[test]
    fn test_sds40_multiplier_table() {
        let configs = EarlyReleaseConfigurations::sds40_default();
        let config = configs.active().unwrap();
        let multiplier = config
            .multiplier_for(IdentificationTrack::SdsStandardRelease)
            .unwrap();
        assert_eq!(multiplier.historic, ReleasePoint::HALF);
        assert_eq!(multiplier.current, ReleasePoint::TWO_FIFTHS);
        assert!(config
            .multiplier_for(IdentificationTrack::SdsPlusRelease)
            .is_none());
    }

    #[test]
    fn test_filter_excludes_recalled_sentence() {
        let configs = EarlyReleaseConfigurations::sds40_default();
        let config = configs.active().unwrap();
        let mut sentence = sds(2);
        if let Sentence::StandardDeterminate(ref mut s) = sentence {
            s.recall_type = Some(crate::domain::types::RecallType::StandardRecall);
        }
        assert!(!config.filter_applies(&sentence, IdentificationTrack::SdsStandardRelease));
    }
}
