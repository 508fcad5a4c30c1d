// ==========================================
// 刑释日期计算系统 - 刑期分类引擎
// ==========================================
// 职责: 按刑期形态/日期/召回状态判定适用日期类型集合与识别轨道
// 红线: 纯函数判定, 只依赖 (刑期形态, 日期, 召回类型, 罪犯), 不依赖时间线状态
// 红线: 变体分派穷尽 match, 分支规则输出可回溯
// ==========================================

use crate::domain::booking::Offender;
use crate::domain::legislation;
use crate::domain::sentence::Sentence;
use crate::domain::types::{DurationUnit, IdentificationTrack, ReleaseDateType};
use crate::engine::services::EligibilityPolicy;
use crate::error::CalculationError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// Classified - 分类结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub track: IdentificationTrack,              // 识别轨道
    pub date_types: BTreeSet<ReleaseDateType>,   // 适用日期类型集合
}

// ==========================================
// ClassificationEngine - 分类引擎
// ==========================================
pub struct ClassificationEngine {
    policy: Arc<dyn EligibilityPolicy>,
}

impl ClassificationEngine {
    pub fn new(policy: Arc<dyn EligibilityPolicy>) -> Self {
        Self { policy }
    }

    /// 分类单个刑期
    ///
    /// # 规则
    /// 1. 按变体执行专属规则, 得到基础集合与轨道
    /// 2. 按适用性判定追加 TUSED / HDCED
    /// 3. 召回覆盖: 无条件移除 HDCED, 无条件加入 PRRD
    pub fn classify(
        &self,
        sentence: &Sentence,
        offender: &Offender,
    ) -> Result<Classified, CalculationError> {
        let (track, mut date_types) = match sentence {
            Sentence::StandardDeterminate(_) | Sentence::SingleTerm(_) => {
                Self::standard_rule(sentence)
            }
            Sentence::Consecutive(_) => Self::consecutive_rule(sentence)?,
            Sentence::ExtendedDeterminate(s) => Self::eds_rule(s.automatic_release, sentence.is_recall()),
            Sentence::Sopc(s) => Self::sopc_rule(s.sentenced_under_18, s.sentenced_at, sentence.is_recall()),
            Sentence::AFine(s) => Self::afine_rule(s.fine_amount, s.sentenced_at),
            Sentence::DetentionTrainingOrder(s) => {
                let track = Self::dto_track_for_date(s.sentenced_at);
                (track, Self::dto_date_types())
            }
            Sentence::DtoSingleTerm(s) => {
                if s.parts.is_empty() {
                    return Err(CalculationError::EmptyCompositeSentence { sentence_id: s.id });
                }
                (Self::dto_track_for_parts(&s.parts), Self::dto_date_types())
            }
            Sentence::Botus(s) => Self::botus_rule(s.historic_tused.is_some()),
        };

        // 追加 TUSED / HDCED (适用性判定由协作者函数给出)
        if self.policy.tused_applies(sentence, offender) {
            date_types.insert(ReleaseDateType::Tused);
        }
        if self.policy.hdced_applies(sentence, offender) {
            date_types.insert(ReleaseDateType::Hdced);
        }

        // 召回覆盖提前释放资格
        if sentence.is_recall() {
            date_types.remove(&ReleaseDateType::Hdced);
            date_types.insert(ReleaseDateType::Prrd);
        }

        debug!(
            sentence_id = %sentence.id(),
            track = %track,
            date_types = ?date_types,
            "刑期分类完成"
        );
        Ok(Classified { track, date_types })
    }

    // ==========================================
    // 变体专属规则
    // ==========================================

    /// 标准定期刑 / 单一刑期规则
    fn standard_rule(sentence: &Sentence) -> (IdentificationTrack, BTreeSet<ReleaseDateType>) {
        let sentenced_at = sentence.sentenced_at();
        let committed = sentence.offence().reference_date();
        let anchor = sentenced_at;

        if legislation::is_before_cja_laspo(sentenced_at, committed) {
            return Self::before_cja_laspo_rule(sentence);
        }

        let track = if sentence.is_sds_plus() {
            IdentificationTrack::SdsPlusRelease
        } else {
            IdentificationTrack::SdsStandardRelease
        };

        let duration = sentence.expiry_duration();
        let short_pre_ora = duration.under(12, DurationUnit::Months, anchor)
            && legislation::is_offence_before_ora(committed);
        let one_day_or_less = duration.length_in_days(anchor) <= 1;

        let date_types = if short_pre_ora || one_day_or_less {
            BTreeSet::from([ReleaseDateType::Ard, ReleaseDateType::Sed])
        } else {
            BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd])
        };
        (track, date_types)
    }

    /// CJA/LASPO 之前的旧制规则
    ///
    /// # 规则
    /// - 刑期 >= 4 年 -> CRD + SLED (+ NPD, 2/3 非假释点)
    /// - 刑期 >= 12 个月 -> LED + CRD + SED
    /// - 其余 -> ARD + SED
    fn before_cja_laspo_rule(sentence: &Sentence) -> (IdentificationTrack, BTreeSet<ReleaseDateType>) {
        let track = IdentificationTrack::SdsBeforeCjaLaspo;
        let date_types = if sentence.duration_at_least(4, DurationUnit::Years) {
            BTreeSet::from([ReleaseDateType::Crd, ReleaseDateType::Sled, ReleaseDateType::Npd])
        } else if sentence.duration_at_least(12, DurationUnit::Months) {
            BTreeSet::from([ReleaseDateType::Led, ReleaseDateType::Crd, ReleaseDateType::Sed])
        } else {
            BTreeSet::from([ReleaseDateType::Ard, ReleaseDateType::Sed])
        };
        (track, date_types)
    }

    /// 连续刑链规则 (检视整条有序链)
    fn consecutive_rule(
        sentence: &Sentence,
    ) -> Result<(IdentificationTrack, BTreeSet<ReleaseDateType>), CalculationError> {
        let parts = sentence
            .parts_inner()
            .ok_or(CalculationError::UnsupportedSentenceShape {
                sentence_id: sentence.id(),
                reason: "连续刑缺少成分".to_string(),
            })?;
        if parts.is_empty() {
            return Err(CalculationError::EmptyCompositeSentence {
                sentence_id: sentence.id(),
            });
        }

        let any_eds = parts.iter().any(|p| matches!(p, Sentence::ExtendedDeterminate(_)));
        let any_sopc = parts.iter().any(|p| matches!(p, Sentence::Sopc(_)));

        // 规则 1: 链含 EDS/SOPC
        if any_eds || any_sopc {
            let discretionary = any_sopc
                || parts.iter().any(|p| {
                    matches!(p, Sentence::ExtendedDeterminate(e) if !e.automatic_release)
                });
            let mut date_types = BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd]);
            let track = if discretionary {
                date_types.insert(ReleaseDateType::Ped);
                IdentificationTrack::EdsDiscretionaryRelease
            } else {
                IdentificationTrack::EdsAutomaticRelease
            };
            return Ok((track, date_types));
        }

        // 规则 2: 全 SDS+ 链
        let all_standard = parts
            .iter()
            .all(|p| matches!(p, Sentence::StandardDeterminate(_)));
        if all_standard && sentence.is_sds_plus() {
            return Ok((
                IdentificationTrack::SdsPlusRelease,
                BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd]),
            ));
        }

        // 规则 3: 全 DTO 链
        if parts
            .iter()
            .all(|p| matches!(p, Sentence::DetentionTrainingOrder(_)))
        {
            return Ok((Self::dto_track_for_parts(parts), Self::dto_date_types()));
        }

        // 规则 4-6: 按成分法制断代
        let pre_era: Vec<bool> = parts
            .iter()
            .map(|p| legislation::is_before_cja_laspo(p.sentenced_at(), p.offence().reference_date()))
            .collect();
        let any_pre = pre_era.iter().any(|b| *b);
        let all_pre = pre_era.iter().all(|b| *b);

        if any_pre && !all_pre {
            // 跨法制链: 旧制部分满 4 年时携带分段 NPD (名义 CRD 标记)
            let mut date_types = BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd]);
            if Self::pre_era_days(parts) >= Self::four_year_days(sentence) {
                date_types.insert(ReleaseDateType::Npd);
            }
            return Ok((IdentificationTrack::SdsBeforeCjaLaspo, date_types));
        }

        if all_pre {
            return Ok(Self::before_cja_laspo_rule(sentence));
        }

        // 全新制链: ORA 与非 ORA (不足 12 个月) 混合时保留分离的 LED/SED
        let any_ora = parts.iter().any(|p| p.is_ora());
        let non_ora_short = parts.iter().filter(|p| !p.is_ora()).all(|p| {
            p.expiry_duration()
                .under(12, DurationUnit::Months, p.sentenced_at())
        });
        let any_non_ora = parts.iter().any(|p| !p.is_ora());

        let date_types = if any_ora && any_non_ora && non_ora_short {
            BTreeSet::from([ReleaseDateType::Led, ReleaseDateType::Sed, ReleaseDateType::Crd])
        } else {
            BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd])
        };
        Ok((IdentificationTrack::SdsStandardRelease, date_types))
    }

    /// 延长定期刑规则
    fn eds_rule(automatic_release: bool, is_recall: bool) -> (IdentificationTrack, BTreeSet<ReleaseDateType>) {
        let track = if automatic_release {
            IdentificationTrack::EdsAutomaticRelease
        } else {
            IdentificationTrack::EdsDiscretionaryRelease
        };
        if is_recall {
            // 召回: CRD/PED 由 PRRD 取代
            return (track, BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Prrd]));
        }
        let mut date_types = BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd]);
        if !automatic_release {
            date_types.insert(ReleaseDateType::Ped);
        }
        (track, date_types)
    }

    /// SOPC 规则
    fn sopc_rule(
        sentenced_under_18: bool,
        sentenced_at: chrono::NaiveDate,
        is_recall: bool,
    ) -> (IdentificationTrack, BTreeSet<ReleaseDateType>) {
        let track = if sentenced_under_18 || legislation::is_sentenced_on_or_after_pcsc(sentenced_at) {
            IdentificationTrack::SopcPedAtTwoThirds
        } else {
            IdentificationTrack::SopcPedAtHalfway
        };
        let date_types = if is_recall {
            BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Prrd])
        } else {
            BTreeSet::from([ReleaseDateType::Sled, ReleaseDateType::Crd, ReleaseDateType::Ped])
        };
        (track, date_types)
    }

    /// 罚金折算刑规则
    fn afine_rule(
        fine_amount: i64,
        sentenced_at: chrono::NaiveDate,
    ) -> (IdentificationTrack, BTreeSet<ReleaseDateType>) {
        let track = if fine_amount >= legislation::AFINE_FULL_TERM_THRESHOLD
            && sentenced_at >= legislation::afine_full_term_commencement_date()
        {
            IdentificationTrack::AfineArdAtFullTerm
        } else {
            IdentificationTrack::AfineArdAtHalfway
        };
        (track, BTreeSet::from([ReleaseDateType::Sed, ReleaseDateType::Ard]))
    }

    /// BOTUS 规则
    fn botus_rule(has_historic_tused: bool) -> (IdentificationTrack, BTreeSet<ReleaseDateType>) {
        let mut date_types = BTreeSet::from([ReleaseDateType::Ard, ReleaseDateType::Sed]);
        let track = if has_historic_tused {
            date_types.insert(ReleaseDateType::Tused);
            IdentificationTrack::BotusWithHistoricTused
        } else {
            IdentificationTrack::Botus
        };
        (track, date_types)
    }

    // ==========================================
    // DTO 辅助
    // ==========================================

    fn dto_date_types() -> BTreeSet<ReleaseDateType> {
        BTreeSet::from([
            ReleaseDateType::Sed,
            ReleaseDateType::Mtd,
            ReleaseDateType::Etd,
            ReleaseDateType::Ltd,
            ReleaseDateType::Tused,
        ])
    }

    fn dto_track_for_date(sentenced_at: chrono::NaiveDate) -> IdentificationTrack {
        if legislation::is_sentenced_on_or_after_pcsc(sentenced_at) {
            IdentificationTrack::DtoAfterPcsc
        } else {
            IdentificationTrack::DtoBeforePcsc
        }
    }

    /// 由成分轨道一致性推导 DTO 族轨道 (全部在 PCSC 前才取旧轨道)
    fn dto_track_for_parts(parts: &[Sentence]) -> IdentificationTrack {
        let unanimous_before = parts
            .iter()
            .all(|p| !legislation::is_sentenced_on_or_after_pcsc(p.sentenced_at()));
        if unanimous_before {
            IdentificationTrack::DtoBeforePcsc
        } else {
            IdentificationTrack::DtoAfterPcsc
        }
    }

    // ==========================================
    // 跨法制链辅助
    // ==========================================

    /// 旧制成分的聚合日数 (各成分锚定自身判决日)
    fn pre_era_days(parts: &[Sentence]) -> i64 {
        parts
            .iter()
            .filter(|p| legislation::is_before_cja_laspo(p.sentenced_at(), p.offence().reference_date()))
            .map(|p| p.expiry_duration().length_in_days(p.sentenced_at()))
            .sum()
    }

    fn four_year_days(sentence: &Sentence) -> i64 {
        use crate::domain::duration::SentenceDuration;
        SentenceDuration::of(4, DurationUnit::Years).length_in_days(sentence.sentenced_at())
    }
}
