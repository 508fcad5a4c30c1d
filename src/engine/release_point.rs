// ==========================================
// 刑释日期计算系统 - 释放点乘数解析引擎
// ==========================================
// 职责: 按识别轨道与参照日解析当前/历史释放点乘数
// 规则: 参照日在批次生效日当日及之后取 current, 否则取 historic;
//       无批次上下文时默认参照首批次生效日
// ==========================================

use crate::config::EarlyReleaseConfigurations;
use crate::domain::calculation::ReleasePoint;
use crate::domain::legislation;
use crate::domain::types::IdentificationTrack;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// ReleasePointResolver - 乘数解析器
// ==========================================
pub struct ReleasePointResolver {
    configurations: Arc<EarlyReleaseConfigurations>,
}

impl ReleasePointResolver {
    pub fn new(configurations: Arc<EarlyReleaseConfigurations>) -> Self {
        Self { configurations }
    }

    /// 各轨道的历史 (方案生效前) 释放点乘数
    pub fn historic_point(track: IdentificationTrack) -> ReleasePoint {
        match track {
            IdentificationTrack::SdsStandardRelease => ReleasePoint::HALF,
            IdentificationTrack::SdsPlusRelease => ReleasePoint::TWO_THIRDS,
            IdentificationTrack::SdsBeforeCjaLaspo => ReleasePoint::HALF,
            IdentificationTrack::EdsAutomaticRelease => ReleasePoint::TWO_THIRDS,
            // 裁量释放: 在押段满期释放, 假释点另由 PED 公式给出
            IdentificationTrack::EdsDiscretionaryRelease => ReleasePoint::FULL,
            IdentificationTrack::SopcPedAtHalfway => ReleasePoint::FULL,
            IdentificationTrack::SopcPedAtTwoThirds => ReleasePoint::FULL,
            IdentificationTrack::AfineArdAtHalfway => ReleasePoint::HALF,
            IdentificationTrack::AfineArdAtFullTerm => ReleasePoint::FULL,
            IdentificationTrack::DtoBeforePcsc => ReleasePoint::HALF,
            IdentificationTrack::DtoAfterPcsc => ReleasePoint::HALF,
            IdentificationTrack::Botus => ReleasePoint::HALF,
            IdentificationTrack::BotusWithHistoricTused => ReleasePoint::HALF,
        }
    }

    /// 各轨道的假释资格点 (无 PED 的轨道返回 None)
    pub fn ped_point(track: IdentificationTrack) -> Option<ReleasePoint> {
        match track {
            IdentificationTrack::EdsDiscretionaryRelease => Some(ReleasePoint::TWO_THIRDS),
            IdentificationTrack::SopcPedAtHalfway => Some(ReleasePoint::HALF),
            IdentificationTrack::SopcPedAtTwoThirds => Some(ReleasePoint::TWO_THIRDS),
            _ => None,
        }
    }

    /// 解析参照日适用的释放点乘数
    ///
    /// # 参数
    /// - track: 识别轨道
    /// - reference_date: 参照日 (通常为判决日或事件日)
    /// - tranche_commencement: 已分配批次的生效日 (无批次上下文时为 None)
    pub fn resolve(
        &self,
        track: IdentificationTrack,
        reference_date: NaiveDate,
        tranche_commencement: Option<NaiveDate>,
    ) -> ReleasePoint {
        let Some(config) = self.configurations.active() else {
            return Self::historic_point(track);
        };
        let Some(multiplier) = config.multiplier_for(track) else {
            return Self::historic_point(track);
        };

        // 无批次上下文时默认参照首批次生效日
        let commencement = tranche_commencement
            .or_else(|| config.first_commencement_date())
            .unwrap_or_else(legislation::sds40_tranche_one_default_date);

        if reference_date >= commencement {
            multiplier.current
        } else {
            multiplier.historic
        }
    }
}
