// ==========================================
// 刑释日期计算系统 - 时间线运行跟踪器
// ==========================================
// 职责: 一次运行的全部可变状态 (分组/指针/缓冲/批次快照)
// 红线: 状态只归属本次运行 (arena), 不跨运行共享
// ==========================================

use crate::domain::calculation::SentenceCalculation;
use crate::domain::result::SentenceGroup;
use crate::domain::sentence::Sentence;
use crate::domain::types::{ReleaseDateType, TrancheName};
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

// ==========================================
// HandleResult - 事件处理结果
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct HandleResult {
    pub requires_recalc: bool, // 是否需要重算最晚在押释放
    pub suppress_recalc: bool, // 是否压制本日剩余的重算
}

impl HandleResult {
    /// 需要重算
    pub fn recalc() -> Self {
        Self {
            requires_recalc: true,
            suppress_recalc: false,
        }
    }

    /// 无需重算
    pub fn none() -> Self {
        Self::default()
    }

    /// 压制本日剩余重算 (外部释放移动专用)
    pub fn suppress() -> Self {
        Self {
            requires_recalc: false,
            suppress_recalc: true,
        }
    }
}

// ==========================================
// TimelineTracker - 运行状态跟踪器
// ==========================================
pub struct TimelineTracker {
    pub working_sentences: HashMap<Uuid, Sentence>,        // 已出场刑期的当前形态 (复合体取代成分)
    pub calculations: HashMap<Uuid, SentenceCalculation>,  // 刑期 -> 计算状态
    pub current_group: Vec<Uuid>,                          // 当前开放在押分组
    pub current_group_start: Option<NaiveDate>,            // 当前分组起始日
    pub released_groups: Vec<SentenceGroup>,               // 已关闭分组
    pub latest_release: NaiveDate,                         // 最晚在押释放指针
    pub latest_release_sentence: Option<Uuid>,             // 支配释放指针的刑期
    pub release_pointer_frozen: bool,                      // 指针被外部释放移动冻结
    pub pada: i64,                                         // 判决前加罚缓冲 (PADA)
    pub allocated_tranche: Option<TrancheName>,            // 已分配批次 (单调)
    pub tranche_commencement: Option<NaiveDate>,           // 分配批次的生效日
    pub before_tranche_snapshot: Option<HashMap<Uuid, SentenceCalculation>>, // 批次前快照
    pub out_of_prison: bool,                               // 在押外状态
    pub latest_ual_end: Option<NaiveDate>,                 // 最近 UAL 结束日 (压制判定用)
    pub show_hints: bool,                                  // 是否展示提前释放提示
}

impl TimelineTracker {
    /// 初始状态: 空分组, 释放指针置于最早判决日
    pub fn new(initial_release_pointer: NaiveDate) -> Self {
        Self {
            working_sentences: HashMap::new(),
            calculations: HashMap::new(),
            current_group: Vec::new(),
            current_group_start: None,
            released_groups: Vec::new(),
            latest_release: initial_release_pointer,
            latest_release_sentence: None,
            release_pointer_frozen: false,
            pada: 0,
            allocated_tranche: None,
            tranche_commencement: None,
            before_tranche_snapshot: None,
            out_of_prison: false,
            latest_ual_end: None,
            show_hints: false,
        }
    }

    /// 关闭当前在押分组并冲入已释放列表
    ///
    /// 记录释放时许可期仍未届满的成员 (SLED/LED 晚于在押期结束日)
    pub fn close_group(&mut self) {
        if self.current_group.is_empty() {
            return;
        }
        let episode_end = self.latest_release;
        let episode_start = self
            .current_group_start
            .unwrap_or(episode_end);
        let open_licence_sentences: Vec<Uuid> = self
            .current_group
            .iter()
            .filter(|id| {
                self.calculations.get(*id).is_some_and(|calc| {
                    [ReleaseDateType::Sled, ReleaseDateType::Led]
                        .iter()
                        .filter_map(|t| calc.date_of(*t))
                        .any(|d| d > episode_end)
                })
            })
            .copied()
            .collect();

        self.released_groups.push(SentenceGroup {
            sentence_ids: std::mem::take(&mut self.current_group),
            episode_start,
            episode_end,
            open_licence_sentences,
        });
        self.current_group_start = None;
    }

    /// 当前分组内任一成员的计算状态 (在押级调整共享源)
    pub fn any_group_calculation(&self) -> Option<&SentenceCalculation> {
        self.current_group
            .iter()
            .find_map(|id| self.calculations.get(id))
    }

    /// 判断工作集中是否存在活动的标准 (非定期) 召回
    pub fn has_active_standard_recall(&self) -> bool {
        self.working_sentences.values().any(|s| {
            s.recall_type()
                .map(|r| !r.is_fixed_term_recall())
                .unwrap_or(false)
        })
    }
}
