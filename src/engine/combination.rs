// ==========================================
// 刑释日期计算系统 - 连续刑组合引擎
// ==========================================
// 职责: 按 consecutive_to 引用把散件刑期组合为连续刑复合体
// 红线: 前驱必须存在, 链不得有环, 违反即致命不变量错误
// 说明: 时间线每逢判决事件重跑组合, 新链成员与已开链成员正确合并
// ==========================================

use crate::domain::sentence::{CompositeSentence, Sentence};
use crate::error::CalculationError;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

// ==========================================
// SentenceCombiner - 连续刑组合器
// ==========================================
pub struct SentenceCombiner;

impl SentenceCombiner {
    /// 对工作集执行连续刑组合
    ///
    /// # 规则
    /// 1. 既有复合体先拆回散件 (保证新成员可并入已开链)
    /// 2. 按 consecutive_to 建立 前驱 -> 后继 邻接表
    /// 3. 自链根起按邻接表展开为有序成分列表
    /// 4. 无后继且无前驱的刑期原样保留
    ///
    /// # 返回
    /// 组合后的刑期列表 (复合体标识取链根标识)
    pub fn combine(sentences: &[Sentence]) -> Result<Vec<Sentence>, CalculationError> {
        // 拆回散件
        let mut flat: Vec<Sentence> = Vec::new();
        for sentence in sentences {
            match sentence.parts_inner() {
                Some(parts) if matches!(sentence, Sentence::Consecutive(_)) => {
                    flat.extend(parts.iter().cloned());
                }
                _ => flat.push(sentence.clone()),
            }
        }

        let ids: HashSet<Uuid> = flat.iter().map(|s| s.id()).collect();

        // 前驱 -> 后继 (同一前驱的多个后继按判决日排序, 保证确定性)
        let mut followers: HashMap<Uuid, Vec<usize>> = HashMap::new();
        for (index, sentence) in flat.iter().enumerate() {
            if let Some(target) = sentence.consecutive_to() {
                if !ids.contains(&target) {
                    return Err(CalculationError::ConsecutiveChainBroken {
                        sentence_id: sentence.id(),
                        target,
                    });
                }
                followers.entry(target).or_default().push(index);
            }
        }
        for chain in followers.values_mut() {
            chain.sort_by_key(|&i| (flat[i].sentenced_at(), flat[i].id()));
        }

        Self::detect_cycles(&flat)?;

        // 链根 = 无前驱且有后继者; 自根展开
        let mut consumed: HashSet<usize> = HashSet::new();
        let mut combined: BTreeMap<usize, Sentence> = BTreeMap::new();

        for (index, sentence) in flat.iter().enumerate() {
            if sentence.consecutive_to().is_some() {
                continue; // 非链根, 由根侧吸收
            }
            let mut chain: Vec<usize> = Vec::new();
            Self::expand_chain(index, &followers, &flat, &mut chain);
            if chain.len() > 1 {
                let parts: Vec<Sentence> = chain.iter().map(|&i| flat[i].clone()).collect();
                consumed.extend(chain.iter().copied());
                combined.insert(index, Sentence::Consecutive(CompositeSentence::from_parts(parts)));
            }
        }

        let mut result: Vec<Sentence> = Vec::new();
        for (index, sentence) in flat.into_iter().enumerate() {
            if let Some(composite) = combined.remove(&index) {
                result.push(composite);
            } else if !consumed.contains(&index) {
                result.push(sentence);
            }
        }
        Ok(result)
    }

    /// 深度优先展开链 (根 + 全部传递后继, 有序)
    fn expand_chain(
        index: usize,
        followers: &HashMap<Uuid, Vec<usize>>,
        flat: &[Sentence],
        chain: &mut Vec<usize>,
    ) {
        chain.push(index);
        if let Some(next) = followers.get(&flat[index].id()) {
            for &follower in next {
                Self::expand_chain(follower, followers, flat, chain);
            }
        }
    }

    /// 沿 consecutive_to 检测环
    fn detect_cycles(flat: &[Sentence]) -> Result<(), CalculationError> {
        let by_id: HashMap<Uuid, &Sentence> = flat.iter().map(|s| (s.id(), s)).collect();
        for sentence in flat {
            let mut visited: HashSet<Uuid> = HashSet::new();
            let mut current = sentence;
            while let Some(target) = current.consecutive_to() {
                if !visited.insert(current.id()) {
                    return Err(CalculationError::ConsecutiveChainCycle {
                        sentence_id: sentence.id(),
                    });
                }
                match by_id.get(&target).copied() {
                    Some(next) => current = next,
                    None => break, // 断链在组合阶段另行报错
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duration::SentenceDuration;
    use crate::domain::offence::Offence;
    use crate::domain::sentence::StandardDeterminateSentence;
    use crate::domain::types::DurationUnit;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sds(id: Uuid, sentenced_at: NaiveDate, consecutive_to: Option<Uuid>) -> Sentence {
        Sentence::StandardDeterminate(StandardDeterminateSentence {
            id,
            offence: Offence::new(sentenced_at, "TEST"),
            duration: SentenceDuration::of(12, DurationUnit::Months),
            sentenced_at,
            recall_type: None,
            consecutive_to,
            is_sds_plus: false,
            has_ora_licence: true,
        })
    }

    #[test]
    fn test_combine_two_link_chain() {
        let root_id = Uuid::new_v4();
        let follower_id = Uuid::new_v4();
        let sentences = vec![
            sds(root_id, ymd(2020, 1, 1), None),
            sds(follower_id, ymd(2020, 3, 1), Some(root_id)),
        ];
        let combined = SentenceCombiner::combine(&sentences).unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].id(), root_id);
        assert_eq!(combined[0].parts().len(), 2);
    }

    #[test]
    fn test_recombination_absorbs_new_member() {
        // 已组合的链 + 新到的第三个成员 -> 重组为三段链
        let root_id = Uuid::new_v4();
        let second_id = Uuid::new_v4();
        let third_id = Uuid::new_v4();
        let first_pass = SentenceCombiner::combine(&[
            sds(root_id, ymd(2020, 1, 1), None),
            sds(second_id, ymd(2020, 3, 1), Some(root_id)),
        ])
        .unwrap();

        let mut working = first_pass;
        working.push(sds(third_id, ymd(2020, 6, 1), Some(second_id)));
        let combined = SentenceCombiner::combine(&working).unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].parts().len(), 3);
    }

    #[test]
    fn test_standalone_preserved() {
        let sentences = vec![sds(Uuid::new_v4(), ymd(2020, 1, 1), None)];
        let combined = SentenceCombiner::combine(&sentences).unwrap();
        assert_eq!(combined.len(), 1);
        assert!(matches!(combined[0], Sentence::StandardDeterminate(_)));
    }

    #[test]
    fn test_broken_chain_is_fatal() {
        let sentences = vec![sds(Uuid::new_v4(), ymd(2020, 1, 1), Some(Uuid::new_v4()))];
        let error = SentenceCombiner::combine(&sentences).unwrap_err();
        assert!(matches!(error, CalculationError::ConsecutiveChainBroken { .. }));
    }

    #[test]
    fn test_cycle_is_fatal() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let sentences = vec![
            sds(a, ymd(2020, 1, 1), Some(b)),
            sds(b, ymd(2020, 2, 1), Some(a)),
        ];
        let error = SentenceCombiner::combine(&sentences).unwrap_err();
        assert!(matches!(error, CalculationError::ConsecutiveChainCycle { .. }));
    }
}
