//! `filter`：候选后处理（去重/裁剪）。
//!
//! 排序归词表所有，这里只保证顺序不变。

use std::collections::HashSet;

use crate::model::CandidateEntry;

/// Filter：对候选列表做后处理。
pub trait Filter: Send + Sync {
    fn apply(&self, candidates: Vec<CandidateEntry>) -> Vec<CandidateEntry>;
}

/// 默认 filter：按上屏文本去重（保留排名靠前的一条），截断到 limit。
pub struct DedupTruncate {
    pub limit: usize,
}

impl Filter for DedupTruncate {
    fn apply(&self, mut candidates: Vec<CandidateEntry>) -> Vec<CandidateEntry> {
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.completion_text().to_owned()));
        candidates.truncate(self.limit);
        candidates
    }
}
