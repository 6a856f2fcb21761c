//! `autocomplete`：取词、查候选、选词、把候选写回缓冲区。
//!
//! 约定：
//! - 所有操作都作用在“展示文本”上（含软换行），下标是字符下标
//! - 任何失败都退化为“没有候选”，绝不破坏缓冲区
use crate::{
    error::EditorError,
    filter::{DedupTruncate, Filter},
    model::CandidateEntry,
    scanner::WordChars,
    vocabulary::Vocabulary,
};

/// 默认候选数量上限。
pub const DEFAULT_MAX_CANDIDATES: usize = 20;

/// 向词表多要的倍数：去重后仍能凑满 `max_size`。
const DEDUP_HEADROOM: usize = 2;

#[derive(Debug, Clone)]
pub struct AutocompleteEngine {
    word_chars: WordChars,
    max_size: usize,
}

impl Default for AutocompleteEngine {
    fn default() -> Self {
        Self::new(WordChars::default(), DEFAULT_MAX_CANDIDATES)
    }
}

impl AutocompleteEngine {
    pub fn new(word_chars: WordChars, max_size: usize) -> Self {
        Self {
            word_chars,
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn word_chars(&self) -> &WordChars {
        &self.word_chars
    }

    pub fn find_word_start(&self, buffer: &str, end_pos: usize) -> usize {
        self.word_chars.find_word_start_str(buffer, end_pos)
    }

    /// 光标前正在输入的词（去掉软换行）。空串表示不提示。
    pub fn current_word(&self, buffer: &str, cursor: usize) -> String {
        let chars: Vec<char> = buffer.chars().collect();
        let end = cursor.min(chars.len());
        let start = self.word_chars.find_word_start(&chars, end);
        chars[start..end].iter().filter(|&&c| c != '\n').collect()
    }

    /// 按前缀查候选，最多 `max_size` 条。词表未加载或词为空时返回空。
    pub fn lookup(
        &self,
        vocabulary: &dyn Vocabulary,
        word: &str,
        max_size: usize,
    ) -> Vec<CandidateEntry> {
        if word.is_empty() || max_size == 0 {
            return Vec::new();
        }
        if !vocabulary.is_loaded() {
            tracing::trace!(word, "vocabulary not loaded; no candidates");
            return Vec::new();
        }
        let requested = max_size.saturating_mul(DEDUP_HEADROOM);
        DedupTruncate { limit: max_size }.apply(vocabulary.search(word, requested))
    }

    /// 使用引擎默认上限的 `lookup`。
    pub fn candidates(&self, vocabulary: &dyn Vocabulary, word: &str) -> Vec<CandidateEntry> {
        self.lookup(vocabulary, word, self.max_size)
    }

    /// 用 `term` 替换光标前的词，返回新缓冲区与新光标。
    ///
    /// 若替换后光标跨进了下一行，在原行末尾补一个临时 `\n` 并让光标越过它；
    /// 调用方随后必须立即 reflow。
    pub fn apply(
        &self,
        buffer: &str,
        cursor: usize,
        term: &str,
        line_width: usize,
    ) -> (String, usize) {
        let mut chars: Vec<char> = buffer.chars().collect();
        let cursor = cursor.min(chars.len());
        let start = self.word_chars.find_word_start(&chars, cursor);
        let term_len = term.chars().count();
        chars.splice(start..cursor, term.chars());

        let stride = line_width.max(1) + 1;
        let mut new_cursor = start + term_len;
        if new_cursor / stride > cursor / stride {
            let boundary = (stride * (cursor / stride + 1) - 1).min(chars.len());
            chars.insert(boundary, '\n');
            new_cursor += 1;
        }
        (chars.into_iter().collect(), new_cursor)
    }
}

/// 把请求的高亮下标夹到 `[0, len-1]`；列表为空时返回 `(0, None)`。
pub fn select(candidates: &[CandidateEntry], requested: isize) -> (usize, Option<&CandidateEntry>) {
    if candidates.is_empty() {
        return (0, None);
    }
    let last = candidates.len() - 1;
    let index = usize::try_from(requested).map_or(0, |i| i.min(last));
    (index, candidates.get(index))
}

/// 按下标取候选；越界是“瞬时错误”，由调用方记录后忽略。
pub fn resolve(candidates: &[CandidateEntry], index: usize) -> Result<&CandidateEntry, EditorError> {
    candidates.get(index).ok_or(EditorError::CandidateOutOfRange {
        index,
        len: candidates.len(),
    })
}

/// 词频标签：`<=100` 原样；`<=500,000` 用 K；否则用 M（两位小数）。
pub fn frequency_label(frequency: u64) -> String {
    if frequency <= 100 {
        frequency.to_string()
    } else if frequency <= 500_000 {
        format!("{:.2}K", frequency as f64 / 1_000.0)
    } else {
        format!("{:.2}M", frequency as f64 / 1_000_000.0)
    }
}

pub fn display_label(entry: &CandidateEntry) -> String {
    frequency_label(entry.frequency)
}
