use std::{fs, path::Path};

use mlt_core::{
    model::{CandidateEntry, Rgb},
    vocabulary::Vocabulary,
};
use thiserror::Error;

mod trie;

use trie::Trie;

/// 每个前缀节点预先排好的条目数；更大的查询退回全子树收集。
pub const DEFAULT_RANK_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("读取词表 {path} 失败：{source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TSV 第 {line} 行缺少词条")]
    MissingTerm { line: usize },
    #[error("TSV 第 {line} 行词频无效：'{value}'")]
    InvalidFrequency { line: usize, value: String },
    #[error("TSV 第 {line} 行颜色无效：'{value}'")]
    InvalidColor { line: usize, value: String },
}

/// 前缀树词表。
///
/// 排序：词频倒序，同频按词条字典序。前缀匹配不区分大小写。
/// 别名（`alias_code`，可用逗号分隔多个）也会建索引，命中别名同样返回原条目。
pub struct TrieVocabulary {
    entries: Vec<CandidateEntry>,
    trie: Trie,
}

impl TrieVocabulary {
    pub fn from_entries(entries: Vec<CandidateEntry>) -> Self {
        Self::from_entries_with_depth(entries, DEFAULT_RANK_DEPTH)
    }

    pub fn from_entries_with_depth(entries: Vec<CandidateEntry>, depth: usize) -> Self {
        let mut trie = Trie::new(depth);
        for (id, entry) in entries.iter().enumerate() {
            let id = id as u32;
            trie.insert(&entry.display_term.to_lowercase(), id);
            for alias in entry.alias_code.split(',').map(str::trim) {
                if !alias.is_empty() {
                    trie.insert(&alias.to_lowercase(), id);
                }
            }
        }
        trie.finalize(|a, b| rank(&entries[a as usize], &entries[b as usize]));
        Self { entries, trie }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VocabError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| VocabError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let vocabulary = Self::from_tsv_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            entries = vocabulary.len(),
            "vocabulary loaded"
        );
        Ok(vocabulary)
    }

    /// TSV 格式：
    ///
    /// - `term<TAB>frequency<TAB>alias<TAB>label<TAB>color`
    /// - 只有 term 必填；frequency 缺省为 0；color 为 `r,g,b` 或 `#rrggbb`，缺省白色
    /// - 允许空行与 `#` 开头注释行
    pub fn from_tsv_str(s: &str) -> Result<Self, VocabError> {
        let mut entries = Vec::new();
        for (idx, line) in s.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let mut it = line.split('\t').map(str::trim);
            let term = it.next().unwrap_or("");
            if term.is_empty() {
                return Err(VocabError::MissingTerm { line: line_no });
            }
            let frequency = match it.next().filter(|x| !x.is_empty()) {
                Some(raw) => raw.parse::<u64>().map_err(|_| VocabError::InvalidFrequency {
                    line: line_no,
                    value: raw.to_string(),
                })?,
                None => 0,
            };
            let alias = it.next().unwrap_or("");
            let label = it.next().unwrap_or("");
            let color = match it.next().filter(|x| !x.is_empty()) {
                Some(raw) => parse_color(raw).ok_or_else(|| VocabError::InvalidColor {
                    line: line_no,
                    value: raw.to_string(),
                })?,
                None => Rgb::default(),
            };
            entries.push(
                CandidateEntry::new(term, frequency)
                    .with_alias(alias)
                    .with_label(label)
                    .with_color(color),
            );
        }
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ranked_ids(&self, prefix: &str, max_size: usize) -> Vec<u32> {
        let Some(node) = self.trie.find(prefix) else {
            return Vec::new();
        };
        if max_size <= self.trie.depth() {
            return self.trie.ranked(node).iter().take(max_size).copied().collect();
        }
        let mut ids = Vec::new();
        self.trie.collect(node, &mut ids);
        ids.sort_by(|&a, &b| {
            rank(&self.entries[a as usize], &self.entries[b as usize]).then(a.cmp(&b))
        });
        ids.dedup();
        ids.truncate(max_size);
        ids
    }
}

impl Vocabulary for TrieVocabulary {
    fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry> {
        if prefix.is_empty() || max_size == 0 {
            return Vec::new();
        }
        self.ranked_ids(&prefix.to_lowercase(), max_size)
            .into_iter()
            .map(|id| self.entries[id as usize].clone())
            .collect()
    }
}

fn rank(a: &CandidateEntry, b: &CandidateEntry) -> std::cmp::Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| a.display_term.cmp(&b.display_term))
}

fn parse_color(raw: &str) -> Option<Rgb> {
    if let Some(hex) = raw.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    let mut parts = raw.split(',').map(|p| p.trim().parse::<u8>().ok());
    let color = Rgb(parts.next()??, parts.next()??, parts.next()??);
    if parts.next().is_some() {
        return None;
    }
    Some(color)
}
