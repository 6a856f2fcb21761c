use crate::autocomplete::{self, AutocompleteEngine};
use crate::config::EditorConfig;
use crate::model::{CandidateEntry, CandidateView, EditorSnapshot};
use crate::scanner::WordChars;
use crate::vocabulary::Vocabulary;
use crate::wrap::{self, EditKind, LayoutMetrics, Reflow, WrapEngine};

/// 生成快照所需的会话状态（只读借用）。
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub display: &'a str,
    pub cursor: usize,
    /// 未夹取的高亮下标
    pub selection: isize,
    pub line_width: usize,
    pub metrics: &'a LayoutMetrics,
}

/// 引擎：折行 + 取词/查词 + 快照组装。
///
/// 结构上对应：
/// - engine（编排） -> wrap（折行/光标映射） -> scanner（取词） -> vocabulary（查词） -> filter（截断） -> 输出 EditorSnapshot
pub struct Engine<V> {
    /// 词表（可以是 `VocabularySlot`，加载前返回空）
    vocabulary: V,
    wrap: WrapEngine,
    autocomplete: AutocompleteEngine,
    config: EditorConfig,
}

impl<V> Engine<V>
where
    V: Vocabulary,
{
    pub fn new(vocabulary: V) -> Self {
        Self::with_config(vocabulary, EditorConfig::default())
    }

    pub fn with_config(vocabulary: V, config: EditorConfig) -> Self {
        Self {
            vocabulary,
            wrap: WrapEngine::new(config.wrap_cache_capacity),
            autocomplete: AutocompleteEngine::new(
                WordChars::new(&config.word_chars),
                config.max_candidates.max(1),
            ),
            config,
        }
    }

    /// 设置候选数量上限；0 会回退到 1。
    pub fn max_candidates(mut self, limit: usize) -> Self {
        self.config.max_candidates = limit.max(1);
        self.autocomplete = AutocompleteEngine::new(
            self.autocomplete.word_chars().clone(),
            self.config.max_candidates,
        );
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &V {
        &self.vocabulary
    }

    pub fn wrap_engine(&self) -> &WrapEngine {
        &self.wrap
    }

    pub fn compose(&self, frame: FrameInput<'_>) -> EditorSnapshot {
        let cursor = frame.cursor.min(frame.display.chars().count());
        let word = self.autocomplete.current_word(frame.display, cursor);
        let candidates = self.autocomplete.candidates(&self.vocabulary, &word);
        let (selection, _) = autocomplete::select(&candidates, frame.selection);
        let (row, column) = wrap::cursor_position(frame.display, cursor);

        let candidates = candidates
            .into_iter()
            .enumerate()
            .map(|(i, entry)| CandidateView {
                text: entry.completion_text().to_owned(),
                frequency_label: autocomplete::display_label(&entry),
                selected: i == selection,
                entry,
            })
            .collect();

        EditorSnapshot {
            display: frame.display.to_owned(),
            logical: wrap::strip_newlines(frame.display),
            cursor,
            line_width: frame.line_width,
            row,
            column,
            word,
            candidates,
            selection,
            anchor: wrap::popup_anchor(frame.display, cursor, frame.metrics),
        }
    }
}

/// 给 context/processors 的对象安全引擎接口（避免在 processors 层引入泛型）。
pub trait EngineFacade {
    fn config(&self) -> &EditorConfig;
    fn autocomplete(&self) -> &AutocompleteEngine;
    /// 折行并映射光标（光标上限取 `max_buffer_size`）
    fn reflow(&self, buffer: &str, line_width: usize, cursor: usize, kind: EditKind) -> Reflow;
    /// 当前词的候选（已截断）
    fn candidates(&self, word: &str) -> Vec<CandidateEntry>;
    fn compose(&self, frame: FrameInput<'_>) -> EditorSnapshot;
}

impl<V> EngineFacade for Engine<V>
where
    V: Vocabulary,
{
    fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn autocomplete(&self) -> &AutocompleteEngine {
        &self.autocomplete
    }

    fn reflow(&self, buffer: &str, line_width: usize, cursor: usize, kind: EditKind) -> Reflow {
        self.wrap
            .reflow(buffer, line_width, cursor, kind, self.config.max_buffer_size)
    }

    fn candidates(&self, word: &str) -> Vec<CandidateEntry> {
        self.autocomplete.candidates(&self.vocabulary, word)
    }

    fn compose(&self, frame: FrameInput<'_>) -> EditorSnapshot {
        Engine::<V>::compose(self, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, FrameInput};
    use crate::{
        config::EditorConfig, model::CandidateEntry, vocabulary::Vocabulary,
        vocabulary::VocabularySlot, wrap::LayoutMetrics,
    };

    struct Tags;

    impl Vocabulary for Tags {
        fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry> {
            [
                CandidateEntry::new("long_hair", 750_000).with_label("长发"),
                CandidateEntry::new("looking_at_viewer", 2_500),
                CandidateEntry::new("lowres", 50),
            ]
            .into_iter()
            .filter(|e| e.display_term.starts_with(prefix))
            .take(max_size)
            .collect()
        }
    }

    fn frame<'a>(display: &'a str, cursor: usize, selection: isize, metrics: &'a LayoutMetrics) -> FrameInput<'a> {
        FrameInput {
            display,
            cursor,
            selection,
            line_width: 10,
            metrics,
        }
    }

    #[test]
    fn snapshot_lists_labelled_candidates() {
        let engine = Engine::new(Tags);
        let metrics = LayoutMetrics::default();
        let snapshot = engine.compose(frame("1girl, lo", 9, 7, &metrics));
        assert_eq!(snapshot.word, "lo");
        assert_eq!(snapshot.candidates.len(), 3);
        assert_eq!(snapshot.selection, 2);
        assert!(snapshot.candidates[2].selected);
        assert_eq!(snapshot.candidates[0].text, "长发");
        assert_eq!(snapshot.candidates[0].frequency_label, "0.75M");
        assert_eq!(snapshot.candidates[1].frequency_label, "2.50K");
        assert_eq!(snapshot.selected().map(|c| c.text.as_str()), Some("lowres"));
    }

    #[test]
    fn max_candidates_bounds_snapshot() {
        let engine = Engine::new(Tags).max_candidates(1);
        let metrics = LayoutMetrics::default();
        let snapshot = engine.compose(frame("lo", 2, 0, &metrics));
        assert_eq!(snapshot.candidates.len(), 1);
    }

    #[test]
    fn unloaded_slot_yields_no_candidates() {
        let engine = Engine::with_config(VocabularySlot::new(), EditorConfig::default());
        let metrics = LayoutMetrics::default();
        let snapshot = engine.compose(frame("lo", 2, 3, &metrics));
        assert!(snapshot.candidates.is_empty());
        assert_eq!(snapshot.selection, 0);
        assert!(snapshot.selected().is_none());
    }
}
