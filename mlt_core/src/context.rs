//! `Context`：processor 链共享的唯一状态容器。
//!
//! 约定：
//! - `display`：展示文本（逻辑文本 + 软换行），每次编辑后都经过 reflow
//! - `cursor`：`display` 中的字符下标
//! - `selection`：候选高亮下标，导航时不夹取，每帧 `refresh` 时夹取并写回
//! - 每次 reflow 都产生一个 `Action::Persist`，由宿主写回节点文本
use crate::{
    autocomplete,
    engine::{EngineFacade, FrameInput},
    key_event::Action,
    model::EditorSnapshot,
    wrap::{self, EditKind, LayoutMetrics},
};

/// 编辑会话上下文：processor 链共享的唯一状态。
#[derive(Debug, Clone)]
pub struct Context {
    pub display: String,
    pub cursor: usize,
    pub selection: isize,
    pub line_width: usize,
    pub metrics: LayoutMetrics,
}

impl Context {
    pub fn new(line_width: usize) -> Self {
        Self {
            display: String::new(),
            cursor: 0,
            selection: 0,
            line_width: line_width.max(1),
            metrics: LayoutMetrics::default(),
        }
    }

    /// 载入宿主文本，光标放到末尾；超出容量的部分被截掉。
    pub fn load(&mut self, engine: &dyn EngineFacade, text: &str) {
        let capacity = self.capacity(engine);
        let mut logical = wrap::strip_newlines(text);
        if let Some((cut, _)) = logical.char_indices().nth(capacity) {
            tracing::debug!(capacity, "host text truncated to buffer capacity");
            logical.truncate(cut);
        }
        let out = engine.reflow(&logical, self.line_width, usize::MAX, EditKind::Delete);
        self.display = out.display.to_string();
        self.cursor = out.cursor;
        self.selection = 0;
    }

    pub fn logical(&self) -> String {
        wrap::strip_newlines(&self.display)
    }

    fn char_len(&self) -> usize {
        self.display.chars().count()
    }

    /// 当前列宽下，展示长度不超过 `max_buffer_size` 时可容纳的逻辑字符数。
    fn capacity(&self, engine: &dyn EngineFacade) -> usize {
        wrap::logical_capacity(engine.config().max_buffer_size, self.line_width)
    }

    fn logical_len(&self) -> usize {
        self.display.chars().filter(|&c| c != '\n').count()
    }

    /// 按规则 reflow 并写回状态。
    pub fn reflow(
        &mut self,
        engine: &dyn EngineFacade,
        buffer: &str,
        cursor: usize,
        kind: EditKind,
    ) -> Vec<Action> {
        let out = engine.reflow(buffer, self.line_width, cursor, kind);
        self.display = out.display.to_string();
        self.cursor = out.cursor;
        vec![Action::Persist(out.logical)]
    }

    /// reflow 后按逻辑位置放光标（多字符插入、补全、改列宽时使用）。
    fn reflow_to_logical(
        &mut self,
        engine: &dyn EngineFacade,
        buffer: &str,
        logical_cursor: usize,
    ) -> Vec<Action> {
        let out = engine.reflow(buffer, self.line_width, 0, EditKind::Delete);
        let upper = out
            .display
            .chars()
            .count()
            .min(engine.config().max_buffer_size);
        self.display = out.display.to_string();
        self.cursor = wrap::display_offset(logical_cursor, self.line_width).min(upper);
        vec![Action::Persist(out.logical)]
    }

    /// 在光标处插入文本；控制字符（包括换行）被丢弃。
    ///
    /// 缓冲区满时只插入放得下的前缀，完全放不下则不做任何修改。
    pub fn insert(&mut self, engine: &dyn EngineFacade, text: &str) -> Vec<Action> {
        let room = self.capacity(engine).saturating_sub(self.logical_len());
        let inserted: Vec<char> = text
            .chars()
            .filter(|c| !c.is_control())
            .take(room)
            .collect();
        if inserted.is_empty() {
            if room == 0 && !text.is_empty() {
                tracing::debug!("buffer full, insert dropped");
            }
            return Vec::new();
        }
        let mut chars: Vec<char> = self.display.chars().collect();
        let at = self.cursor.min(chars.len());
        let count = inserted.len();
        chars.splice(at..at, inserted);
        let buffer: String = chars.into_iter().collect();

        if count == 1 {
            self.reflow(engine, &buffer, at + 1, EditKind::Insert)
        } else {
            let logical_cursor = wrap::logical_offset(&buffer, at + count);
            self.reflow_to_logical(engine, &buffer, logical_cursor)
        }
    }

    /// 删除光标前一个字符（可能是软换行，reflow 后会重新出现）。
    pub fn backspace(&mut self, engine: &dyn EngineFacade) -> Vec<Action> {
        let mut chars: Vec<char> = self.display.chars().collect();
        let at = self.cursor.min(chars.len());
        if at == 0 {
            return Vec::new();
        }
        chars.remove(at - 1);
        let buffer: String = chars.into_iter().collect();
        self.reflow(engine, &buffer, at - 1, EditKind::Delete)
    }

    /// 删除光标后的第一个字符；软换行会被跳过，删掉的是下一行行首。
    pub fn delete_forward(&mut self, engine: &dyn EngineFacade) -> Vec<Action> {
        let mut chars: Vec<char> = self.display.chars().collect();
        let at = self.cursor.min(chars.len());
        let Some(target) = chars[at..].iter().position(|&c| c != '\n') else {
            return Vec::new();
        };
        chars.remove(at + target);
        let buffer: String = chars.into_iter().collect();
        self.reflow(engine, &buffer, at, EditKind::Delete)
    }

    pub fn clear(&mut self, engine: &dyn EngineFacade) -> Vec<Action> {
        self.selection = 0;
        self.reflow(engine, "", 0, EditKind::Delete)
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.min(self.char_len()).saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    /// 移到当前行行首。
    pub fn move_home(&mut self) {
        let chars: Vec<char> = self.display.chars().collect();
        let at = self.cursor.min(chars.len());
        self.cursor = chars[..at]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);
    }

    /// 移到当前行行尾。
    pub fn move_end(&mut self) {
        let chars: Vec<char> = self.display.chars().collect();
        let at = self.cursor.min(chars.len());
        self.cursor = chars[at..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(chars.len(), |i| at + i);
    }

    /// 高亮下标 ±1，不夹取（每帧 `refresh` 时再夹取）。
    pub fn shift_selection(&mut self, delta: isize) {
        self.selection = self.selection.saturating_add(delta);
    }

    /// 列宽变化时整体 reflow；光标保持在同一个逻辑位置。
    pub fn set_line_width(&mut self, engine: &dyn EngineFacade, line_width: usize) -> Vec<Action> {
        let line_width = line_width.max(1);
        if line_width == self.line_width {
            return Vec::new();
        }
        let logical_cursor = wrap::logical_offset(&self.display, self.cursor);
        self.line_width = line_width;
        let buffer = self.display.clone();
        self.reflow_to_logical(engine, &buffer, logical_cursor)
    }

    /// 每帧调用：重新取词查词，夹取高亮下标并写回。
    pub fn refresh(&mut self, engine: &dyn EngineFacade) -> EditorSnapshot {
        let snapshot = self.ui_state(engine);
        self.selection = snapshot.selection as isize;
        snapshot
    }

    /// 生成宿主只读快照（不修改状态）。
    pub fn ui_state(&self, engine: &dyn EngineFacade) -> EditorSnapshot {
        engine.compose(FrameInput {
            display: &self.display,
            cursor: self.cursor,
            selection: self.selection,
            line_width: self.line_width,
            metrics: &self.metrics,
        })
    }

    /// 接受当前高亮候选：替换光标前的词并 reflow。
    ///
    /// 候选按当前词重新查询；下标失效时只记录日志，状态不变。
    pub fn accept(&mut self, engine: &dyn EngineFacade) -> Vec<Action> {
        let completion = engine.autocomplete();
        let word = completion.current_word(&self.display, self.cursor);
        if word.is_empty() {
            return Vec::new();
        }
        let candidates = engine.candidates(&word);
        let index = usize::try_from(self.selection).unwrap_or(0);
        let term = match autocomplete::resolve(&candidates, index) {
            Ok(entry) => entry.completion_text().to_owned(),
            Err(err) => {
                tracing::debug!(%err, word = %word, "completion skipped");
                return Vec::new();
            }
        };

        let (buffer, cursor) = completion.apply(&self.display, self.cursor, &term, self.line_width);
        let capacity = self.capacity(engine);
        let logical_len = buffer.chars().filter(|&c| c != '\n').count();
        if logical_len > capacity {
            tracing::debug!(capacity, term = %term, "completion skipped: buffer full");
            return Vec::new();
        }
        let logical_cursor = wrap::logical_offset(&buffer, cursor);
        self.selection = 0;
        self.reflow_to_logical(engine, &buffer, logical_cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::Context;
    use crate::{
        config::EditorConfig, engine::Engine, key_event::Action, model::CandidateEntry,
        vocabulary::Vocabulary,
    };

    struct Tags;

    impl Vocabulary for Tags {
        fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry> {
            ["caterpillar", "cat_ears", "castle"]
                .into_iter()
                .enumerate()
                .map(|(i, term)| CandidateEntry::new(term, 100 - i as u64))
                .filter(|e| e.display_term.starts_with(prefix))
                .take(max_size)
                .collect()
        }
    }

    fn capped(max_buffer_size: usize) -> Engine<Tags> {
        Engine::with_config(
            Tags,
            EditorConfig {
                max_buffer_size,
                ..EditorConfig::default()
            },
        )
    }

    fn typed(engine: &Engine<Tags>, width: usize, text: &str) -> Context {
        let mut ctx = Context::new(width);
        for ch in text.chars() {
            ctx.insert(engine, &ch.to_string());
        }
        ctx
    }

    #[test]
    fn typing_wraps_and_keeps_cursor_at_end() {
        let engine = Engine::new(Tags);
        let ctx = typed(&engine, 3, "abcdefg");
        assert_eq!(ctx.display, "abc\ndef\ng");
        assert_eq!(ctx.cursor, 9);
        assert_eq!(ctx.logical(), "abcdefg");
    }

    #[test]
    fn insert_reports_logical_text_for_persistence() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "abc");
        let actions = ctx.insert(&engine, "d");
        assert_eq!(actions, vec![Action::Persist("abcd".to_string())]);
    }

    #[test]
    fn newlines_and_control_chars_are_ignored() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "ab");
        assert!(ctx.insert(&engine, "\n").is_empty());
        assert_eq!(ctx.display, "ab");
    }

    #[test]
    fn paste_places_cursor_after_pasted_text() {
        let engine = Engine::new(Tags);
        let mut ctx = Context::new(3);
        ctx.insert(&engine, "abcdef");
        assert_eq!(ctx.display, "abc\ndef");
        assert_eq!(ctx.cursor, 7);

        ctx.move_home();
        ctx.insert(&engine, "xy");
        assert_eq!(ctx.display, "abc\nxyd\nef");
        assert_eq!(ctx.cursor, 6);
    }

    #[test]
    fn backspace_across_soft_break() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "abcd");
        ctx.move_left();
        assert_eq!(ctx.cursor, 4);
        // deletes the soft break, which reflow puts back; cursor parks before it
        ctx.backspace(&engine);
        assert_eq!(ctx.display, "abc\nd");
        assert_eq!(ctx.cursor, 3);
        ctx.backspace(&engine);
        assert_eq!(ctx.display, "abd");
        assert_eq!(ctx.cursor, 2);
    }

    #[test]
    fn backspace_and_delete_at_edges_are_noops() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "ab");
        assert!(ctx.delete_forward(&engine).is_empty());
        ctx.move_home();
        assert!(ctx.backspace(&engine).is_empty());
        ctx.delete_forward(&engine);
        assert_eq!(ctx.display, "b");
        assert_eq!(ctx.cursor, 0);
    }

    #[test]
    fn delete_before_soft_break_removes_next_row_head() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "abcdef");
        ctx.cursor = 3;
        let actions = ctx.delete_forward(&engine);
        assert_eq!(ctx.display, "abc\nef");
        assert_eq!(ctx.cursor, 3);
        assert_eq!(actions, vec![Action::Persist("abcef".to_string())]);
    }

    #[test]
    fn typing_stops_at_buffer_capacity() {
        let engine = capped(5);
        let mut ctx = Context::new(40);
        for ch in "abcde".chars() {
            ctx.insert(&engine, &ch.to_string());
        }
        assert!(ctx.insert(&engine, "f").is_empty());
        assert!(ctx.insert(&engine, "g").is_empty());
        assert_eq!(ctx.logical(), "abcde");
        assert_eq!(ctx.cursor, 5);
    }

    #[test]
    fn capacity_counts_soft_breaks() {
        let engine = capped(7);
        let ctx = typed(&engine, 3, "abcdefgh");
        assert_eq!(ctx.display, "abc\ndef");
        assert_eq!(ctx.cursor, 7);
    }

    #[test]
    fn paste_and_load_are_truncated_to_capacity() {
        let engine = capped(5);
        let mut ctx = typed(&engine, 40, "ab");
        ctx.insert(&engine, "cdefg");
        assert_eq!(ctx.display, "abcde");
        assert_eq!(ctx.cursor, 5);

        let mut ctx = Context::new(40);
        ctx.load(&engine, "abcdefgh");
        assert_eq!(ctx.display, "abcde");
        assert_eq!(ctx.cursor, 5);
    }

    #[test]
    fn accept_that_overflows_capacity_is_skipped() {
        let engine = capped(8);
        let mut ctx = typed(&engine, 40, "ab ca");
        assert!(ctx.accept(&engine).is_empty());
        assert_eq!(ctx.display, "ab ca");
        assert_eq!(ctx.cursor, 5);
    }

    #[test]
    fn home_and_end_are_row_relative() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "abcdefg");
        ctx.cursor = 5;
        ctx.move_home();
        assert_eq!(ctx.cursor, 4);
        ctx.move_end();
        assert_eq!(ctx.cursor, 7);
    }

    #[test]
    fn resizing_keeps_logical_cursor() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 3, "abcdefg");
        ctx.cursor = 6; // after 'e'
        let actions = ctx.set_line_width(&engine, 4);
        assert_eq!(ctx.display, "abcd\nefg");
        assert_eq!(ctx.cursor, 6);
        assert_eq!(actions.len(), 1);
        assert!(ctx.set_line_width(&engine, 4).is_empty());
    }

    #[test]
    fn refresh_clamps_selection() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 20, "ca");
        ctx.shift_selection(5);
        let snapshot = ctx.refresh(&engine);
        assert_eq!(snapshot.selection, 2);
        assert_eq!(ctx.selection, 2);
        ctx.shift_selection(-9);
        ctx.refresh(&engine);
        assert_eq!(ctx.selection, 0);
    }

    #[test]
    fn accept_replaces_word_and_moves_cursor() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 80, "cat dog");
        ctx.cursor = 3;
        ctx.refresh(&engine);
        let actions = ctx.accept(&engine);
        assert_eq!(ctx.display, "caterpillar dog");
        assert_eq!(ctx.cursor, 11);
        assert_eq!(actions, vec![Action::Persist("caterpillar dog".to_string())]);
    }

    #[test]
    fn accept_across_wrap_boundary() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 5, "ab ca");
        ctx.shift_selection(2);
        ctx.refresh(&engine);
        ctx.accept(&engine);
        assert_eq!(ctx.display, "ab ca\nstle");
        assert_eq!(ctx.cursor, 10);
    }

    #[test]
    fn accept_with_stale_selection_leaves_state_unchanged() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 20, "cas");
        ctx.shift_selection(2);
        let before = ctx.display.clone();
        assert!(ctx.accept(&engine).is_empty());
        assert_eq!(ctx.display, before);
        assert_eq!(ctx.cursor, 3);
    }

    #[test]
    fn accept_without_word_is_noop() {
        let engine = Engine::new(Tags);
        let mut ctx = typed(&engine, 20, "cat, ");
        assert!(ctx.accept(&engine).is_empty());
    }
}
