//! `wrap`：逻辑文本 <-> 展示文本（定宽硬折行）之间的换算。
//!
//! 约定：
//! - 逻辑文本不含任何 `\n`；展示文本 = 逻辑文本每 `line_width` 个字符插入一个 `\n`
//! - 所有下标都是“字符下标”（Unicode code point），不是字节下标
//! - `wrap` 每帧都会被调用，所以按 `(逻辑文本, 列宽)` 做了缓存
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    sync::Arc,
};

use serde::Serialize;

use crate::model::PopupAnchor;

/// 本次 reflow 由哪种编辑触发。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// 插入（打字/粘贴/补全）
    Insert,
    /// 删除（退格/Delete）
    Delete,
}

/// reflow 结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflow {
    pub display: Arc<str>,
    /// 需要写回宿主的逻辑文本
    pub logical: String,
    pub cursor: usize,
}

/// 缓存命中统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WrapStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// 折行引擎（带缓存）。单个会话独占，不跨线程共享。
#[derive(Debug)]
pub struct WrapEngine {
    cache: RefCell<HashMap<usize, HashMap<String, Arc<str>>>>,
    capacity: usize,
    entries: Cell<usize>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl Default for WrapEngine {
    fn default() -> Self {
        Self::new(64)
    }
}

impl WrapEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
            capacity: capacity.max(1),
            entries: Cell::new(0),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// 把（可能带换行的）文本按 `line_width` 重新折行。
    ///
    /// 相同的 `(逻辑文本, 列宽)` 返回同一个 `Arc`，不会重新计算。
    pub fn wrap(&self, text: &str, line_width: usize) -> Arc<str> {
        let width = line_width.max(1);
        let logical = strip_newlines(text);

        if let Some(hit) = self
            .cache
            .borrow()
            .get(&width)
            .and_then(|by_text| by_text.get(logical.as_str()))
        {
            self.hits.set(self.hits.get() + 1);
            return Arc::clone(hit);
        }

        self.misses.set(self.misses.get() + 1);
        let wrapped: Arc<str> = Arc::from(wrap_uncached(&logical, width));

        let mut cache = self.cache.borrow_mut();
        if self.entries.get() >= self.capacity {
            tracing::trace!(entries = self.entries.get(), "wrap cache full, clearing");
            cache.clear();
            self.entries.set(0);
        }
        cache
            .entry(width)
            .or_default()
            .insert(logical, Arc::clone(&wrapped));
        self.entries.set(self.entries.get() + 1);
        wrapped
    }

    /// 编辑后重新折行，并把光标映射到新展示文本里的合法位置。
    ///
    /// - `cursor`：编辑后、折行前的光标（旧展示文本中的下标）
    /// - `kind`：插入时若光标恰好落在软换行边界，前移一格，越过新插入的 `\n`
    /// - `max_buffer_size`：光标的额外上限
    pub fn reflow(
        &self,
        buffer: &str,
        line_width: usize,
        cursor: usize,
        kind: EditKind,
        max_buffer_size: usize,
    ) -> Reflow {
        let width = line_width.max(1);
        let display = self.wrap(buffer, width);
        let logical = strip_newlines(buffer);

        let mut p = cursor;
        if kind == EditKind::Insert && p % (width + 1) == 0 {
            p += 1;
        }
        let upper = display.chars().count().min(max_buffer_size);
        Reflow {
            display,
            logical,
            cursor: p.min(upper),
        }
    }

    pub fn stats(&self) -> WrapStats {
        WrapStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.entries.get(),
        }
    }
}

/// 去掉所有 `\n`，得到逻辑文本。
pub fn strip_newlines(text: &str) -> String {
    text.chars().filter(|&c| c != '\n').collect()
}

fn wrap_uncached(logical: &str, width: usize) -> String {
    let chars: Vec<char> = logical.chars().collect();
    let mut out = String::with_capacity(logical.len() + chars.len() / width);
    for (i, chunk) in chars.chunks(width).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.extend(chunk);
    }
    out
}

/// 展示下标 -> 逻辑下标（数光标前的非换行字符）。
pub fn logical_offset(display: &str, cursor: usize) -> usize {
    display.chars().take(cursor).filter(|&c| c != '\n').count()
}

/// 逻辑下标 -> 展示下标。落在行边界时取下一行行首。
pub fn display_offset(logical: usize, line_width: usize) -> usize {
    logical + logical / line_width.max(1)
}

/// 逻辑文本长度为 `logical` 时折行后的展示长度。
pub fn display_len(logical: usize, line_width: usize) -> usize {
    if logical == 0 {
        return 0;
    }
    logical + (logical - 1) / line_width.max(1)
}

/// 展示长度不超过 `max_display` 时，最多能容纳的逻辑字符数。
pub fn logical_capacity(max_display: usize, line_width: usize) -> usize {
    let mut n = max_display - max_display / (line_width.max(1) + 1);
    while n > 0 && display_len(n, line_width) > max_display {
        n -= 1;
    }
    n
}

/// 由弹窗像素宽度换算列宽：`floor(popup / advance) - margin`，至少为 1。
pub fn line_width(popup_width: f32, advance: f32, margin: usize) -> usize {
    if !advance.is_finite() || advance <= 0.0 || !popup_width.is_finite() || popup_width <= 0.0 {
        return 1;
    }
    let columns = (popup_width / advance).floor() as usize;
    columns.saturating_sub(margin).max(1)
}

/// 光标在展示文本中的 (行, 列)。
pub fn cursor_position(display: &str, cursor: usize) -> (usize, usize) {
    let mut row = 0;
    let mut column = 0;
    for ch in display.chars().take(cursor) {
        if ch == '\n' {
            row += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (row, column)
}

/// 宿主提供的布局信息（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutMetrics {
    /// 单个字符的前进宽度
    pub advance: f32,
    pub line_height: f32,
    /// 编辑区左上角
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            advance: 10.0,
            line_height: 20.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

/// 候选弹窗锚点：光标所在行的正下方。
pub fn popup_anchor(display: &str, cursor: usize, metrics: &LayoutMetrics) -> PopupAnchor {
    let (row, column) = cursor_position(display, cursor);
    PopupAnchor {
        x: metrics.origin_x + column as f32 * metrics.advance,
        y: metrics.origin_y + (row + 1) as f32 * metrics.line_height,
    }
}
