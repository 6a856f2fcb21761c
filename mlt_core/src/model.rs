use serde::{Deserialize, Serialize};

/// RGB 颜色（候选词在弹窗中的文字颜色，0-255）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Default for Rgb {
    fn default() -> Self {
        Rgb(255, 255, 255)
    }
}

/// 候选词（词表中的一项，加载后不可变）。
///
/// 注意：`alias_code` / `localized_label` 都是可选信息，空串表示缺省；
/// 缺省时一律回退到 `display_term`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// 词频（越大越常用），只用于展示与词表内部排序
    pub frequency: u64,
    /// 规范词条
    pub display_term: String,
    /// 别名（词表可用它做额外的前缀索引）
    pub alias_code: String,
    /// 本地化标签；非空时作为上屏文本
    pub localized_label: String,
    /// 展示颜色
    pub color: Rgb,
}

impl CandidateEntry {
    pub fn new(display_term: impl Into<String>, frequency: u64) -> Self {
        Self {
            frequency,
            display_term: display_term.into(),
            alias_code: String::new(),
            localized_label: String::new(),
            color: Rgb::default(),
        }
    }

    pub fn with_alias(mut self, alias_code: impl Into<String>) -> Self {
        self.alias_code = alias_code.into();
        self
    }

    pub fn with_label(mut self, localized_label: impl Into<String>) -> Self {
        self.localized_label = localized_label.into();
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// 接受该候选时写入缓冲区的文本：优先本地化标签，否则规范词条。
    pub fn completion_text(&self) -> &str {
        if self.localized_label.is_empty() {
            &self.display_term
        } else {
            &self.localized_label
        }
    }
}

/// 弹窗中一行候选的只读视图。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateView {
    pub entry: CandidateEntry,
    /// 右侧说明文本（label 或 term）
    pub text: String,
    /// 词频标签（例如 `2.50K`）
    pub frequency_label: String,
    pub selected: bool,
}

/// 弹窗锚点（像素坐标，相对编辑区原点）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PopupAnchor {
    pub x: f32,
    pub y: f32,
}

/// 引擎给宿主的“每帧快照”。
///
/// 设计目标：
/// - 宿主只读 `EditorSnapshot`，不直接读写 `Context`
/// - 宿主负责全部绘制；这里只有数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSnapshot {
    /// 展示用缓冲区（含软换行）
    pub display: String,
    /// 逻辑文本（不含任何换行）
    pub logical: String,
    /// 光标（display 中的字符下标）
    pub cursor: usize,
    pub line_width: usize,
    /// 光标所在行/列（按 display 计算）
    pub row: usize,
    pub column: usize,
    /// 光标前正在输入的词；空串表示不提示
    pub word: String,
    pub candidates: Vec<CandidateView>,
    /// 已夹取的高亮下标
    pub selection: usize,
    pub anchor: PopupAnchor,
}

impl EditorSnapshot {
    /// 当前高亮的候选。
    pub fn selected(&self) -> Option<&CandidateView> {
        self.candidates.get(self.selection)
    }
}
