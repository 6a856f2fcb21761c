//! `scanner`：从光标向前找“正在输入的词”的起点。
//!
//! 规则：
//! - ASCII 字母属于词
//! - `\n` 永远透明（跨软换行扫描，相当于在逻辑文本上扫描）
//! - `WordChars` 里的字符也属于词（默认是权重/别名里常见的 `0123456789x:_-/()`）
//! - 其它字符是边界

/// 默认允许穿过的非字母字符。
pub const DEFAULT_PASS_THROUGH: &str = "0123456789x:_-/()";

/// 可配置的“词内字符”集合（字母与换行之外的部分）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordChars {
    pass_through: Vec<char>,
}

impl Default for WordChars {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_THROUGH)
    }
}

impl WordChars {
    pub fn new(pass_through: &str) -> Self {
        let mut chars: Vec<char> = pass_through.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        Self {
            pass_through: chars,
        }
    }

    pub fn is_word_char(&self, ch: char) -> bool {
        ch == '\n' || ch.is_ascii_alphabetic() || self.pass_through.binary_search(&ch).is_ok()
    }

    /// 从 `end_pos - 1` 向前扫描，返回词的起点（字符下标）。
    ///
    /// `end_pos` 超出长度时按长度处理。扫到下标 0 即返回 0，
    /// 不再检查首字符本身（`" cat"` 的词起点是 0）。
    pub fn find_word_start(&self, buffer: &[char], end_pos: usize) -> usize {
        let end = end_pos.min(buffer.len());
        if end == 0 {
            return 0;
        }
        buffer[1..end]
            .iter()
            .rposition(|&ch| !self.is_word_char(ch))
            .map_or(0, |i| i + 2)
    }

    /// 字符串版本，便于宿主/测试直接调用。
    pub fn find_word_start_str(&self, buffer: &str, end_pos: usize) -> usize {
        let chars: Vec<char> = buffer.chars().collect();
        self.find_word_start(&chars, end_pos)
    }
}
