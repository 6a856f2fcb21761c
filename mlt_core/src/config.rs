//! `config`：编辑器可调参数。
//!
//! core 不读文件：宿主负责拿到 JSON 字符串，这里只做解析、校验与环境变量覆盖。
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scanner::DEFAULT_PASS_THROUGH;

/// 编辑器配置（所有字段都有默认值，JSON 里可以只写一部分）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 候选数量上限
    pub max_candidates: usize,
    /// 由像素宽度换算列宽时扣掉的列数
    pub line_margin: usize,
    /// 缓冲区最大字符数（光标上限）
    pub max_buffer_size: usize,
    /// 尚未收到布局信息前使用的列宽
    pub default_line_width: usize,
    /// 折行缓存最多保留多少条
    pub wrap_cache_capacity: usize,
    /// 向后扫描单词时允许穿过的非字母字符
    pub word_chars: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_candidates: 20,
            line_margin: 3,
            max_buffer_size: 16 * 1024,
            default_line_width: 40,
            wrap_cache_capacity: 64,
            word_chars: DEFAULT_PASS_THROUGH.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<EditorConfig>(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("max_candidates", self.max_candidates),
            ("max_buffer_size", self.max_buffer_size),
            ("wrap_cache_capacity", self.wrap_cache_capacity),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        Ok(())
    }

    /// 用环境变量覆盖配置；无法解析的值直接忽略。
    ///
    /// `lookup` 一般传 `|k| std::env::var(k).ok()`，测试里可以换成 map。
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        if let Some(v) = parse("MLT_MAX_CANDIDATES").filter(|v| *v > 0) {
            self.max_candidates = v;
        }
        if let Some(v) = parse("MLT_LINE_MARGIN") {
            self.line_margin = v;
        }
        if let Some(v) = parse("MLT_MAX_BUFFER_SIZE").filter(|v| *v > 0) {
            self.max_buffer_size = v;
        }
        if let Some(v) = lookup("MLT_WORD_CHARS") {
            self.word_chars = v;
        }
        self
    }
}
