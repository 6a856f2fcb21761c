use thiserror::Error;

/// 编辑器内部可恢复的错误。
///
/// 这些错误都不会传播到宿主：调用点捕获后记录日志，并保持原状态不变。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("候选下标越界：{index}（共 {len} 个候选）")]
    CandidateOutOfRange { index: usize, len: usize },
}

/// 配置解析/校验错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置 JSON 解析失败：{0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置项 `{field}` 必须大于 0")]
    NonPositive { field: &'static str },
}
