//! `mlt_core`：多行提示词编辑器的纯逻辑层，不做任何文件 I/O，也不负责绘制。
//!
//! 设计目标：
//! - **核心可复用**：任何宿主（CLI/GUI/节点编辑器叠加层）都能复用同一套逻辑
//! - **分层清晰**：session -> processor -> context -> engine -> wrap/scanner/autocomplete -> 输出（`EditorSnapshot`）
//! - **永不阻塞输入**：所有自动补全错误都退化为“没有候选”
pub mod autocomplete;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod filter;
pub mod key_event;
pub mod model;
pub mod processor;
pub mod registry;
pub mod scanner;
pub mod session;
pub mod vocabulary;
pub mod wrap;
