//! `processor`：输入事件处理链。
//!
//! 按顺序处理 `InputEvent`，对 `Context` 做状态变更，并可产生 `Action`（例如 Persist）。
//!
//! 当前链路（`Session::new` 默认组装）：
//! - `EditingProcessor`：编辑文本（Char/Paste/Backspace/Delete/Clear），每次都 reflow
//! - `CursorProcessor`：移动光标（Left/Right/Home/End），不改文本
//! - `SelectionProcessor`：候选高亮上下移动（SelectPrev/SelectNext）
//! - `CompletionProcessor`：接受候选（Accept）
//! - `LayoutProcessor`：布局变化（Resize），列宽变了才 reflow

use crate::{
    context::Context,
    engine::EngineFacade,
    key_event::{Action, InputEvent},
    wrap,
};

/// Processor 执行结果：是否“消费”了本次事件。
///
/// - `Consume`：本 processor 已处理该事件，后续 processor 不再执行
/// - `Continue`：本 processor 不处理该事件，交给下一个 processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Consume,
    Continue,
}

/// Processor：处理输入事件并改变 Context；必要时产生输出动作。
pub trait Processor: Send + Sync {
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>);
}

/// 编辑文本的 processor。
pub struct EditingProcessor;

impl Processor for EditingProcessor {
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        match input_event {
            InputEvent::Char(ch) => {
                let mut buf = [0u8; 4];
                let actions = context.insert(engine, ch.encode_utf8(&mut buf));
                (ProcessStatus::Consume, actions)
            }
            InputEvent::Paste(text) => (ProcessStatus::Consume, context.insert(engine, text)),
            InputEvent::Backspace => (ProcessStatus::Consume, context.backspace(engine)),
            InputEvent::Delete => (ProcessStatus::Consume, context.delete_forward(engine)),
            InputEvent::Clear => (ProcessStatus::Consume, context.clear(engine)),
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

pub struct CursorProcessor;

impl Processor for CursorProcessor {
    fn process(
        &mut self,
        _engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        match input_event {
            InputEvent::Left => context.move_left(),
            InputEvent::Right => context.move_right(),
            InputEvent::Home => context.move_home(),
            InputEvent::End => context.move_end(),
            _ => return (ProcessStatus::Continue, Vec::new()),
        }
        (ProcessStatus::Consume, Vec::new())
    }
}

pub struct SelectionProcessor;

impl Processor for SelectionProcessor {
    fn process(
        &mut self,
        _engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        match input_event {
            InputEvent::SelectPrev => context.shift_selection(-1),
            InputEvent::SelectNext => context.shift_selection(1),
            _ => return (ProcessStatus::Continue, Vec::new()),
        }
        (ProcessStatus::Consume, Vec::new())
    }
}

pub struct CompletionProcessor;

impl Processor for CompletionProcessor {
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        match input_event {
            InputEvent::Accept => (ProcessStatus::Consume, context.accept(engine)),
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

pub struct LayoutProcessor;

impl Processor for LayoutProcessor {
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        match *input_event {
            InputEvent::Resize {
                popup_width,
                advance,
                line_height,
            } => {
                if advance.is_finite() && advance > 0.0 {
                    context.metrics.advance = advance;
                }
                if line_height.is_finite() && line_height > 0.0 {
                    context.metrics.line_height = line_height;
                }
                let width = wrap::line_width(popup_width, advance, engine.config().line_margin);
                (ProcessStatus::Consume, context.set_line_width(engine, width))
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}
