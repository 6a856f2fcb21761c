//! `Session`：对宿主（CLI/GUI）提供的编辑会话对象。
//!
//! `Session` 自身不做业务逻辑判断，而是：
//! - 持有 `Context`（状态）
//! - 持有 processors 链（可插拔）
//! - 把每次 `InputEvent` 依次交给 processors，直到被消费
//! - 最后输出 `EditorSnapshot` + `Action`

use crate::{
    context::Context,
    engine::Engine,
    key_event::{Action, InputEvent},
    model::EditorSnapshot,
    processor::{
        CompletionProcessor, CursorProcessor, EditingProcessor, LayoutProcessor, ProcessStatus,
        Processor, SelectionProcessor,
    },
    vocabulary::Vocabulary,
    wrap::LayoutMetrics,
};

/// 宿主节点上的一个可读写文本字段。
pub trait TextField {
    fn read(&self) -> String;
    fn write(&mut self, text: &str);
}

impl TextField for String {
    fn read(&self) -> String {
        self.clone()
    }

    fn write(&mut self, text: &str) {
        text.clone_into(self);
    }
}

/// 编辑会话（一个视图一个，状态不共享）。
pub struct Session<V> {
    /// 引擎（包含词表、折行缓存、取词规则）
    engine: Engine<V>,
    /// 会话上下文（processors 共享）
    ctx: Context,
    /// processors 链（可配置/可扩展）
    processors: Vec<Box<dyn Processor>>,
}

impl<V> Session<V>
where
    V: Vocabulary,
{
    /// 创建空会话，并组装默认 processors 链。
    pub fn new(engine: Engine<V>) -> Self {
        let line_width = engine.config().default_line_width;
        Self {
            engine,
            ctx: Context::new(line_width),
            processors: vec![
                Box::new(EditingProcessor),
                Box::new(CursorProcessor),
                Box::new(SelectionProcessor),
                Box::new(CompletionProcessor),
                Box::new(LayoutProcessor),
            ],
        }
    }

    /// 从宿主字段读入初始文本。
    pub fn open(engine: Engine<V>, field: &dyn TextField) -> Self {
        let mut session = Self::new(engine);
        let text = field.read();
        session.ctx.load(&session.engine, &text);
        session
    }

    /// 在链尾追加一个 processor。
    pub fn with_processor(mut self, processor: Box<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.ctx.metrics.origin_x = x;
        self.ctx.metrics.origin_y = y;
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.ctx.metrics
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn engine(&self) -> &Engine<V> {
        &self.engine
    }

    pub fn logical_text(&self) -> String {
        self.ctx.logical()
    }

    /// 获取当前快照（只读，不夹取高亮下标）。
    pub fn ui_state(&self) -> EditorSnapshot {
        self.ctx.ui_state(&self.engine)
    }

    /// 每帧调用：重新查词并夹取高亮下标。
    pub fn tick(&mut self) -> EditorSnapshot {
        self.ctx.refresh(&self.engine)
    }

    /// 处理一个输入事件，返回最新快照与动作列表。
    pub fn handle(&mut self, ev: InputEvent) -> (EditorSnapshot, Vec<Action>) {
        let mut actions = Vec::new();
        for p in &mut self.processors {
            let (status, mut a) = p.process(&self.engine, &mut self.ctx, &ev);
            actions.append(&mut a);
            if status == ProcessStatus::Consume {
                break;
            }
        }
        (self.ctx.refresh(&self.engine), actions)
    }
}

/// 把动作应用到宿主字段（目前只有 Persist）。
pub fn persist(actions: &[Action], field: &mut dyn TextField) {
    for action in actions {
        let Action::Persist(text) = action;
        field.write(text);
    }
}
