/// 输入事件（逻辑事件）。
///
/// 说明：
/// - `Session`/processor 只关心“语义事件”，不关心具体平台键值或鼠标滚轮方向。
/// - 宿主负责把系统按键/滚轮转换成这些事件，并在布局变化时发送 `Resize`。
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// 在光标处输入一个字符（控制字符会被忽略）
    Char(char),
    /// 粘贴一段文本（换行会被去掉）
    Paste(String),
    /// 删除光标前一个字符
    Backspace,
    /// 删除光标处的字符
    Delete,
    Left,
    Right,
    /// 当前行行首
    Home,
    /// 当前行行尾
    End,
    /// 高亮上一个候选（不循环）
    SelectPrev,
    /// 高亮下一个候选（不循环）
    SelectNext,
    /// 接受当前高亮的候选（通常是 Tab）
    Accept,
    /// 布局变化：弹窗像素宽度、字符前进宽度、行高
    Resize {
        popup_width: f32,
        advance: f32,
        line_height: f32,
    },
    /// 清空文本
    Clear,
}

/// 会话输出动作（对宿主的“副作用”请求）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 把逻辑文本写回宿主节点
    Persist(String),
}
