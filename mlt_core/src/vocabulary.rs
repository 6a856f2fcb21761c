use std::sync::{Arc, RwLock};

use crate::model::CandidateEntry;

/// 词表抽象：core 不关心词表来自文件/内存/网络，也不关心排序细节。
///
/// 约定：
/// - `search` 返回按词表自身相关度排好序的候选
/// - 返回数量“应当”不超过 `max_size`；core 仍会再截断一次
/// - 未加载时 `is_loaded` 返回 false，`search` 返回空
pub trait Vocabulary: Send + Sync {
    fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry>;

    fn is_loaded(&self) -> bool {
        true
    }
}

impl<T> Vocabulary for Arc<T>
where
    T: Vocabulary + ?Sized,
{
    fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry> {
        (**self).search(prefix, max_size)
    }

    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }
}

/// 共享词表槽：宿主在后台加载完成后再 `install`。
///
/// 多个会话可以持有同一个槽的克隆（只读共享），在词表就绪前一律“无候选”。
#[derive(Clone, Default)]
pub struct VocabularySlot {
    inner: Arc<RwLock<Option<Arc<dyn Vocabulary>>>>,
}

impl std::fmt::Debug for VocabularySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocabularySlot")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl VocabularySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, vocabulary: Arc<dyn Vocabulary>) {
        match self.inner.write() {
            Ok(mut slot) => *slot = Some(vocabulary),
            Err(poisoned) => {
                tracing::warn!("vocabulary slot was poisoned; replacing contents");
                *poisoned.into_inner() = Some(vocabulary);
            }
        }
    }

    /// 卸载词表（例如重新加载文件前）。
    pub fn unload(&self) {
        match self.inner.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => {
                tracing::warn!("vocabulary slot was poisoned; clearing contents");
                *poisoned.into_inner() = None;
            }
        }
    }

    pub fn get(&self) -> Option<Arc<dyn Vocabulary>> {
        match self.inner.read() {
            Ok(slot) => slot.clone(),
            Err(_) => {
                tracing::warn!("vocabulary slot is poisoned; treating as not loaded");
                None
            }
        }
    }
}

impl Vocabulary for VocabularySlot {
    fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry> {
        self.get()
            .map(|vocabulary| vocabulary.search(prefix, max_size))
            .unwrap_or_default()
    }

    fn is_loaded(&self) -> bool {
        self.get().is_some_and(|vocabulary| vocabulary.is_loaded())
    }
}
