//! `registry`：由宿主外壳持有的会话注册表。
//!
//! 约定：
//! - 每个视图区域（`RegionId`）最多一个编辑会话，显式 `create`/`destroy`
//! - 重新加载文件时调用 `clear`
//! - 叠加层消费者通过 `attach` 登记，视图销毁前必须调用 `OverlayHandle::detach`
//! - 不做任何“自动失效”探测：谁登记谁注销
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    engine::Engine,
    session::{Session, TextField},
    vocabulary::Vocabulary,
};

/// 视图区域的稳定标识（由宿主分配）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub u64);

/// 叠加层消费者的登记凭据。
///
/// 不实现 `Clone`：一次登记只能注销一次。
#[derive(Debug, PartialEq, Eq)]
#[must_use = "overlay consumers must call `detach` at view teardown"]
pub struct OverlayHandle {
    region: RegionId,
    id: u64,
}

impl OverlayHandle {
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// 注销。返回 false 表示该区域已被销毁（登记早已随之清除）。
    pub fn detach<V: Vocabulary>(self, registry: &mut SessionRegistry<V>) -> bool {
        registry.release(self.region, self.id)
    }
}

struct RegionEntry<V> {
    session: Session<V>,
    consumers: BTreeSet<u64>,
}

/// 会话注册表。
pub struct SessionRegistry<V> {
    regions: BTreeMap<RegionId, RegionEntry<V>>,
    next_consumer: u64,
}

impl<V> Default for SessionRegistry<V> {
    fn default() -> Self {
        Self {
            regions: BTreeMap::new(),
            next_consumer: 0,
        }
    }
}

impl<V> SessionRegistry<V>
where
    V: Vocabulary,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 为区域创建会话；已存在时保留原会话并返回它。
    pub fn create(
        &mut self,
        region: RegionId,
        engine: Engine<V>,
        field: &dyn TextField,
    ) -> &mut Session<V> {
        let entry = self.regions.entry(region).or_insert_with(|| {
            tracing::debug!(region = region.0, "editor session created");
            RegionEntry {
                session: Session::open(engine, field),
                consumers: BTreeSet::new(),
            }
        });
        &mut entry.session
    }

    pub fn contains(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    pub fn get(&self, region: RegionId) -> Option<&Session<V>> {
        self.regions.get(&region).map(|e| &e.session)
    }

    pub fn get_mut(&mut self, region: RegionId) -> Option<&mut Session<V>> {
        self.regions.get_mut(&region).map(|e| &mut e.session)
    }

    /// 销毁区域会话（视图关闭时）。该区域的消费者登记一并清除。
    pub fn destroy(&mut self, region: RegionId) -> Option<Session<V>> {
        let entry = self.regions.remove(&region)?;
        if !entry.consumers.is_empty() {
            tracing::warn!(
                region = region.0,
                consumers = entry.consumers.len(),
                "region destroyed with attached overlay consumers"
            );
        }
        Some(entry.session)
    }

    /// 清空全部会话（例如重新加载文件）。
    pub fn clear(&mut self) {
        tracing::debug!(regions = self.regions.len(), "session registry cleared");
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.keys().copied()
    }

    /// 为已存在的区域登记一个叠加层消费者。
    pub fn attach(&mut self, region: RegionId) -> Option<OverlayHandle> {
        let entry = self.regions.get_mut(&region)?;
        let id = self.next_consumer;
        self.next_consumer += 1;
        entry.consumers.insert(id);
        Some(OverlayHandle { region, id })
    }

    pub fn consumer_count(&self, region: RegionId) -> usize {
        self.regions
            .get(&region)
            .map_or(0, |entry| entry.consumers.len())
    }

    fn release(&mut self, region: RegionId, id: u64) -> bool {
        self.regions
            .get_mut(&region)
            .is_some_and(|entry| entry.consumers.remove(&id))
    }
}
