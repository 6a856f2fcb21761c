//! 字符前缀树（arena 存储）。
//!
//! 每个节点预先保存子树内排名最靠前的若干条目（`ranked`），
//! 这样常见的“前缀 + 小上限”查询不需要遍历整棵子树。
use std::{cmp::Ordering, collections::BTreeMap};

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<char, usize>,
    /// 以该节点结尾的 key 对应的条目
    terminal: Vec<u32>,
    /// 子树内（含自身）排名前 `depth` 的条目
    ranked: Vec<u32>,
}

#[derive(Debug)]
pub(crate) struct Trie {
    nodes: Vec<Node>,
    depth: usize,
}

impl Trie {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            nodes: vec![Node::default()],
            depth: depth.max(1),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn insert(&mut self, key: &str, id: u32) {
        let mut cur = 0;
        for ch in key.chars() {
            cur = match self.nodes[cur].children.get(&ch) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[cur].children.insert(ch, next);
                    next
                }
            };
        }
        self.nodes[cur].terminal.push(id);
    }

    /// 自底向上计算每个节点的 `ranked`。
    ///
    /// 子节点的下标总是大于父节点，所以倒序遍历即可保证先算子节点。
    pub(crate) fn finalize<F>(&mut self, rank: F)
    where
        F: Fn(u32, u32) -> Ordering,
    {
        for idx in (0..self.nodes.len()).rev() {
            let mut merged = self.nodes[idx].terminal.clone();
            for &child in self.nodes[idx].children.values() {
                merged.extend_from_slice(&self.nodes[child].ranked);
            }
            merged.sort_by(|&a, &b| rank(a, b).then(a.cmp(&b)));
            merged.dedup();
            merged.truncate(self.depth);
            self.nodes[idx].ranked = merged;
        }
    }

    pub(crate) fn find(&self, prefix: &str) -> Option<usize> {
        let mut cur = 0;
        for ch in prefix.chars() {
            cur = *self.nodes[cur].children.get(&ch)?;
        }
        Some(cur)
    }

    pub(crate) fn ranked(&self, node: usize) -> &[u32] {
        &self.nodes[node].ranked
    }

    /// 收集子树内全部条目（未排序，可能重复）。
    pub(crate) fn collect(&self, node: usize, out: &mut Vec<u32>) {
        let mut stack = vec![node];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx];
            out.extend_from_slice(&n.terminal);
            stack.extend(n.children.values().copied());
        }
    }
}
