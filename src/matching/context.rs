//! 照合コンテキスト（束縛環境とスコープ管理）

use indexmap::IndexMap;

use super::trace::MatchTrace;
use crate::ctree::NodeId;

/// 1回の照合試行の束縛環境
///
/// 名前から照合済みノードへの対応を持つ。ノードそのものは所有せず `NodeId` だけを持つので、
/// 照合後に木を書き換えても束縛はそのノードを指し続ける。
#[derive(Debug, Clone)]
pub struct MatchContext {
    /// 外側から順に並んだスコープ。先頭は常に存在する
    scopes: Vec<IndexMap<String, NodeId>>,
    trace: MatchTrace,
}

impl MatchContext {
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
            trace: MatchTrace::new(),
        }
    }

    /// 名前を束縛する
    ///
    /// 既に別のノードに束縛されている名前は束縛できず `false` を返す。
    /// 同じノードへの再束縛は成功する。
    pub fn bind(&mut self, name: &str, node: NodeId) -> bool {
        match self.get(name) {
            Some(existing) if existing != node => {
                log::trace!(
                    "refusing to rebind '{}' from {} to {}",
                    name,
                    existing,
                    node
                );
                false
            }
            Some(_) => true,
            None => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.to_string(), node);
                }
                true
            }
        }
    }

    /// 束縛を検索（内側のスコープから）
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 新しいスコープを開始
    pub fn enter_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    /// 現在のスコープの束縛を外側のスコープへ確定する
    pub fn commit_scope(&mut self) {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                if let Some(outer) = self.scopes.last_mut() {
                    outer.extend(scope);
                }
            }
        }
    }

    /// 現在のスコープの束縛を捨てる
    pub fn discard_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// 開いているスコープの深さ（最外スコープのみなら0）
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// 現在見えている束縛を束縛順に返す
    pub fn bindings(&self) -> IndexMap<String, NodeId> {
        let mut all = IndexMap::new();
        for scope in &self.scopes {
            for (name, node) in scope {
                all.insert(name.clone(), *node);
            }
        }
        all
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.iter().all(IndexMap::is_empty)
    }

    /// この試行の診断情報
    pub fn trace(&self) -> &MatchTrace {
        &self.trace
    }

    pub(crate) fn trace_mut(&mut self) -> &mut MatchTrace {
        &mut self.trace
    }

    pub fn into_trace(self) -> MatchTrace {
        self.trace
    }
}

impl Default for MatchContext {
    fn default() -> Self {
        Self::new()
    }
}
