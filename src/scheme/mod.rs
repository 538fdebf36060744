//! スキーム（パターンと書き換えコールバックの組）
//!
//! スキームはパターン照合の利用者であり、照合エンジン本体ではない。
//! コールバックは木を直接変更せず `AstPatch` を返し、ドライバがそれを適用する。

pub mod builtin;
mod driver;

pub use driver::{run_schemes, RunOptions, RunReport, SchemeReport};

use indexmap::IndexMap;

use crate::ctree::{CTree, Ea, NodeId, NodeSpec};
use crate::error::{CtreeResult, SchemeError, SchemeResult};
use crate::matching::MatchContext;
use crate::patterns::Pattern;

/// 木の書き換え要求
#[derive(Debug, Clone, PartialEq)]
pub enum AstPatch {
    /// ノードを新しく作ったノードで置き換える
    Replace { node: NodeId, with: NodeSpec },
    /// 呼び出し先を別のアドレスへ向け直す（照合したノードをその場で書き換える）
    Redirect { call: NodeId, target: Ea },
    /// 文を空文にする
    Remove { node: NodeId },
}

impl AstPatch {
    /// 文をヘルパー関数呼び出し `name();` で置き換える
    pub fn replace_with_helper_call(node: NodeId, name: impl Into<String>) -> Self {
        AstPatch::Replace {
            node,
            with: NodeSpec::helper_call_stmt(name),
        }
    }

    /// 木に適用する
    pub fn apply(self, tree: &mut CTree) -> CtreeResult<()> {
        match self {
            AstPatch::Replace { node, with } => {
                let ea = tree.node(node)?.ea;
                let with = match (with.ea, ea) {
                    (None, Some(ea)) => with.at(ea),
                    _ => with,
                };
                let new = tree.add(with)?;
                tree.replace(node, new)
            }
            AstPatch::Redirect { call, target } => tree.redirect_call(call, target),
            AstPatch::Remove { node } => tree.remove_statement(node),
        }
    }
}

/// パターンと、一致したときに呼ばれるコールバック
pub trait Scheme {
    fn pattern(&self) -> &Pattern;

    /// 一致したノードと束縛を受け取り、必要なら書き換え要求を返す
    fn on_matched_item(&self, tree: &CTree, item: NodeId, ctx: &MatchContext)
        -> Option<AstPatch>;

    fn description(&self) -> &str {
        ""
    }
}

/// 名前付きスキームの登録簿
///
/// 起動時に登録し、以後は名前で参照する。登録の解除はしない。
#[derive(Default)]
pub struct SchemeRegistry {
    schemes: IndexMap<String, Box<dyn Scheme>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 組み込みスキームを登録済みの登録簿
    pub fn with_builtin() -> Self {
        let schemes = builtin::all()
            .into_iter()
            .map(|(name, scheme)| (name.to_string(), scheme))
            .collect();
        Self { schemes }
    }

    pub fn register(&mut self, name: impl Into<String>, scheme: Box<dyn Scheme>) -> SchemeResult<()> {
        let name = name.into();
        if self.schemes.contains_key(&name) {
            return Err(SchemeError::Duplicate { name });
        }
        log::debug!("registered scheme '{}'", name);
        self.schemes.insert(name, scheme);
        Ok(())
    }

    pub fn get(&self, name: &str) -> SchemeResult<&dyn Scheme> {
        self.schemes
            .get(name)
            .map(|scheme| &**scheme)
            .ok_or_else(|| SchemeError::Unknown {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &(dyn Scheme + 'static))> + '_ {
        self.schemes
            .iter()
            .map(|(name, scheme)| (name.as_str(), &**scheme))
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}
