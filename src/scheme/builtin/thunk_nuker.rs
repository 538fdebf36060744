//! サンク経由の呼び出しを飛び先へ直接向け直すスキーム

use crate::ctree::{CTree, NodeData, NodeId};
use crate::matching::MatchContext;
use crate::patterns::Pattern;
use crate::scheme::{AstPatch, Scheme};

pub struct ThunkNuker {
    pattern: Pattern,
}

impl ThunkNuker {
    pub const NAME: &'static str = "thunk_nuker";

    pub fn new() -> Self {
        Self {
            pattern: Pattern::call_ignoring_args(None).bind("func"),
        }
    }
}

impl Default for ThunkNuker {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for ThunkNuker {
    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn on_matched_item(&self, tree: &CTree, item: NodeId, ctx: &MatchContext) -> Option<AstPatch> {
        let call = ctx.get("func").unwrap_or(item);
        let callee = match &tree.get(call)?.data {
            NodeData::Call { x, .. } => *x,
            _ => return None,
        };
        let func_ea = match tree.get(callee)?.data {
            NodeData::Obj { obj_ea, .. } => obj_ea,
            // 間接呼び出しは対象外
            _ => return None,
        };
        let target = tree.thunk_target(func_ea)?;
        log::debug!("{}: 0x{:X} -> 0x{:X}", Self::NAME, func_ea, target);
        Some(AstPatch::Redirect { call, target })
    }

    fn description(&self) -> &str {
        "サンク関数の呼び出しを飛び先の関数の呼び出しに置き換える"
    }
}
