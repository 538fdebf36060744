//! デバッグ用の分岐を1行のヘルパー呼び出しに畳むスキーム
//!
//! `if (x == 13)` または `if (giTerminalDebug)` で始まる `if` 文が対象。
//! フラグ変数による分岐は `__nothing();`、それ以外は `__syslog_chk();` に置き換える。

use crate::ctree::{CTree, NodeId};
use crate::matching::MatchContext;
use crate::patterns::{Pattern, PatternKind};
use crate::scheme::{AstPatch, Scheme};

/// デバッグ出力の有効フラグを保持するグローバル変数の名前
const DEBUG_FLAG: &str = "giTerminalDebug";

pub struct TerminalDebug {
    pattern: Pattern,
}

impl TerminalDebug {
    pub const NAME: &'static str = "terminal_debug";

    pub fn new() -> Self {
        let cond = Pattern::new(PatternKind::Or(vec![
            Pattern::eq(Pattern::var(), Pattern::value(13)),
            Pattern::object_named(DEBUG_FLAG).bind("debug_flag"),
        ]));
        Self {
            pattern: Pattern::if_stmt(cond, None, None),
        }
    }
}

impl Default for TerminalDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for TerminalDebug {
    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn on_matched_item(&self, _tree: &CTree, item: NodeId, ctx: &MatchContext) -> Option<AstPatch> {
        let helper = if ctx.contains("debug_flag") {
            "__nothing"
        } else {
            "__syslog_chk"
        };
        Some(AstPatch::replace_with_helper_call(item, helper))
    }

    fn description(&self) -> &str {
        "デバッグ用の if 文をヘルパー呼び出しに置き換える"
    }
}
