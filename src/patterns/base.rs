//! 全パターン共通の照合パイプライン
//!
//! 各パターン固有の判定は、次の固定順の手順で包まれる。
//!
//! 1. ノードの存在チェック
//! 2. `check_op` による操作種別チェック
//! 3. パターン固有の判定
//! 4. 成功時の束縛（既存の束縛と衝突すれば失敗）
//! 5. デバッグフィルタに一致すればデバッグ出力

use super::{Pattern, PatternKind};
use crate::ctree::{CTree, Node, NodeId};
use crate::matching::{format_ea, MatchContext, TraceNode};

/// パターン固有の判定結果。失敗時は理由を持つ
pub(super) type Verdict = Result<(), String>;

impl Pattern {
    /// `node` がこのパターンに一致するか調べる
    ///
    /// `node` が `None` のときは「その子が存在しない」ことを表す。
    /// 失敗理由は `ctx.trace()` に記録される。
    pub fn check(&self, tree: &CTree, node: Option<NodeId>, ctx: &mut MatchContext) -> bool {
        let ea = node.and_then(|id| tree.get(id)).and_then(|n| n.ea);

        ctx.trace_mut().open();
        let verdict = self.run_pipeline(tree, node, ctx);
        let children = ctx.trace_mut().close();

        let debug = self.options.debug.accepts(ea);
        match verdict {
            Ok(()) => {
                if debug {
                    ctx.trace_mut().emit(format!(
                        "Pattern {} matched at {}",
                        self.variant_name(),
                        format_ea(ea)
                    ));
                }
                true
            }
            Err(reason) => {
                let failure = TraceNode {
                    pattern: self.variant_name(),
                    reason,
                    ea,
                    children,
                };
                if debug {
                    for line in failure.render() {
                        ctx.trace_mut().emit(line);
                    }
                }
                ctx.trace_mut().record(failure);
                false
            }
        }
    }

    fn run_pipeline(&self, tree: &CTree, node: Option<NodeId>, ctx: &mut MatchContext) -> Verdict {
        let Some(id) = node else {
            if matches!(self.kind, PatternKind::Any { may_be_absent: true }) {
                return Ok(());
            }
            return Err("node is absent".to_string());
        };
        let Some(item) = tree.get(id) else {
            return Err(format!("node {} does not exist", id));
        };

        if let Some(expected) = self.options.check_op {
            if item.op() != expected {
                return Err(format!(
                    "got item type '{}' ({}), expected '{}'",
                    item.op(),
                    tree.dstr(id),
                    expected
                ));
            }
        }

        self.predicate(tree, id, item, ctx)?;

        if let Some(name) = self.binding_name() {
            if !ctx.bind(name, id) {
                return Err(format!(
                    "cannot bind '{}': already bound to a different node",
                    name
                ));
            }
        }
        Ok(())
    }

    /// パターン固有の判定へ振り分ける
    fn predicate(&self, tree: &CTree, id: NodeId, item: &Node, ctx: &mut MatchContext) -> Verdict {
        match &self.kind {
            PatternKind::Any { .. } => Ok(()),
            PatternKind::Value { value } => super::leaves::check_value(*value, item),
            PatternKind::String { value, min_len } => {
                super::leaves::check_string(value.as_deref(), *min_len, item)
            }
            PatternKind::Object { name, ea } => {
                super::leaves::check_object(name.as_deref(), *ea, item)
            }
            PatternKind::Variable { index } => super::leaves::check_variable(*index, item),
            PatternKind::StructFieldAccess {
                struct_type,
                member_offset,
            } => super::leaves::check_struct_field(
                struct_type.as_ref(),
                *member_offset,
                tree,
                item,
            ),
            PatternKind::Call {
                callee,
                args,
                ignore_arguments,
            } => super::expressions::check_call(
                callee.as_deref(),
                args,
                *ignore_arguments,
                tree,
                item,
                ctx,
            ),
            PatternKind::Assignment { x, y } => {
                super::expressions::check_assignment(x, y, tree, item, ctx)
            }
            PatternKind::Binary { op, x, y } => {
                super::expressions::check_binary(*op, x, y, tree, item, ctx)
            }
            PatternKind::Unary { op, x } => {
                super::expressions::check_unary(*op, x, tree, item, ctx)
            }
            PatternKind::ExpressionStatement { expr } => {
                super::statements::check_expr_ins(expr, tree, item, ctx)
            }
            PatternKind::If {
                cond,
                then,
                otherwise,
            } => super::statements::check_if(
                cond,
                then.as_deref(),
                otherwise.as_deref(),
                tree,
                item,
                ctx,
            ),
            PatternKind::Return { value } => {
                super::statements::check_return(value.as_deref(), tree, item, ctx)
            }
            PatternKind::Sequence {
                patterns,
                skip_missing,
            } => super::statements::check_sequence(patterns, *skip_missing, tree, id, ctx),
            PatternKind::And(patterns) => super::combinators::check_and(patterns, tree, id, ctx),
            PatternKind::Or(patterns) => super::combinators::check_or(patterns, tree, id, ctx),
            PatternKind::Not(inner) => super::combinators::check_not(inner, tree, id, ctx),
        }
    }
}
