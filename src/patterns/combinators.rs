//! 組み合わせパターン（AND / OR / NOT）

use super::base::Verdict;
use super::Pattern;
use crate::ctree::{CTree, NodeId};
use crate::matching::MatchContext;

/// すべてのパターンが同じノードに一致すること。最初の失敗で打ち切る。
/// 失敗した場合、途中までの束縛は巻き戻さない（失敗した試行のコンテキストは使わない前提）。
pub(super) fn check_and(
    patterns: &[Pattern],
    tree: &CTree,
    id: NodeId,
    ctx: &mut MatchContext,
) -> Verdict {
    for (i, pattern) in patterns.iter().enumerate() {
        if !pattern.check(tree, Some(id), ctx) {
            return Err(format!("sub-pattern #{} failed", i));
        }
    }
    Ok(())
}

/// 宣言順に試し、最初に一致した枝の束縛だけを残す
pub(super) fn check_or(
    patterns: &[Pattern],
    tree: &CTree,
    id: NodeId,
    ctx: &mut MatchContext,
) -> Verdict {
    for pattern in patterns {
        ctx.enter_scope();
        if pattern.check(tree, Some(id), ctx) {
            ctx.commit_scope();
            return Ok(());
        }
        ctx.discard_scope();
    }
    Err(format!("none of {} alternatives matched", patterns.len()))
}

/// 内側のパターンが一致しなければ成功。内側の束縛は結果によらず捨てる
pub(super) fn check_not(
    inner: &Pattern,
    tree: &CTree,
    id: NodeId,
    ctx: &mut MatchContext,
) -> Verdict {
    ctx.enter_scope();
    let matched = inner.check(tree, Some(id), ctx);
    ctx.discard_scope();

    if matched {
        Err("inner pattern matched".to_string())
    } else {
        Ok(())
    }
}
