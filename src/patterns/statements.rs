//! 文パターンの判定（式文・if・return・兄弟文の並び）

use super::base::Verdict;
use super::Pattern;
use crate::ctree::{CTree, Node, NodeData, NodeId};
use crate::matching::MatchContext;

pub(super) fn check_expr_ins(
    expr: &Pattern,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::ExprIns { expr: inner } = &item.data else {
        return Err("item is not an expression statement".to_string());
    };

    if !expr.check(tree, Some(*inner), ctx) {
        return Err("expression did not match".to_string());
    }
    Ok(())
}

/// if文。`then` / `otherwise` が `None` なら制約なし。
/// else節のない文では `otherwise` のパターンに存在しないノードを渡す。
pub(super) fn check_if(
    cond: &Pattern,
    then: Option<&Pattern>,
    otherwise: Option<&Pattern>,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::If {
        cond: actual_cond,
        then: actual_then,
        otherwise: actual_else,
    } = &item.data
    else {
        return Err("item is not an if statement".to_string());
    };

    if !cond.check(tree, Some(*actual_cond), ctx) {
        return Err("condition did not match".to_string());
    }
    if let Some(then) = then {
        if !then.check(tree, Some(*actual_then), ctx) {
            return Err("then branch did not match".to_string());
        }
    }
    if let Some(otherwise) = otherwise {
        if !otherwise.check(tree, *actual_else, ctx) {
            return Err("else branch did not match".to_string());
        }
    }
    Ok(())
}

pub(super) fn check_return(
    value: Option<&Pattern>,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::Return { value: actual } = &item.data else {
        return Err("item is not a return statement".to_string());
    };

    match value {
        Some(value) if !value.check(tree, *actual, ctx) => {
            Err("returned value did not match".to_string())
        }
        _ => Ok(()),
    }
}

/// 候補の文から始まる兄弟文を、パターン1つにつき1文ずつ照合する
pub(super) fn check_sequence(
    patterns: &[Pattern],
    skip_missing: bool,
    tree: &CTree,
    id: NodeId,
    ctx: &mut MatchContext,
) -> Verdict {
    let Some((block, start)) = tree.block_position(id) else {
        return Err("item is not a statement inside a block".to_string());
    };
    let siblings = tree.block_statements(block).unwrap_or_default();
    let available = siblings.len() - start;

    if available < patterns.len() {
        return Err(format!(
            "insufficient siblings: need {}, have {}",
            patterns.len(),
            available
        ));
    }
    if !skip_missing && available != patterns.len() {
        return Err(format!(
            "sequence does not reach the end of the block: {} statements left over",
            available - patterns.len()
        ));
    }

    for (i, (pattern, stmt)) in patterns.iter().zip(&siblings[start..]).enumerate() {
        if !pattern.check(tree, Some(*stmt), ctx) {
            return Err(format!("statement #{} did not match", i));
        }
    }
    Ok(())
}
