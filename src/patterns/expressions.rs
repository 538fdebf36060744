//! 式パターンの判定（呼び出し・代入・演算）

use super::base::Verdict;
use super::Pattern;
use crate::ctree::{CTree, Node, NodeData, Op};
use crate::matching::MatchContext;

pub(super) fn check_call(
    callee: Option<&Pattern>,
    args: &[Pattern],
    ignore_arguments: bool,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::Call { x, args: actual } = &item.data else {
        return Err("item is not a call".to_string());
    };

    if let Some(callee) = callee {
        if !callee.check(tree, Some(*x), ctx) {
            return Err("callee did not match".to_string());
        }
    }

    if ignore_arguments {
        return Ok(());
    }

    if args.len() != actual.len() {
        return Err(format!(
            "argument count mismatch: expected {}, got {}",
            args.len(),
            actual.len()
        ));
    }

    for (i, (pattern, arg)) in args.iter().zip(actual).enumerate() {
        if !pattern.check(tree, Some(*arg), ctx) {
            return Err(format!("argument #{} did not match", i));
        }
    }
    Ok(())
}

pub(super) fn check_assignment(
    x: &Pattern,
    y: &Pattern,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::Asg { x: lhs, y: rhs } = &item.data else {
        return Err("item is not an assignment".to_string());
    };
    check_operands(x, y, *lhs, *rhs, tree, ctx)
}

pub(super) fn check_binary(
    op: Op,
    x: &Pattern,
    y: &Pattern,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::Binary {
        op: actual,
        x: lhs,
        y: rhs,
    } = &item.data
    else {
        return Err("item is not a binary expression".to_string());
    };

    if op != *actual {
        return Err(format!(
            "operator mismatch: expected '{}', got '{}'",
            op, actual
        ));
    }
    check_operands(x, y, *lhs, *rhs, tree, ctx)
}

pub(super) fn check_unary(
    op: Op,
    x: &Pattern,
    tree: &CTree,
    item: &Node,
    ctx: &mut MatchContext,
) -> Verdict {
    let NodeData::Unary { op: actual, x: operand } = &item.data else {
        return Err("item is not a unary expression".to_string());
    };

    if op != *actual {
        return Err(format!(
            "operator mismatch: expected '{}', got '{}'",
            op, actual
        ));
    }
    if !x.check(tree, Some(*operand), ctx) {
        return Err("operand did not match".to_string());
    }
    Ok(())
}

fn check_operands(
    x: &Pattern,
    y: &Pattern,
    lhs: crate::ctree::NodeId,
    rhs: crate::ctree::NodeId,
    tree: &CTree,
    ctx: &mut MatchContext,
) -> Verdict {
    if !x.check(tree, Some(lhs), ctx) {
        return Err("left operand did not match".to_string());
    }
    if !y.check(tree, Some(rhs), ctx) {
        return Err("right operand did not match".to_string());
    }
    Ok(())
}
