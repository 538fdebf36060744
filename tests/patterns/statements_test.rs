//! 文パターンのテスト

use super::*;
use ctree_match::{call_insn, PatternError};

/// 引数なしの関数呼び出し文
fn call_stmt(ea: u64, name: &str) -> NodeSpec {
    NodeSpec::expr(NodeSpec::call(NodeSpec::obj(ea, name), vec![]))
}

/// `a(); b(); c();` からなるブロックと、その文
fn three_calls() -> (CTree, Vec<NodeId>) {
    let tree = tree(NodeSpec::block(vec![
        call_stmt(0x1000, "a"),
        call_stmt(0x2000, "b"),
        call_stmt(0x3000, "c"),
    ]));
    let stmts = tree
        .block_statements(tree.root())
        .expect("root is a block")
        .to_vec();
    (tree, stmts)
}

fn calls_helper(name: &str) -> Pattern {
    call_insn(Pattern::call(Some(Pattern::object_named(name)), vec![]))
}

#[test]
fn test_expression_statement() {
    let (tree, stmts) = three_calls();
    assert_matches(&calls_helper("b"), &tree, stmts[1]);
    assert_fails_with(&calls_helper("b"), &tree, stmts[0], "expression did not match");
}

#[test]
fn test_if_without_else() {
    let tree = tree(NodeSpec::if_stmt(
        NodeSpec::var(0),
        call_stmt(0x1000, "a"),
        None,
    ));
    let stmt = tree.root();

    assert_matches(&Pattern::if_stmt(Pattern::var(), None, None), &tree, stmt);
    assert_matches(
        &Pattern::if_stmt(Pattern::any(), Some(calls_helper("a")), Some(Pattern::any_or_absent())),
        &tree,
        stmt,
    );
    assert_fails_with(
        &Pattern::if_stmt(Pattern::any(), None, Some(Pattern::any())),
        &tree,
        stmt,
        "else branch did not match",
    );
}

#[test]
fn test_if_condition_mismatch() {
    let tree = tree(NodeSpec::if_stmt(NodeSpec::num(1), call_stmt(0x1000, "a"), None));
    assert_fails_with(
        &Pattern::if_stmt(Pattern::var(), None, None),
        &tree,
        tree.root(),
        "condition did not match",
    );
}

#[test]
fn test_return_value() {
    let with_value = tree(NodeSpec::ret(Some(NodeSpec::num(0))));
    assert_matches(&Pattern::ret(None), &with_value, with_value.root());
    assert_matches(&Pattern::ret(Some(Pattern::value(0))), &with_value, with_value.root());

    let bare = tree(NodeSpec::ret(None));
    assert_matches(&Pattern::ret(None), &bare, bare.root());
    assert_matches(&Pattern::ret(Some(Pattern::any_or_absent())), &bare, bare.root());
    assert_fails_with(
        &Pattern::ret(Some(Pattern::value(0))),
        &bare,
        bare.root(),
        "returned value did not match",
    );
}

#[test]
fn test_sequence_from_candidate() {
    let (tree, stmts) = three_calls();
    let pattern = Pattern::seq(vec![calls_helper("b"), calls_helper("c")]).expect("non-empty");
    assert_matches(&pattern, &tree, stmts[1]);
    assert_fails_with(&pattern, &tree, stmts[0], "statement #0 did not match");
}

#[test]
fn test_sequence_allows_trailing_statements() {
    let (tree, stmts) = three_calls();
    let pattern = Pattern::seq(vec![calls_helper("a"), calls_helper("b")]).expect("non-empty");
    assert_matches(&pattern, &tree, stmts[0]);
}

#[test]
fn test_sequence_insufficient_siblings() {
    let (tree, stmts) = three_calls();
    let pattern = Pattern::seq(vec![Pattern::any(), Pattern::any()]).expect("non-empty");
    assert_fails_with(
        &pattern,
        &tree,
        stmts[2],
        "insufficient siblings: need 2, have 1",
    );
}

#[test]
fn test_exact_sequence_must_reach_block_end() {
    let (tree, stmts) = three_calls();
    let pattern = Pattern::seq_exact(vec![Pattern::any(), Pattern::any()]).expect("non-empty");
    assert_fails_with(
        &pattern,
        &tree,
        stmts[0],
        "sequence does not reach the end of the block: 1 statements left over",
    );
    assert_matches(&pattern, &tree, stmts[1]);
}

#[test]
fn test_sequence_outside_block() {
    let tree = tree(call_stmt(0x1000, "a"));
    let pattern = Pattern::seq(vec![Pattern::any()]).expect("non-empty");
    assert_fails_with(
        &pattern,
        &tree,
        tree.root(),
        "item is not a statement inside a block",
    );
}

#[test]
fn test_sequence_binds_across_statements() {
    let (tree, stmts) = three_calls();
    let pattern = Pattern::seq(vec![
        Pattern::any().bind("first"),
        Pattern::any().bind("second"),
    ])
    .expect("non-empty");
    let ctx = assert_matches(&pattern, &tree, stmts[0]);
    assert_eq!(ctx.get("first"), Some(stmts[0]));
    assert_eq!(ctx.get("second"), Some(stmts[1]));
}

#[test]
fn test_empty_sequence_is_rejected() {
    assert_eq!(
        Pattern::seq(vec![]),
        Err(PatternError::EmptyCombinator {
            combinator: "SequencePattern"
        })
    );
}
