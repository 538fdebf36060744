//! 組み合わせパターンと束縛のテスト

use super::*;
use ctree_match::PatternError;
use pretty_assertions::assert_eq;

#[test]
fn test_or_keeps_only_winning_branch_bindings() {
    let tree = tree(NodeSpec::var(0));
    let failing = Pattern::and(vec![Pattern::var().bind("a"), Pattern::value(1)]).expect("non-empty");
    let pattern = Pattern::or(vec![failing, Pattern::var().bind("b")]).expect("non-empty");

    let ctx = assert_matches(&pattern, &tree, tree.root());
    assert!(!ctx.contains("a"));
    assert_eq!(ctx.get("b"), Some(tree.root()));
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_or_tries_alternatives_in_order() {
    let tree = tree(NodeSpec::num(13));
    let pattern = Pattern::or(vec![
        Pattern::value(13).bind("first"),
        Pattern::number().bind("second"),
    ])
    .expect("non-empty");

    let ctx = assert_matches(&pattern, &tree, tree.root());
    assert!(ctx.contains("first"));
    assert!(!ctx.contains("second"));
}

#[test]
fn test_or_failure_reason() {
    let tree = tree(NodeSpec::num(13));
    let pattern = Pattern::or(vec![Pattern::var(), Pattern::string()]).expect("non-empty");
    assert_fails_with(&pattern, &tree, tree.root(), "none of 2 alternatives matched");
}

#[test]
fn test_not_never_binds() {
    let tree = tree(NodeSpec::num(13));
    let pattern = Pattern::not(Pattern::var().bind("inner")).bind("outer");

    let ctx = assert_matches(&pattern, &tree, tree.root());
    assert!(ctx.is_empty());
}

#[test]
fn test_not_fails_when_inner_matches() {
    let tree = tree(NodeSpec::num(13));
    let pattern = Pattern::not(Pattern::value(13).bind("inner"));

    let (matched, ctx) = run(&pattern, &tree, tree.root());
    assert!(!matched);
    assert!(ctx.is_empty());
    assert_eq!(
        ctx.trace().failure().map(|f| f.reason.as_str()),
        Some("inner pattern matched")
    );
}

#[test]
fn test_and_short_circuits() {
    let tree = tree(NodeSpec::num(13).at(0x100));
    // 2つ目が評価されればデバッグ行が出る
    let pattern = Pattern::and(vec![
        Pattern::value(7),
        Pattern::any().bind("never").debug(true),
    ])
    .expect("non-empty");

    let (matched, ctx) = run(&pattern, &tree, tree.root());
    assert!(!matched);
    assert!(ctx.trace().debug_lines().is_empty());
    let failure = ctx.trace().failure().expect("failure is recorded");
    assert_eq!(failure.reason, "sub-pattern #0 failed");
    assert_eq!(failure.children.len(), 1);
}

#[test]
fn test_and_binds_every_name() {
    let tree = tree(NodeSpec::num(13));
    let pattern = Pattern::and(vec![
        Pattern::number().bind("n"),
        Pattern::value(13).bind("thirteen"),
    ])
    .expect("non-empty")
    .bind("both");

    let ctx = assert_matches(&pattern, &tree, tree.root());
    let names: Vec<String> = ctx.bindings().keys().cloned().collect();
    assert_eq!(names, vec!["n", "thirteen", "both"]);
}

#[test]
fn test_rebinding_to_different_node_fails() {
    let tree = tree(NodeSpec::asg(NodeSpec::var(0), NodeSpec::var(1)));
    let pattern = Pattern::asg(Pattern::var().bind("v"), Pattern::var().bind("v"));

    let (matched, ctx) = run(&pattern, &tree, tree.root());
    assert!(!matched);
    let failure = ctx.trace().failure().expect("failure is recorded");
    assert_eq!(failure.reason, "right operand did not match");
    assert_eq!(
        failure.children[0].reason,
        "cannot bind 'v': already bound to a different node"
    );
}

#[test]
fn test_rebinding_to_same_node_succeeds() {
    let tree = tree(NodeSpec::var(0));
    let pattern = Pattern::and(vec![Pattern::var().bind("v"), Pattern::any().bind("v")])
        .expect("non-empty");
    let ctx = assert_matches(&pattern, &tree, tree.root());
    assert_eq!(ctx.get("v"), Some(tree.root()));
}

#[test]
fn test_empty_combinators_are_rejected() {
    assert_eq!(
        Pattern::and(vec![]),
        Err(PatternError::EmptyCombinator {
            combinator: "AndPattern"
        })
    );
    assert_eq!(
        Pattern::or(vec![]),
        Err(PatternError::EmptyCombinator {
            combinator: "OrPattern"
        })
    );
}

#[test]
fn test_bind_names_lists_nested_names() {
    let pattern = Pattern::asg(
        Pattern::var().bind("dst"),
        Pattern::not(Pattern::value(0).bind("ignored")),
    )
    .bind("asg");
    assert_eq!(pattern.bind_names(), vec!["asg", "dst"]);
}
