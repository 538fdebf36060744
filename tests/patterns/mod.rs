//! パターン照合テストの共通モジュール
//!
//! 木の構築と照合の実行を行うヘルパー関数を定義する。

use ctree_match::{CTree, MatchContext, NodeId, NodeSpec, Op, Pattern};

/// 本体だけの木を作るヘルパー関数
pub fn tree(body: NodeSpec) -> CTree {
    CTree::with_body("test", body).expect("valid tree")
}

/// 前順で最初に現れる指定種別のノード
pub fn find(tree: &CTree, op: Op) -> NodeId {
    tree.preorder()
        .into_iter()
        .find(|id| tree.is_op(*id, op))
        .unwrap_or_else(|| panic!("no {} node in tree", op))
}

/// 新しいコンテキストで照合し、結果とコンテキストを返す
pub fn run(pattern: &Pattern, tree: &CTree, id: NodeId) -> (bool, MatchContext) {
    let mut ctx = MatchContext::new();
    let matched = pattern.check(tree, Some(id), &mut ctx);
    (matched, ctx)
}

/// 照合に成功することを確認するヘルパー関数
pub fn assert_matches(pattern: &Pattern, tree: &CTree, id: NodeId) -> MatchContext {
    let (matched, ctx) = run(pattern, tree, id);
    assert!(
        matched,
        "{} should match {}: {:?}",
        pattern,
        tree.dstr(id),
        ctx.trace().render()
    );
    ctx
}

/// 照合に失敗し、最上位の失敗理由が `reason` であることを確認するヘルパー関数
pub fn assert_fails_with(pattern: &Pattern, tree: &CTree, id: NodeId, reason: &str) {
    let (matched, ctx) = run(pattern, tree, id);
    assert!(!matched, "{} should not match {}", pattern, tree.dstr(id));
    let failure = ctx.trace().failure().expect("failure is recorded");
    assert_eq!(failure.reason, reason);
}

#[cfg(test)]
mod statements_test;
#[cfg(test)]
mod combinators_test;
