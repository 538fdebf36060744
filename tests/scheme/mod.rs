//! スキームテストの共通モジュール

use ctree_match::ctree::FuncInfo;
use ctree_match::{CTree, MatchContext, NodeId, NodeSpec, Op, Pattern, TreeSpec};

pub const FOO: u64 = 0x2000;
pub const BAR: u64 = 0x3000;

/// `foo(13);` を含む関数。`foo` は `bar` へのサンク
pub fn thunk_tree() -> CTree {
    CTree::from_spec(TreeSpec {
        name: "main".to_string(),
        ea: 0x1000,
        functions: vec![FuncInfo::thunk(FOO, "foo", BAR), FuncInfo::new(BAR, "bar")],
        body: NodeSpec::block(vec![
            NodeSpec::expr(NodeSpec::call(
                NodeSpec::obj(FOO, "foo"),
                vec![NodeSpec::num(13)],
            ))
            .at(0x1004),
            NodeSpec::ret(Some(NodeSpec::num(0))).at(0x1008),
        ]),
    })
    .expect("valid tree")
}

/// 前順で現れる指定種別のノードすべて
pub fn find_all(tree: &CTree, op: Op) -> Vec<NodeId> {
    tree.preorder()
        .into_iter()
        .filter(|id| tree.is_op(*id, op))
        .collect()
}

/// 木の中で `pattern` に一致するノードを前順で集める
pub fn matching_nodes(tree: &CTree, pattern: &Pattern) -> Vec<NodeId> {
    tree.preorder()
        .into_iter()
        .filter(|id| pattern.check(tree, Some(*id), &mut MatchContext::new()))
        .collect()
}

// サブモジュールの宣言
#[cfg(test)]
mod registry_test;
#[cfg(test)]
mod driver_test;
#[cfg(test)]
mod json_input_test;
