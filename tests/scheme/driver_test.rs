//! ドライバのテスト

use super::*;
use ctree_match::scheme::builtin::ThunkNuker;
use ctree_match::{
    run_schemes, AstPatch, NodeData, RunOptions, Scheme, SchemeError, SchemeRegistry,
};
use pretty_assertions::assert_eq;

/// 指定した名前の関数呼び出し文を消すスキーム
struct RemoveCalls {
    pattern: Pattern,
}

impl RemoveCalls {
    fn new(name: &str) -> Self {
        Self {
            pattern: ctree_match::call_insn(Pattern::call_ignoring_args(Some(
                Pattern::object_named(name),
            ))),
        }
    }
}

impl Scheme for RemoveCalls {
    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn on_matched_item(&self, _tree: &CTree, item: NodeId, _ctx: &MatchContext) -> Option<AstPatch> {
        Some(AstPatch::Remove { node: item })
    }
}

/// 一致したノードを常に向け直そうとする（呼び出し以外では失敗する）スキーム
struct BrokenRedirect {
    pattern: Pattern,
}

impl Scheme for BrokenRedirect {
    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn on_matched_item(&self, _tree: &CTree, item: NodeId, _ctx: &MatchContext) -> Option<AstPatch> {
        Some(AstPatch::Redirect {
            call: item,
            target: BAR,
        })
    }
}

fn registry_with(name: &str, scheme: Box<dyn Scheme>) -> SchemeRegistry {
    let mut registry = SchemeRegistry::new();
    registry.register(name, scheme).expect("unique name");
    registry
}

#[test]
fn test_thunk_call_is_redirected_in_place() {
    let mut tree = thunk_tree();
    let call = find_all(&tree, Op::Call)[0];
    let registry = registry_with("thunk_nuker", Box::new(ThunkNuker::new()));

    let report = run_schemes(&mut tree, &registry, &RunOptions::default()).expect("run");
    assert_eq!(report.schemes[0].matches, vec![call]);
    assert_eq!(report.total_patches(), 1);
    assert_eq!(tree.dstr(call), "bar(13 /* 0xD */)");

    // 書き換え後の木では bar への呼び出しとして一致する
    let to_bar = Pattern::call(Some(Pattern::object_named("bar")), vec![Pattern::value(13)]);
    assert_eq!(matching_nodes(&tree, &to_bar), vec![call]);
    let to_foo = Pattern::call_ignoring_args(Some(Pattern::object_named("foo")));
    assert!(matching_nodes(&tree, &to_foo).is_empty());
}

#[test]
fn test_second_run_matches_without_patching() {
    let mut tree = thunk_tree();
    let registry = SchemeRegistry::with_builtin();
    let options = RunOptions {
        schemes: vec!["thunk_nuker".to_string()],
        trace_at: None,
    };

    run_schemes(&mut tree, &registry, &options).expect("first run");
    let report = run_schemes(&mut tree, &registry, &options).expect("second run");
    assert_eq!(report.total_matches(), 1);
    assert_eq!(report.total_patches(), 0);
}

#[test]
fn test_removed_statement_children_are_skipped() {
    let mut tree = thunk_tree();
    let calls = find_all(&tree, Op::Call);
    let mut registry = SchemeRegistry::new();
    registry
        .register("remove_foo", Box::new(RemoveCalls::new("foo")))
        .expect("unique name");
    registry
        .register("thunk_nuker", Box::new(ThunkNuker::new()))
        .expect("unique name");

    let report = run_schemes(&mut tree, &registry, &RunOptions::default()).expect("run");
    assert_eq!(report.schemes[0].patches_applied, 1);
    // 消した文の中の呼び出しは二度と候補にならない
    assert!(!tree.is_attached(calls[0]));
    assert!(report.schemes[1].matches.is_empty());
    assert!(find_all(&tree, Op::Call).is_empty());
    assert_eq!(find_all(&tree, Op::Empty).len(), 1);
}

#[test]
fn test_failed_patch_is_reported() {
    let mut tree = thunk_tree();
    let registry = registry_with(
        "broken",
        Box::new(BrokenRedirect {
            pattern: Pattern::value(0),
        }),
    );

    let report = run_schemes(&mut tree, &registry, &RunOptions::default()).expect("run");
    let scheme = &report.schemes[0];
    assert_eq!(scheme.matches.len(), 1);
    assert_eq!(scheme.patches_applied, 0);
    assert_eq!(scheme.errors.len(), 1);

    // 木は変わらない
    let ret = find_all(&tree, Op::Return)[0];
    assert_eq!(tree.dstr(ret), "return 0;");
}

#[test]
fn test_unknown_scheme_is_an_error() {
    let mut tree = thunk_tree();
    let registry = SchemeRegistry::with_builtin();
    let options = RunOptions {
        schemes: vec!["missing".to_string()],
        trace_at: None,
    };
    assert!(matches!(
        run_schemes(&mut tree, &registry, &options),
        Err(SchemeError::Unknown { .. })
    ));
}

#[test]
fn test_trace_at_collects_failure_tree() {
    let mut tree = thunk_tree();
    let registry = registry_with("remove_bar", Box::new(RemoveCalls::new("bar")));
    let options = RunOptions {
        schemes: Vec::new(),
        trace_at: Some(0x1004),
    };

    let report = run_schemes(&mut tree, &registry, &options).expect("run");
    let traces = &report.schemes[0].traces;
    assert_eq!(traces.len(), 1);
    assert_eq!(
        traces[0].1,
        vec![
            "ExpressionStatementPattern: expression did not match at 0x1004",
            "  CallPattern: callee did not match",
            "    ObjectPattern: object name mismatch: expected bar, got foo",
        ]
    );
}

#[test]
fn test_replace_keeps_statement_address() {
    let mut tree = thunk_tree();
    let stmt = find_all(&tree, Op::ExprIns)[0];
    AstPatch::replace_with_helper_call(stmt, "__nothing")
        .apply(&mut tree)
        .expect("replace");

    let new = tree.block_statements(tree.root()).expect("block")[0];
    assert_ne!(new, stmt);
    assert_eq!(tree.get(new).and_then(|node| node.ea), Some(0x1004));
    assert_eq!(tree.dstr(new), "__nothing();");
    assert!(matches!(
        tree.get(stmt).map(|node| &node.data),
        Some(NodeData::ExprIns { .. })
    ));
}
