//! JSONファイルからの読み込みのテスト

use super::*;
use ctree_match::{run_schemes, CtreeError, MatchError, RunOptions, SchemeRegistry};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

const THUNK_JSON: &str = r#"{
    "name": "main",
    "ea": 4096,
    "functions": [
        { "ea": 8192, "name": "foo", "thunk_target": 12288 },
        { "ea": 12288, "name": "bar" }
    ],
    "body": {
        "op": "block",
        "stmts": [
            {
                "op": "expr",
                "ea": 4100,
                "expr": {
                    "op": "call",
                    "x": { "op": "obj", "obj_ea": 8192, "name": "foo" },
                    "args": [ { "op": "num", "value": 13 } ]
                }
            },
            {
                "op": "expr",
                "expr": {
                    "op": "memptr",
                    "m": 8,
                    "x": {
                        "op": "var",
                        "index": 0,
                        "ty": { "kind": "ptr", "to": { "kind": "struct", "name": "Point" } }
                    }
                }
            }
        ]
    }
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn load(file: &NamedTempFile) -> Result<CTree, CtreeError> {
    let json = fs::read_to_string(file.path()).expect("read temp file");
    CTree::from_json(&json)
}

#[test]
fn test_load_and_rewrite_from_file() {
    let file = write_temp(THUNK_JSON);
    let mut tree = load(&file).expect("valid tree");
    assert_eq!(tree.name(), "main");
    assert_eq!(tree.thunk_target(FOO), Some(BAR));

    let field = Pattern::struct_field(Some("Point".into()), Some(8));
    assert_eq!(matching_nodes(&tree, &field).len(), 1);

    run_schemes(&mut tree, &SchemeRegistry::with_builtin(), &RunOptions::default())
        .expect("run");
    assert!(tree.render().contains("bar(13 /* 0xD */);"));
}

#[test]
fn test_dump_round_trip_through_file() {
    let mut tree = load(&write_temp(THUNK_JSON)).expect("valid tree");
    run_schemes(&mut tree, &SchemeRegistry::with_builtin(), &RunOptions::default())
        .expect("run");

    let dumped = serde_json::to_string_pretty(&tree.to_spec().expect("to_spec")).expect("json");
    let reloaded = load(&write_temp(&dumped)).expect("dumped tree is valid");
    assert_eq!(reloaded.render(), tree.render());
}

#[test]
fn test_malformed_json_is_rejected() {
    let file = write_temp(r#"{ "name": "main", "body": { "op": "jump" } }"#);
    assert!(matches!(load(&file), Err(CtreeError::Json(_))));
}

#[test]
fn test_unknown_operator_is_rejected() {
    let json = r#"{
        "name": "main",
        "body": {
            "op": "binary",
            "kind": "callx",
            "x": { "op": "num", "value": 1 },
            "y": { "op": "num", "value": 2 }
        }
    }"#;
    assert!(matches!(load(&write_temp(json)), Err(CtreeError::Json(_))));
}

#[test]
fn test_statement_where_expression_expected() {
    let json = r#"{
        "name": "main",
        "body": { "op": "expr", "expr": { "op": "return" } }
    }"#;
    assert!(matches!(
        load(&write_temp(json)),
        Err(CtreeError::InvalidOp { .. })
    ));
}

#[test]
fn test_from_path_reports_missing_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let result = CTree::from_path(dir.path().join("missing.json"));
    assert!(matches!(result, Err(MatchError::Io(_))));
}

#[test]
fn test_from_path_reports_bad_tree() {
    let file = write_temp(r#"{ "name": "main", "body": { "op": "block", "stmts": [ { "op": "num", "value": 1 } ] } }"#);
    let result = CTree::from_path(file.path());
    assert!(matches!(
        result,
        Err(MatchError::Ctree(CtreeError::NotAStatement { .. }))
    ));
}
