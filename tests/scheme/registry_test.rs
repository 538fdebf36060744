//! 登録簿のテスト

use ctree_match::scheme::builtin::{TerminalDebug, ThunkNuker};
use ctree_match::{SchemeError, SchemeRegistry};

#[test]
fn test_builtin_registration_order() {
    let registry = SchemeRegistry::with_builtin();
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, vec!["thunk_nuker", "terminal_debug"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut registry = SchemeRegistry::new();
    registry
        .register("thunk_nuker", Box::new(ThunkNuker::new()))
        .expect("first registration");

    let result = registry.register("thunk_nuker", Box::new(TerminalDebug::new()));
    assert!(matches!(
        result,
        Err(SchemeError::Duplicate { ref name }) if name == "thunk_nuker"
    ));
    // 既存の登録は置き換えられない
    assert_eq!(
        registry.get("thunk_nuker").map(|scheme| scheme.pattern().to_string()).ok(),
        Some("CallPattern".to_string())
    );
}

#[test]
fn test_unknown_name() {
    let registry = SchemeRegistry::new();
    assert!(registry.is_empty());
    assert!(matches!(
        registry.get("missing"),
        Err(SchemeError::Unknown { ref name }) if name == "missing"
    ));
}

#[test]
fn test_builtin_schemes_are_described() {
    let registry = SchemeRegistry::with_builtin();
    for (name, scheme) in registry.iter() {
        assert!(!scheme.description().is_empty(), "{} has no description", name);
    }
}
