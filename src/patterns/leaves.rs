//! 葉パターンの判定（値・文字列・オブジェクト・変数・構造体メンバー）

use super::base::Verdict;
use super::StructConstraint;
use crate::ctree::{str2user, tag_remove, CTree, Ea, Node, NodeData};

/// 数値リテラルの値、またはオブジェクト参照のアドレスと比較する
pub(super) fn check_value(expected: Option<u64>, item: &Node) -> Verdict {
    let actual = match &item.data {
        NodeData::Num { value } => *value,
        NodeData::Obj { obj_ea, .. } => *obj_ea,
        _ => return Err("item is not a number or object".to_string()),
    };

    match expected {
        Some(expected) if expected != actual => Err(format!(
            "value mismatch: expected {}, got {}",
            expected, actual
        )),
        _ => Ok(()),
    }
}

pub(super) fn check_string(expected: Option<&str>, min_len: usize, item: &Node) -> Verdict {
    let text = match &item.data {
        NodeData::Str { value } => value.clone(),
        NodeData::Obj { .. } => {
            let name = item.printable_name().unwrap_or_default();
            str2user(&tag_remove(&name))
        }
        _ => return Err("item is not a string or object".to_string()),
    };

    match expected {
        None if text.chars().count() >= min_len => Ok(()),
        None => Err(format!(
            "string shorter than minlen {}: got {} characters",
            min_len,
            text.chars().count()
        )),
        Some(expected) if expected == text => Ok(()),
        Some(expected) => Err(format!(
            "string mismatch: expected {:?}, got {:?}",
            expected, text
        )),
    }
}

pub(super) fn check_object(name: Option<&str>, ea: Option<Ea>, item: &Node) -> Verdict {
    let NodeData::Obj { obj_ea, .. } = &item.data else {
        return Err("item is not an object".to_string());
    };

    if let Some(ea) = ea {
        if ea != *obj_ea {
            return Err(format!(
                "object address mismatch: expected 0x{:X}, got 0x{:X}",
                ea, obj_ea
            ));
        }
    }

    if let Some(name) = name {
        let actual = tag_remove(&item.printable_name().unwrap_or_default());
        if name != actual {
            return Err(format!(
                "object name mismatch: expected {}, got {}",
                name, actual
            ));
        }
    }
    Ok(())
}

pub(super) fn check_variable(index: Option<u32>, item: &Node) -> Verdict {
    let NodeData::Var { index: actual, .. } = &item.data else {
        return Err("item is not a variable".to_string());
    };

    match index {
        Some(index) if index != *actual => Err(format!(
            "variable index mismatch: expected {}, got {}",
            index, actual
        )),
        _ => Ok(()),
    }
}

/// 構造体メンバーアクセス
///
/// 基底式の型がポインタなら1段だけ参照先をたどり、構造体型であることを要求する。
pub(super) fn check_struct_field(
    struct_type: Option<&StructConstraint>,
    member_offset: Option<u32>,
    tree: &CTree,
    item: &Node,
) -> Verdict {
    let (base, offset) = match &item.data {
        NodeData::MemPtr { x, m } | NodeData::MemRef { x, m } => (*x, *m),
        _ => return Err("item is not a member pointer or reference".to_string()),
    };

    let Some(base_type) = tree.get(base).and_then(|node| node.ty.as_ref()) else {
        return Err("base expression has no type information".to_string());
    };
    let stype = base_type.pointed_object().unwrap_or(base_type);

    if !stype.is_struct() {
        return Err(format!("target type '{}' is not a struct", stype));
    }

    if let Some(expected) = member_offset {
        if expected != offset {
            return Err(format!(
                "member offset mismatch: expected {}, got {}",
                expected, offset
            ));
        }
    }

    match struct_type {
        Some(constraint) if !constraint.accepts(stype) => Err(format!(
            "struct type mismatch: expected {}, got {}",
            constraint, stype
        )),
        _ => Ok(()),
    }
}
