//! ctreeの入力形式（JSON）とノード構築用のヘルパー
//!
//! アリーナ形式は手書きしにくいため、入れ子の `NodeSpec` で木を記述し、
//! `CTree::from_spec` でアリーナに展開する。

use serde::{Deserialize, Serialize};

use super::{CType, Ea, Op};
use crate::error::{CtreeError, CtreeResult};

/// 関数のメタデータ（ホスト側のデータベースに相当）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncInfo {
    pub ea: Ea,
    pub name: String,
    /// サンク（トランポリン）なら飛び先のアドレス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thunk_target: Option<Ea>,
}

impl FuncInfo {
    pub fn new(ea: Ea, name: impl Into<String>) -> Self {
        Self {
            ea,
            name: name.into(),
            thunk_target: None,
        }
    }

    pub fn thunk(ea: Ea, name: impl Into<String>, target: Ea) -> Self {
        Self {
            ea,
            name: name.into(),
            thunk_target: Some(target),
        }
    }
}

/// 1関数分の木
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub name: String,
    #[serde(default)]
    pub ea: Ea,
    #[serde(default)]
    pub functions: Vec<FuncInfo>,
    pub body: NodeSpec,
}

/// 入れ子で記述したノード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ea: Option<Ea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<CType>,
    #[serde(flatten)]
    pub kind: SpecKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum SpecKind {
    Num {
        value: u64,
    },
    Str {
        value: String,
    },
    Obj {
        obj_ea: Ea,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Var {
        index: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    MemPtr {
        x: Box<NodeSpec>,
        m: u32,
    },
    MemRef {
        x: Box<NodeSpec>,
        m: u32,
    },
    Call {
        x: Box<NodeSpec>,
        #[serde(default)]
        args: Vec<NodeSpec>,
    },
    Helper {
        name: String,
    },
    Asg {
        x: Box<NodeSpec>,
        y: Box<NodeSpec>,
    },
    Binary {
        kind: Op,
        x: Box<NodeSpec>,
        y: Box<NodeSpec>,
    },
    Unary {
        kind: Op,
        x: Box<NodeSpec>,
    },
    Expr {
        expr: Box<NodeSpec>,
    },
    If {
        cond: Box<NodeSpec>,
        then: Box<NodeSpec>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<NodeSpec>>,
    },
    Block {
        #[serde(default)]
        stmts: Vec<NodeSpec>,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<NodeSpec>>,
    },
    Empty,
}

impl NodeSpec {
    fn new(kind: SpecKind) -> Self {
        Self {
            ea: None,
            ty: None,
            kind,
        }
    }

    /// アドレスを付ける
    pub fn at(mut self, ea: Ea) -> Self {
        self.ea = Some(ea);
        self
    }

    /// 型を付ける
    pub fn typed(mut self, ty: CType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn num(value: u64) -> Self {
        Self::new(SpecKind::Num { value })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(SpecKind::Str {
            value: value.into(),
        })
    }

    pub fn obj(obj_ea: Ea, name: impl Into<String>) -> Self {
        Self::new(SpecKind::Obj {
            obj_ea,
            name: Some(name.into()),
        })
    }

    pub fn unnamed_obj(obj_ea: Ea) -> Self {
        Self::new(SpecKind::Obj { obj_ea, name: None })
    }

    pub fn var(index: u32) -> Self {
        Self::new(SpecKind::Var { index, name: None })
    }

    pub fn named_var(index: u32, name: impl Into<String>) -> Self {
        Self::new(SpecKind::Var {
            index,
            name: Some(name.into()),
        })
    }

    pub fn memptr(x: NodeSpec, m: u32) -> Self {
        Self::new(SpecKind::MemPtr { x: Box::new(x), m })
    }

    pub fn memref(x: NodeSpec, m: u32) -> Self {
        Self::new(SpecKind::MemRef { x: Box::new(x), m })
    }

    pub fn call(x: NodeSpec, args: Vec<NodeSpec>) -> Self {
        Self::new(SpecKind::Call {
            x: Box::new(x),
            args,
        })
    }

    pub fn helper(name: impl Into<String>) -> Self {
        Self::new(SpecKind::Helper { name: name.into() })
    }

    /// `name();` という文を作る
    pub fn helper_call_stmt(name: impl Into<String>) -> Self {
        Self::expr(Self::call(Self::helper(name), Vec::new()))
    }

    pub fn asg(x: NodeSpec, y: NodeSpec) -> Self {
        Self::new(SpecKind::Asg {
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    /// 二項演算。`op` が二項演算子でなければエラー
    pub fn binary(op: Op, x: NodeSpec, y: NodeSpec) -> CtreeResult<Self> {
        if !op.is_binary() {
            return Err(CtreeError::InvalidOp {
                op,
                expected: "binary operator",
            });
        }
        Ok(Self::new(SpecKind::Binary {
            kind: op,
            x: Box::new(x),
            y: Box::new(y),
        }))
    }

    pub fn eq(x: NodeSpec, y: NodeSpec) -> Self {
        Self::new(SpecKind::Binary {
            kind: Op::Eq,
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    pub fn ne(x: NodeSpec, y: NodeSpec) -> Self {
        Self::new(SpecKind::Binary {
            kind: Op::Ne,
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    /// 単項演算。`op` が `ptr` / `ref` でなければエラー
    pub fn unary(op: Op, x: NodeSpec) -> CtreeResult<Self> {
        if !op.is_unary() {
            return Err(CtreeError::InvalidOp {
                op,
                expected: "unary operator",
            });
        }
        Ok(Self::new(SpecKind::Unary {
            kind: op,
            x: Box::new(x),
        }))
    }

    pub fn expr(expr: NodeSpec) -> Self {
        Self::new(SpecKind::Expr {
            expr: Box::new(expr),
        })
    }

    pub fn if_stmt(cond: NodeSpec, then: NodeSpec, otherwise: Option<NodeSpec>) -> Self {
        Self::new(SpecKind::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        })
    }

    pub fn block(stmts: Vec<NodeSpec>) -> Self {
        Self::new(SpecKind::Block { stmts })
    }

    pub fn ret(value: Option<NodeSpec>) -> Self {
        Self::new(SpecKind::Return {
            value: value.map(Box::new),
        })
    }

    pub fn empty() -> Self {
        Self::new(SpecKind::Empty)
    }
}
