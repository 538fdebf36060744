//! デコンパイラが生成するctree（抽象構文木）のモデル
//!
//! ノードは `CTree` のアリーナに格納され、`NodeId` で参照される。
//! パターンは木を読むだけで、木の変更はパッチ（`scheme::AstPatch`）経由で行う。

mod display;
mod spec;
mod tree;

pub use display::{str2user, tag_remove};
pub use spec::{FuncInfo, NodeSpec, SpecKind, TreeSpec};
pub use tree::CTree;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;

/// バイナリ内のアドレス
pub type Ea = u64;

/// アリーナ内のノードへのハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// ノードの操作種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Op {
    // 式
    Num,
    Str,
    Obj,
    Var,
    MemPtr,
    MemRef,
    Call,
    Helper,
    Asg,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    LogAnd,
    LogOr,
    Ptr,
    Ref,

    // 文
    ExprIns,
    If,
    Block,
    Return,
    Empty,
}

impl Op {
    pub const ALL: [Op; 27] = [
        Op::Num,
        Op::Str,
        Op::Obj,
        Op::Var,
        Op::MemPtr,
        Op::MemRef,
        Op::Call,
        Op::Helper,
        Op::Asg,
        Op::Eq,
        Op::Ne,
        Op::Lt,
        Op::Gt,
        Op::Le,
        Op::Ge,
        Op::Add,
        Op::Sub,
        Op::Mul,
        Op::LogAnd,
        Op::LogOr,
        Op::Ptr,
        Op::Ref,
        Op::ExprIns,
        Op::If,
        Op::Block,
        Op::Return,
        Op::Empty,
    ];

    /// 短い名前（JSONやパターン指定で使う）
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Num => "num",
            Op::Str => "str",
            Op::Obj => "obj",
            Op::Var => "var",
            Op::MemPtr => "memptr",
            Op::MemRef => "memref",
            Op::Call => "call",
            Op::Helper => "helper",
            Op::Asg => "asg",
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Lt => "lt",
            Op::Gt => "gt",
            Op::Le => "le",
            Op::Ge => "ge",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::LogAnd => "land",
            Op::LogOr => "lor",
            Op::Ptr => "ptr",
            Op::Ref => "ref",
            Op::ExprIns => "expr",
            Op::If => "if",
            Op::Block => "block",
            Op::Return => "return",
            Op::Empty => "empty",
        }
    }

    /// 二項演算子の記号。二項演算でなければ `None`
    pub fn binary_symbol(self) -> Option<&'static str> {
        let sym = match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::LogAnd => "&&",
            Op::LogOr => "||",
            _ => return None,
        };
        Some(sym)
    }

    pub fn is_binary(self) -> bool {
        self.binary_symbol().is_some()
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Op::Ptr | Op::Ref)
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Op::ExprIns | Op::If | Op::Block | Op::Return | Op::Empty
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| PatternError::UnknownOp {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for Op {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Op> for String {
    fn from(op: Op) -> Self {
        op.as_str().to_string()
    }
}

/// ノードの型情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CType {
    Void,
    Int { size: u8, signed: bool },
    Ptr { to: Box<CType> },
    Struct { name: String },
    Func,
    Array { elem: Box<CType>, len: u64 },
}

impl CType {
    pub fn int(size: u8) -> Self {
        CType::Int { size, signed: true }
    }

    pub fn ptr(to: CType) -> Self {
        CType::Ptr { to: Box::new(to) }
    }

    pub fn structure(name: impl Into<String>) -> Self {
        CType::Struct { name: name.into() }
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, CType::Ptr { .. })
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, CType::Struct { .. })
    }

    /// ポインタが指す型。ポインタでなければ `None`
    pub fn pointed_object(&self) -> Option<&CType> {
        match self {
            CType::Ptr { to } => Some(to),
            _ => None,
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Int { size, signed } => {
                let bits = u32::from(*size) * 8;
                if *signed {
                    write!(f, "__int{}", bits)
                } else {
                    write!(f, "unsigned __int{}", bits)
                }
            }
            CType::Ptr { to } => write!(f, "{} *", to),
            CType::Struct { name } => write!(f, "{}", name),
            CType::Func => write!(f, "func"),
            CType::Array { elem, len } => write!(f, "{}[{}]", elem, len),
        }
    }
}

/// ノードの中身。子ノードは `NodeId` で持つ
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Num { value: u64 },
    Str { value: String },
    Obj { obj_ea: Ea, name: Option<String> },
    Var { index: u32, name: Option<String> },
    MemPtr { x: NodeId, m: u32 },
    MemRef { x: NodeId, m: u32 },
    Call { x: NodeId, args: Vec<NodeId> },
    Helper { name: String },
    Asg { x: NodeId, y: NodeId },
    Binary { op: Op, x: NodeId, y: NodeId },
    Unary { op: Op, x: NodeId },
    ExprIns { expr: NodeId },
    If { cond: NodeId, then: NodeId, otherwise: Option<NodeId> },
    Block { stmts: Vec<NodeId> },
    Return { value: Option<NodeId> },
    Empty,
}

impl NodeData {
    pub fn op(&self) -> Op {
        match self {
            NodeData::Num { .. } => Op::Num,
            NodeData::Str { .. } => Op::Str,
            NodeData::Obj { .. } => Op::Obj,
            NodeData::Var { .. } => Op::Var,
            NodeData::MemPtr { .. } => Op::MemPtr,
            NodeData::MemRef { .. } => Op::MemRef,
            NodeData::Call { .. } => Op::Call,
            NodeData::Helper { .. } => Op::Helper,
            NodeData::Asg { .. } => Op::Asg,
            NodeData::Binary { op, .. } | NodeData::Unary { op, .. } => *op,
            NodeData::ExprIns { .. } => Op::ExprIns,
            NodeData::If { .. } => Op::If,
            NodeData::Block { .. } => Op::Block,
            NodeData::Return { .. } => Op::Return,
            NodeData::Empty => Op::Empty,
        }
    }

    /// 構造上の子ノードを順番に返す
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeData::Num { .. }
            | NodeData::Str { .. }
            | NodeData::Obj { .. }
            | NodeData::Var { .. }
            | NodeData::Helper { .. }
            | NodeData::Empty => Vec::new(),
            NodeData::MemPtr { x, .. } | NodeData::MemRef { x, .. } | NodeData::Unary { x, .. } => {
                vec![*x]
            }
            NodeData::Call { x, args } => std::iter::once(*x).chain(args.iter().copied()).collect(),
            NodeData::Asg { x, y } | NodeData::Binary { x, y, .. } => vec![*x, *y],
            NodeData::ExprIns { expr } => vec![*expr],
            NodeData::If {
                cond,
                then,
                otherwise,
            } => {
                let mut kids = vec![*cond, *then];
                kids.extend(otherwise.iter().copied());
                kids
            }
            NodeData::Block { stmts } => stmts.clone(),
            NodeData::Return { value } => value.iter().copied().collect(),
        }
    }

    /// 子ノードへの参照を書き換える。置き換えが起きたら `true`
    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let mut slots: Vec<&mut NodeId> = match self {
            NodeData::MemPtr { x, .. } | NodeData::MemRef { x, .. } | NodeData::Unary { x, .. } => {
                vec![x]
            }
            NodeData::Call { x, args } => std::iter::once(x).chain(args.iter_mut()).collect(),
            NodeData::Asg { x, y } | NodeData::Binary { x, y, .. } => vec![x, y],
            NodeData::ExprIns { expr } => vec![expr],
            NodeData::If {
                cond,
                then,
                otherwise,
            } => {
                let mut slots = vec![cond, then];
                slots.extend(otherwise.as_mut());
                slots
            }
            NodeData::Block { stmts } => stmts.iter_mut().collect(),
            NodeData::Return { value } => value.as_mut().into_iter().collect(),
            _ => Vec::new(),
        };

        let mut replaced = false;
        for slot in slots.iter_mut() {
            if **slot == old {
                **slot = new;
                replaced = true;
            }
        }
        replaced
    }
}

/// ctreeのノード
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub ea: Option<Ea>,
    pub ty: Option<CType>,
    pub data: NodeData,
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn op(&self) -> Op {
        self.data.op()
    }

    pub fn is_statement(&self) -> bool {
        self.op().is_statement()
    }

    /// 表示用の名前（オブジェクト参照なら名前、なければダミー名）
    pub fn printable_name(&self) -> Option<String> {
        match &self.data {
            NodeData::Obj { obj_ea, name } => Some(match name {
                Some(name) => name.clone(),
                None => format!("unk_{:X}", obj_ea),
            }),
            NodeData::Helper { name } => Some(name.clone()),
            _ => None,
        }
    }
}
