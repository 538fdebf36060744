//! アリーナ形式のctree

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use super::spec::{FuncInfo, NodeSpec, SpecKind, TreeSpec};
use super::{Ea, Node, NodeData, NodeId, Op};
use crate::error::{CtreeError, CtreeResult, MatchResult};

/// 1関数分のctree
///
/// ノードは削除されない。置き換えられたノードは親から切り離されるだけなので、
/// 一度取得した `NodeId` は木の書き換え後も有効なまま残る。
#[derive(Debug, Clone)]
pub struct CTree {
    name: String,
    ea: Ea,
    nodes: Vec<Node>,
    root: NodeId,
    functions: IndexMap<Ea, FuncInfo>,
}

impl CTree {
    /// 入れ子の記述からアリーナを構築
    pub fn from_spec(spec: TreeSpec) -> CtreeResult<Self> {
        let mut tree = Self {
            name: spec.name,
            ea: spec.ea,
            nodes: Vec::new(),
            root: NodeId(0),
            functions: spec
                .functions
                .into_iter()
                .map(|func| (func.ea, func))
                .collect(),
        };
        tree.root = tree.insert(spec.body, None)?;
        Ok(tree)
    }

    /// 本体だけから木を作る（テストや小さな例向け）
    pub fn with_body(name: impl Into<String>, body: NodeSpec) -> CtreeResult<Self> {
        Self::from_spec(TreeSpec {
            name: name.into(),
            ea: 0,
            functions: Vec::new(),
            body,
        })
    }

    pub fn from_json(json: &str) -> CtreeResult<Self> {
        let spec: TreeSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    /// JSONファイルから読み込む
    pub fn from_path(path: impl AsRef<Path>) -> MatchResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ea(&self) -> Ea {
        self.ea
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// ノードを可変で取得。照合済みノードをその場で書き換える場合に使う
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn node(&self, id: NodeId) -> CtreeResult<&Node> {
        self.get(id).ok_or(CtreeError::UnknownNode { id })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.data.children())
            .unwrap_or_default()
    }

    /// ルートから到達できるノードを前順で返す
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.get(id).is_none() {
                continue;
            }
            order.push(id);
            for child in self.children(id).into_iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// 文を前順で返す
    pub fn statements(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(Node::is_statement))
            .collect()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncInfo> {
        self.functions.values()
    }

    pub fn function(&self, ea: Ea) -> Option<&FuncInfo> {
        self.functions.get(&ea)
    }

    /// サンク関数なら飛び先を返す
    pub fn thunk_target(&self, ea: Ea) -> Option<Ea> {
        self.function(ea).and_then(|func| func.thunk_target)
    }

    /// 記述からノードを追加する（親は指定しない）
    pub fn add(&mut self, spec: NodeSpec) -> CtreeResult<NodeId> {
        self.insert(spec, None)
    }

    /// `old` を親から切り離し、`new` をその位置に差し込む
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> CtreeResult<()> {
        self.node(new)?;
        if old == self.root {
            self.root = new;
            self.set_parent(new, None);
            self.set_parent(old, None);
            return Ok(());
        }

        let parent = self
            .node(old)?
            .parent
            .ok_or(CtreeError::DetachedNode { id: old })?;
        let replaced = self
            .get_mut(parent)
            .map(|node| node.data.replace_child(old, new))
            .unwrap_or(false);
        if !replaced {
            return Err(CtreeError::DetachedNode { id: old });
        }
        self.set_parent(new, Some(parent));
        self.set_parent(old, None);
        Ok(())
    }

    /// 呼び出しの対象オブジェクトのアドレスを書き換える
    pub fn redirect_call(&mut self, call: NodeId, target: Ea) -> CtreeResult<()> {
        let callee = match &self.node(call)?.data {
            NodeData::Call { x, .. } => *x,
            other => {
                return Err(CtreeError::InvalidOp {
                    op: other.op(),
                    expected: "call",
                })
            }
        };
        match self.get_mut(callee).map(|node| &mut node.data) {
            Some(NodeData::Obj { obj_ea, name }) => {
                *obj_ea = target;
                *name = None;
            }
            Some(other) => {
                return Err(CtreeError::InvalidOp {
                    op: other.op(),
                    expected: "obj",
                })
            }
            None => return Err(CtreeError::UnknownNode { id: callee }),
        }
        if let Some(func) = self.function(target) {
            let name = func.name.clone();
            if let Some(NodeData::Obj { name: slot, .. }) =
                self.get_mut(callee).map(|node| &mut node.data)
            {
                *slot = Some(name);
            }
        }
        Ok(())
    }

    /// 文を空文にする
    pub fn remove_statement(&mut self, stmt: NodeId) -> CtreeResult<()> {
        let node = self
            .get_mut(stmt)
            .ok_or(CtreeError::UnknownNode { id: stmt })?;
        if !node.is_statement() {
            return Err(CtreeError::NotAStatement { id: stmt });
        }
        let children = node.data.children();
        node.data = NodeData::Empty;
        for child in children {
            self.set_parent(child, None);
        }
        Ok(())
    }

    /// 現在の木を入れ子の記述に戻す（JSON出力用）
    pub fn to_spec(&self) -> CtreeResult<TreeSpec> {
        Ok(TreeSpec {
            name: self.name.clone(),
            ea: self.ea,
            functions: self.functions.values().cloned().collect(),
            body: self.node_spec(self.root)?,
        })
    }

    fn node_spec(&self, id: NodeId) -> CtreeResult<NodeSpec> {
        let node = self.node(id)?;
        let boxed = |child: NodeId| self.node_spec(child).map(Box::new);
        let kind = match &node.data {
            NodeData::Num { value } => SpecKind::Num { value: *value },
            NodeData::Str { value } => SpecKind::Str {
                value: value.clone(),
            },
            NodeData::Obj { obj_ea, name } => SpecKind::Obj {
                obj_ea: *obj_ea,
                name: name.clone(),
            },
            NodeData::Var { index, name } => SpecKind::Var {
                index: *index,
                name: name.clone(),
            },
            NodeData::MemPtr { x, m } => SpecKind::MemPtr {
                x: boxed(*x)?,
                m: *m,
            },
            NodeData::MemRef { x, m } => SpecKind::MemRef {
                x: boxed(*x)?,
                m: *m,
            },
            NodeData::Call { x, args } => SpecKind::Call {
                x: boxed(*x)?,
                args: args
                    .iter()
                    .map(|arg| self.node_spec(*arg))
                    .collect::<CtreeResult<Vec<_>>>()?,
            },
            NodeData::Helper { name } => SpecKind::Helper { name: name.clone() },
            NodeData::Asg { x, y } => SpecKind::Asg {
                x: boxed(*x)?,
                y: boxed(*y)?,
            },
            NodeData::Binary { op, x, y } => SpecKind::Binary {
                kind: *op,
                x: boxed(*x)?,
                y: boxed(*y)?,
            },
            NodeData::Unary { op, x } => SpecKind::Unary {
                kind: *op,
                x: boxed(*x)?,
            },
            NodeData::ExprIns { expr } => SpecKind::Expr {
                expr: boxed(*expr)?,
            },
            NodeData::If {
                cond,
                then,
                otherwise,
            } => SpecKind::If {
                cond: boxed(*cond)?,
                then: boxed(*then)?,
                otherwise: otherwise.map(boxed).transpose()?,
            },
            NodeData::Block { stmts } => SpecKind::Block {
                stmts: stmts
                    .iter()
                    .map(|stmt| self.node_spec(*stmt))
                    .collect::<CtreeResult<Vec<_>>>()?,
            },
            NodeData::Return { value } => SpecKind::Return {
                value: value.map(boxed).transpose()?,
            },
            NodeData::Empty => SpecKind::Empty,
        };
        Ok(NodeSpec {
            ea: node.ea,
            ty: node.ty.clone(),
            kind,
        })
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
    }

    fn insert(&mut self, spec: NodeSpec, parent: Option<NodeId>) -> CtreeResult<NodeId> {
        let id = NodeId(self.nodes.len() as u32);
        // 子の親IDを決めるため、先に枠だけ確保する
        self.nodes.push(Node {
            ea: spec.ea,
            ty: spec.ty,
            data: NodeData::Empty,
            parent,
        });

        let data = match spec.kind {
            SpecKind::Num { value } => NodeData::Num { value },
            SpecKind::Str { value } => NodeData::Str { value },
            SpecKind::Obj { obj_ea, name } => NodeData::Obj { obj_ea, name },
            SpecKind::Var { index, name } => NodeData::Var { index, name },
            SpecKind::MemPtr { x, m } => NodeData::MemPtr {
                x: self.insert(*x, Some(id))?,
                m,
            },
            SpecKind::MemRef { x, m } => NodeData::MemRef {
                x: self.insert(*x, Some(id))?,
                m,
            },
            SpecKind::Call { x, args } => {
                let x = self.insert(*x, Some(id))?;
                let args = args
                    .into_iter()
                    .map(|arg| self.insert(arg, Some(id)))
                    .collect::<CtreeResult<Vec<_>>>()?;
                NodeData::Call { x, args }
            }
            SpecKind::Helper { name } => NodeData::Helper { name },
            SpecKind::Asg { x, y } => NodeData::Asg {
                x: self.insert(*x, Some(id))?,
                y: self.insert(*y, Some(id))?,
            },
            SpecKind::Binary { kind, x, y } => {
                if !kind.is_binary() {
                    return Err(CtreeError::InvalidOp {
                        op: kind,
                        expected: "binary operator",
                    });
                }
                NodeData::Binary {
                    op: kind,
                    x: self.insert(*x, Some(id))?,
                    y: self.insert(*y, Some(id))?,
                }
            }
            SpecKind::Unary { kind, x } => {
                if !kind.is_unary() {
                    return Err(CtreeError::InvalidOp {
                        op: kind,
                        expected: "unary operator",
                    });
                }
                NodeData::Unary {
                    op: kind,
                    x: self.insert(*x, Some(id))?,
                }
            }
            SpecKind::Expr { expr } => NodeData::ExprIns {
                expr: self.insert_expr(*expr, id)?,
            },
            SpecKind::If {
                cond,
                then,
                otherwise,
            } => NodeData::If {
                cond: self.insert_expr(*cond, id)?,
                then: self.insert_stmt(*then, id)?,
                otherwise: match otherwise {
                    Some(stmt) => Some(self.insert_stmt(*stmt, id)?),
                    None => None,
                },
            },
            SpecKind::Block { stmts } => NodeData::Block {
                stmts: stmts
                    .into_iter()
                    .map(|stmt| self.insert_stmt(stmt, id))
                    .collect::<CtreeResult<Vec<_>>>()?,
            },
            SpecKind::Return { value } => NodeData::Return {
                value: match value {
                    Some(expr) => Some(self.insert_expr(*expr, id)?),
                    None => None,
                },
            },
            SpecKind::Empty => NodeData::Empty,
        };

        self.nodes[id.index()].data = data;
        Ok(id)
    }

    fn insert_expr(&mut self, spec: NodeSpec, parent: NodeId) -> CtreeResult<NodeId> {
        let id = self.insert(spec, Some(parent))?;
        match self.node(id)?.op() {
            op if op.is_statement() => Err(CtreeError::InvalidOp {
                op,
                expected: "expression",
            }),
            _ => Ok(id),
        }
    }

    fn insert_stmt(&mut self, spec: NodeSpec, parent: NodeId) -> CtreeResult<NodeId> {
        let id = self.insert(spec, Some(parent))?;
        if self.node(id)?.is_statement() {
            Ok(id)
        } else {
            Err(CtreeError::NotAStatement { id })
        }
    }

    /// 親ブロックとその中での位置
    pub fn block_position(&self, stmt: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(stmt)?;
        match &self.get(parent)?.data {
            NodeData::Block { stmts } => stmts
                .iter()
                .position(|id| *id == stmt)
                .map(|index| (parent, index)),
            _ => None,
        }
    }

    /// ブロックの文を返す。ブロックでなければ `None`
    pub fn block_statements(&self, block: NodeId) -> Option<&[NodeId]> {
        match &self.get(block)?.data {
            NodeData::Block { stmts } => Some(stmts),
            _ => None,
        }
    }

    /// ノードがルートから到達可能か（置き換えで切り離されていないか）
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        // 親の連鎖はノード数を超えない
        for _ in 0..=self.nodes.len() {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// ノードが指定の操作種別か
    pub fn is_op(&self, id: NodeId, op: Op) -> bool {
        self.get(id).is_some_and(|node| node.op() == op)
    }
}
