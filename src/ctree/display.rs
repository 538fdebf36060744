//! ctreeの擬似Cによる表示

use super::{CTree, NodeData, NodeId};

const COLOR_ON: char = '\x01';
const COLOR_OFF: char = '\x02';
const COLOR_ESC: char = '\x03';
const COLOR_INV: char = '\x04';

/// 逆アセンブラの色タグを取り除く
pub fn tag_remove(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            // タグの直後の1文字は色コード
            COLOR_ON | COLOR_OFF => {
                chars.next();
            }
            // エスケープの直後の1文字はそのまま出力する
            COLOR_ESC => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            COLOR_INV => {}
            _ => out.push(c),
        }
    }
    out
}

/// 制御文字をエスケープしてユーザー向けの文字列にする
pub fn str2user(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

impl CTree {
    /// ノードを1行の擬似Cで表す
    pub fn dstr(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return "<unknown>".to_string();
        };

        match &node.data {
            NodeData::Num { value } => {
                if *value < 10 {
                    value.to_string()
                } else {
                    format!("{} /* 0x{:X} */", value, value)
                }
            }
            NodeData::Str { value } => format!("\"{}\"", str2user(value)),
            NodeData::Obj { .. } | NodeData::Helper { .. } => {
                node.printable_name().unwrap_or_default()
            }
            NodeData::Var { index, name } => match name {
                Some(name) => name.clone(),
                None => format!("v{}", index),
            },
            NodeData::MemPtr { x, m } => format!("{}->field_{:X}", self.dstr(*x), m),
            NodeData::MemRef { x, m } => format!("{}.field_{:X}", self.dstr(*x), m),
            NodeData::Call { x, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.dstr(*arg)).collect();
                format!("{}({})", self.dstr(*x), args.join(", "))
            }
            NodeData::Asg { x, y } => format!("{} = {}", self.dstr(*x), self.dstr(*y)),
            NodeData::Binary { op, x, y } => format!(
                "{} {} {}",
                self.dstr(*x),
                op.binary_symbol().unwrap_or("?"),
                self.dstr(*y)
            ),
            NodeData::Unary { op, x } => {
                let sym = if *op == super::Op::Ptr { "*" } else { "&" };
                format!("{}{}", sym, self.dstr(*x))
            }
            NodeData::ExprIns { expr } => format!("{};", self.dstr(*expr)),
            NodeData::If { cond, .. } => format!("if ( {} ) ...", self.dstr(*cond)),
            NodeData::Block { stmts } => format!("{{ /* {} statements */ }}", stmts.len()),
            NodeData::Return { value } => match value {
                Some(value) => format!("return {};", self.dstr(*value)),
                None => "return;".to_string(),
            },
            NodeData::Empty => ";".to_string(),
        }
    }

    /// 関数全体を複数行の擬似Cで表す
    pub fn render(&self) -> String {
        let mut out = format!("// {} @ 0x{:X}\n", self.name(), self.ea());
        self.render_stmt(self.root(), 0, &mut out);
        out
    }

    fn render_stmt(&self, id: NodeId, level: usize, out: &mut String) {
        let indent = "  ".repeat(level);
        let Some(node) = self.get(id) else {
            return;
        };

        match &node.data {
            NodeData::Block { stmts } => {
                out.push_str(&format!("{}{{\n", indent));
                for stmt in stmts {
                    self.render_stmt(*stmt, level + 1, out);
                }
                out.push_str(&format!("{}}}\n", indent));
            }
            NodeData::If {
                cond,
                then,
                otherwise,
            } => {
                out.push_str(&format!("{}if ( {} )\n", indent, self.dstr(*cond)));
                self.render_stmt(*then, level + 1, out);
                if let Some(otherwise) = otherwise {
                    out.push_str(&format!("{}else\n", indent));
                    self.render_stmt(*otherwise, level + 1, out);
                }
            }
            _ => out.push_str(&format!("{}{}\n", indent, self.dstr(id))),
        }
    }
}
