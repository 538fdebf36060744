//! パターンの定義
//!
//! パターンはctreeの形を宣言的に記述する。構築後は不変で、同じパターンの木を
//! 多数の候補ノードに対して繰り返し照合できる。照合の本体は `base` モジュールの
//! `Pattern::check` にある。

mod base;
mod combinators;
mod expressions;
mod helpers;
mod leaves;
mod statements;

pub use helpers::{asg_insn, call_insn};

use std::collections::BTreeSet;
use std::fmt;

use crate::ctree::{CType, Ea, Op};
use crate::error::{PatternError, PatternResult};

/// デフォルトの文字列最小長
pub const DEFAULT_STRING_MIN_LEN: usize = 5;

/// デバッグ出力の対象を決めるフィルタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DebugFilter {
    #[default]
    Off,
    /// 常に出力
    Always,
    /// 特定アドレスのノードのみ
    At(Ea),
    /// アドレスの集合に含まれるノードのみ
    AnyOf(BTreeSet<Ea>),
}

impl DebugFilter {
    pub fn accepts(&self, ea: Option<Ea>) -> bool {
        match self {
            DebugFilter::Off => false,
            DebugFilter::Always => true,
            DebugFilter::At(target) => ea == Some(*target),
            DebugFilter::AnyOf(set) => ea.is_some_and(|ea| set.contains(&ea)),
        }
    }
}

impl From<bool> for DebugFilter {
    fn from(enabled: bool) -> Self {
        if enabled {
            DebugFilter::Always
        } else {
            DebugFilter::Off
        }
    }
}

impl From<Ea> for DebugFilter {
    fn from(ea: Ea) -> Self {
        DebugFilter::At(ea)
    }
}

impl FromIterator<Ea> for DebugFilter {
    fn from_iter<I: IntoIterator<Item = Ea>>(iter: I) -> Self {
        DebugFilter::AnyOf(iter.into_iter().collect())
    }
}

/// 全パターン共通の設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternOptions {
    /// 照合に成功したノードを束縛する名前
    pub bind_name: Option<String>,
    /// 期待する操作種別。`None` なら検査しない
    pub check_op: Option<Op>,
    pub debug: DebugFilter,
}

/// 構造体型の制約。型そのもの、または型の文字列表現で指定する
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructConstraint {
    Type(CType),
    Name(String),
}

impl StructConstraint {
    pub fn accepts(&self, ty: &CType) -> bool {
        match self {
            StructConstraint::Type(expected) => expected == ty,
            StructConstraint::Name(name) => *name == ty.to_string(),
        }
    }
}

impl fmt::Display for StructConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructConstraint::Type(ty) => write!(f, "{}", ty),
            StructConstraint::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<CType> for StructConstraint {
    fn from(ty: CType) -> Self {
        StructConstraint::Type(ty)
    }
}

impl From<&str> for StructConstraint {
    fn from(name: &str) -> Self {
        StructConstraint::Name(name.to_string())
    }
}

impl From<String> for StructConstraint {
    fn from(name: String) -> Self {
        StructConstraint::Name(name)
    }
}

/// パターンの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    /// 任意のノード。`may_be_absent` なら存在しないノードにも一致する
    Any { may_be_absent: bool },
    /// 数値またはオブジェクト参照（整数として解釈できる式）
    Value { value: Option<u64> },
    /// 文字列リテラルまたは文字列として表示できるオブジェクト参照
    String {
        value: Option<String>,
        min_len: usize,
    },
    /// オブジェクト参照（名前・アドレスで指定）
    Object {
        name: Option<String>,
        ea: Option<Ea>,
    },
    /// ローカル変数
    Variable { index: Option<u32> },
    /// 構造体メンバーへのアクセス（`->` または `.`）
    StructFieldAccess {
        struct_type: Option<StructConstraint>,
        member_offset: Option<u32>,
    },
    /// 関数呼び出し
    Call {
        callee: Option<Box<Pattern>>,
        args: Vec<Pattern>,
        ignore_arguments: bool,
    },
    /// 代入式
    Assignment { x: Box<Pattern>, y: Box<Pattern> },
    /// 二項演算式
    Binary {
        op: Op,
        x: Box<Pattern>,
        y: Box<Pattern>,
    },
    /// 単項演算式（`*x`, `&x`）
    Unary { op: Op, x: Box<Pattern> },
    /// 式文
    ExpressionStatement { expr: Box<Pattern> },
    /// if文
    If {
        cond: Box<Pattern>,
        then: Option<Box<Pattern>>,
        otherwise: Option<Box<Pattern>>,
    },
    /// return文
    Return { value: Option<Box<Pattern>> },
    /// 同じノードにすべてのパターンが一致
    And(Vec<Pattern>),
    /// 宣言順に試し、最初に一致したものを採用
    Or(Vec<Pattern>),
    /// 内側のパターンが一致しないときに一致
    Not(Box<Pattern>),
    /// 連続する兄弟文の並び
    Sequence {
        patterns: Vec<Pattern>,
        skip_missing: bool,
    },
}

/// パターン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    options: PatternOptions,
    kind: PatternKind,
}

impl Pattern {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            options: PatternOptions::default(),
            kind,
        }
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    // ----- 共通設定 -----

    /// 照合に成功したノードを `name` で束縛する
    pub fn bind(mut self, name: impl Into<String>) -> Self {
        self.options.bind_name = Some(name.into());
        self
    }

    /// 操作種別の検査を追加する
    pub fn check_op(mut self, op: Op) -> Self {
        self.options.check_op = Some(op);
        self
    }

    /// 操作種別を名前で指定する。未知の名前は構築時エラー
    pub fn check_op_name(self, name: &str) -> PatternResult<Self> {
        let op = name.parse::<Op>()?;
        Ok(self.check_op(op))
    }

    pub fn debug(mut self, filter: impl Into<DebugFilter>) -> Self {
        self.options.debug = filter.into();
        self
    }

    // ----- 葉パターン -----

    pub fn any() -> Self {
        Self::new(PatternKind::Any {
            may_be_absent: false,
        })
    }

    /// 存在しないノード（省略可能な子）にも一致する
    pub fn any_or_absent() -> Self {
        Self::new(PatternKind::Any {
            may_be_absent: true,
        })
    }

    /// 任意の数値・オブジェクト参照
    pub fn number() -> Self {
        Self::new(PatternKind::Value { value: None })
    }

    /// 値が `value` に等しい数値・オブジェクト参照
    pub fn value(value: u64) -> Self {
        Self::new(PatternKind::Value { value: Some(value) })
    }

    /// 最小長 `DEFAULT_STRING_MIN_LEN` 以上の任意の文字列
    pub fn string() -> Self {
        Self::new(PatternKind::String {
            value: None,
            min_len: DEFAULT_STRING_MIN_LEN,
        })
    }

    pub fn string_min_len(min_len: usize) -> PatternResult<Self> {
        if min_len == 0 {
            return Err(PatternError::InvalidMinLen { min_len });
        }
        Ok(Self::new(PatternKind::String {
            value: None,
            min_len,
        }))
    }

    pub fn string_eq(value: impl Into<String>) -> Self {
        Self::new(PatternKind::String {
            value: Some(value.into()),
            min_len: DEFAULT_STRING_MIN_LEN,
        })
    }

    pub fn object() -> Self {
        Self::new(PatternKind::Object {
            name: None,
            ea: None,
        })
    }

    pub fn object_named(name: impl Into<String>) -> Self {
        Self::new(PatternKind::Object {
            name: Some(name.into()),
            ea: None,
        })
    }

    pub fn object_at(ea: Ea) -> Self {
        Self::new(PatternKind::Object {
            name: None,
            ea: Some(ea),
        })
    }

    pub fn var() -> Self {
        Self::new(PatternKind::Variable { index: None })
    }

    pub fn var_index(index: u32) -> Self {
        Self::new(PatternKind::Variable { index: Some(index) })
    }

    /// 構造体メンバーアクセス。指定しない制約は常に満たされる
    pub fn struct_field(struct_type: Option<StructConstraint>, member_offset: Option<u32>) -> Self {
        Self::new(PatternKind::StructFieldAccess {
            struct_type,
            member_offset,
        })
    }

    // ----- 式パターン -----

    /// 関数呼び出し。引数の数はパターンの数と一致しなければならない
    pub fn call(callee: Option<Pattern>, args: Vec<Pattern>) -> Self {
        Self::new(PatternKind::Call {
            callee: callee.map(Box::new),
            args,
            ignore_arguments: false,
        })
    }

    /// 引数を検査しない関数呼び出し
    pub fn call_ignoring_args(callee: Option<Pattern>) -> Self {
        Self::new(PatternKind::Call {
            callee: callee.map(Box::new),
            args: Vec::new(),
            ignore_arguments: true,
        })
    }

    pub fn asg(x: Pattern, y: Pattern) -> Self {
        Self::new(PatternKind::Assignment {
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    pub fn binary(op: Op, x: Pattern, y: Pattern) -> PatternResult<Self> {
        if !op.is_binary() {
            return Err(PatternError::NotBinaryOp { op });
        }
        Ok(Self::new(PatternKind::Binary {
            op,
            x: Box::new(x),
            y: Box::new(y),
        }))
    }

    pub fn eq(x: Pattern, y: Pattern) -> Self {
        Self::new(PatternKind::Binary {
            op: Op::Eq,
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    pub fn ne(x: Pattern, y: Pattern) -> Self {
        Self::new(PatternKind::Binary {
            op: Op::Ne,
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    pub fn unary(op: Op, x: Pattern) -> PatternResult<Self> {
        if !op.is_unary() {
            return Err(PatternError::NotUnaryOp { op });
        }
        Ok(Self::new(PatternKind::Unary {
            op,
            x: Box::new(x),
        }))
    }

    // ----- 文パターン -----

    pub fn expr_ins(expr: Pattern) -> Self {
        Self::new(PatternKind::ExpressionStatement {
            expr: Box::new(expr),
        })
    }

    pub fn if_stmt(cond: Pattern, then: Option<Pattern>, otherwise: Option<Pattern>) -> Self {
        Self::new(PatternKind::If {
            cond: Box::new(cond),
            then: then.map(Box::new),
            otherwise: otherwise.map(Box::new),
        })
    }

    pub fn ret(value: Option<Pattern>) -> Self {
        Self::new(PatternKind::Return {
            value: value.map(Box::new),
        })
    }

    /// 候補の文から始まる兄弟文の並び。後続の文が残っていてもよい
    pub fn seq(patterns: Vec<Pattern>) -> PatternResult<Self> {
        Self::sequence(patterns, true)
    }

    /// 候補の文からブロックの終わりまでがちょうど並びに一致する
    pub fn seq_exact(patterns: Vec<Pattern>) -> PatternResult<Self> {
        Self::sequence(patterns, false)
    }

    fn sequence(patterns: Vec<Pattern>, skip_missing: bool) -> PatternResult<Self> {
        if patterns.is_empty() {
            return Err(PatternError::EmptyCombinator {
                combinator: "SequencePattern",
            });
        }
        Ok(Self::new(PatternKind::Sequence {
            patterns,
            skip_missing,
        }))
    }

    // ----- 組み合わせ -----

    pub fn and(patterns: Vec<Pattern>) -> PatternResult<Self> {
        if patterns.is_empty() {
            return Err(PatternError::EmptyCombinator {
                combinator: "AndPattern",
            });
        }
        Ok(Self::new(PatternKind::And(patterns)))
    }

    pub fn or(patterns: Vec<Pattern>) -> PatternResult<Self> {
        if patterns.is_empty() {
            return Err(PatternError::EmptyCombinator {
                combinator: "OrPattern",
            });
        }
        Ok(Self::new(PatternKind::Or(patterns)))
    }

    /// 否定。束縛名を設定しても束縛は行われない
    pub fn not(pattern: Pattern) -> Self {
        Self::new(PatternKind::Not(Box::new(pattern)))
    }

    // ----- 木としての操作 -----

    /// 診断で使う種類名
    pub fn variant_name(&self) -> &'static str {
        match &self.kind {
            PatternKind::Any { .. } => "AnyPattern",
            PatternKind::Value { .. } => "ValuePattern",
            PatternKind::String { .. } => "StringPattern",
            PatternKind::Object { .. } => "ObjectPattern",
            PatternKind::Variable { .. } => "VariablePattern",
            PatternKind::StructFieldAccess { .. } => "StructFieldAccessPattern",
            PatternKind::Call { .. } => "CallPattern",
            PatternKind::Assignment { .. } => "AssignmentPattern",
            PatternKind::Binary { .. } => "BinaryPattern",
            PatternKind::Unary { .. } => "UnaryPattern",
            PatternKind::ExpressionStatement { .. } => "ExpressionStatementPattern",
            PatternKind::If { .. } => "IfPattern",
            PatternKind::Return { .. } => "ReturnPattern",
            PatternKind::And(_) => "AndPattern",
            PatternKind::Or(_) => "OrPattern",
            PatternKind::Not(_) => "NotPattern",
            PatternKind::Sequence { .. } => "SequencePattern",
        }
    }

    /// 子パターンを宣言順に返す
    pub fn children(&self) -> Vec<&Pattern> {
        match &self.kind {
            PatternKind::Any { .. }
            | PatternKind::Value { .. }
            | PatternKind::String { .. }
            | PatternKind::Object { .. }
            | PatternKind::Variable { .. }
            | PatternKind::StructFieldAccess { .. } => Vec::new(),
            PatternKind::Call { callee, args, .. } => {
                callee.as_deref().into_iter().chain(args.iter()).collect()
            }
            PatternKind::Assignment { x, y } | PatternKind::Binary { x, y, .. } => {
                vec![&**x, &**y]
            }
            PatternKind::Unary { x, .. } => vec![&**x],
            PatternKind::ExpressionStatement { expr } => vec![&**expr],
            PatternKind::If {
                cond,
                then,
                otherwise,
            } => std::iter::once(&**cond)
                .chain(then.as_deref())
                .chain(otherwise.as_deref())
                .collect(),
            PatternKind::Return { value } => value.as_deref().into_iter().collect(),
            PatternKind::And(patterns)
            | PatternKind::Or(patterns)
            | PatternKind::Sequence { patterns, .. } => patterns.iter().collect(),
            PatternKind::Not(inner) => vec![&**inner],
        }
    }

    /// 照合成功時に束縛する名前。否定パターンは束縛しない
    pub(crate) fn binding_name(&self) -> Option<&str> {
        match self.kind {
            PatternKind::Not(_) => None,
            _ => self.options.bind_name.as_deref(),
        }
    }

    /// パターンの木に含まれる束縛名を前順で集める
    pub fn bind_names(&self) -> Vec<&str> {
        // 否定の内側は束縛されない
        if matches!(self.kind, PatternKind::Not(_)) {
            return Vec::new();
        }
        let mut names: Vec<&str> = self.binding_name().into_iter().collect();
        for child in self.children() {
            names.extend(child.bind_names());
        }
        names
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variant_name())
    }
}

impl Pattern {
    /// パターンの木をインデント付きで表示する
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(0, &mut out);
        out
    }

    fn describe_into(&self, level: usize, out: &mut String) {
        out.push_str(&"  ".repeat(level));
        out.push_str(self.variant_name());

        let mut attrs = Vec::new();
        match &self.kind {
            PatternKind::Value { value: Some(value) } => attrs.push(format!("value={}", value)),
            PatternKind::String { value: Some(value), .. } => {
                attrs.push(format!("value={:?}", value))
            }
            PatternKind::String { value: None, min_len } => {
                attrs.push(format!("min_len={}", min_len))
            }
            PatternKind::Object { name, ea } => {
                if let Some(name) = name {
                    attrs.push(format!("name={}", name));
                }
                if let Some(ea) = ea {
                    attrs.push(format!("ea=0x{:X}", ea));
                }
            }
            PatternKind::Call {
                ignore_arguments: true,
                ..
            } => attrs.push("ignore_arguments".to_string()),
            PatternKind::Binary { op, .. } | PatternKind::Unary { op, .. } => {
                attrs.push(format!("op={}", op))
            }
            _ => {}
        }
        if let Some(name) = &self.options.bind_name {
            attrs.push(format!("bind={}", name));
        }
        if let Some(op) = self.options.check_op {
            attrs.push(format!("check_op={}", op));
        }
        if !attrs.is_empty() {
            out.push_str(&format!("({})", attrs.join(", ")));
        }
        out.push('\n');

        for child in self.children() {
            child.describe_into(level + 1, out);
        }
    }
}
