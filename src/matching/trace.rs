//! 照合失敗の診断トレース
//!
//! パターンの木と同じ形で失敗理由を記録する。成功した部分木は刈り取られ、
//! 実際に失敗した枝だけが残る。トレースは試行ごとに作られ、パターン側には何も残らない。

use std::fmt;

use crate::ctree::Ea;

/// アドレスを表示用に整形する
pub fn format_ea(ea: Option<Ea>) -> String {
    match ea {
        Some(ea) => format!("0x{:X}", ea),
        None => "<no address>".to_string(),
    }
}

/// 失敗したパターン1つ分の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNode {
    /// パターンの種類名（`CallPattern` など）
    pub pattern: &'static str,
    /// 失敗理由
    pub reason: String,
    /// 照合対象ノードのアドレス
    pub ea: Option<Ea>,
    /// 失敗した子パターン
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// インデント付きの行に展開する（1段につき空白2つ）
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines
    }

    fn render_into(&self, level: usize, lines: &mut Vec<String>) {
        let mut line = format!("{}{}: {}", "  ".repeat(level), self.pattern, self.reason);
        if let Some(ea) = self.ea {
            line.push_str(&format!(" at 0x{:X}", ea));
        }
        lines.push(line);
        for child in &self.children {
            child.render_into(level + 1, lines);
        }
    }

    /// この記録を根とする木の深さ
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TraceNode::depth).max().unwrap_or(0)
    }
}

impl fmt::Display for TraceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render().join("\n"))
    }
}

/// 1回の照合試行の診断情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTrace {
    /// 評価中のパターンごとの、失敗した子の記録
    frames: Vec<Vec<TraceNode>>,
    /// トップレベルの失敗
    failures: Vec<TraceNode>,
    /// デバッグ出力した行
    debug_lines: Vec<String>,
}

impl MatchTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最後のトップレベル照合の失敗木
    pub fn failure(&self) -> Option<&TraceNode> {
        self.failures.last()
    }

    pub fn failures(&self) -> &[TraceNode] {
        &self.failures
    }

    /// デバッグフィルタに一致したパターンが出力した行
    pub fn debug_lines(&self) -> &[String] {
        &self.debug_lines
    }

    /// 失敗木をインデント付きの行で返す
    pub fn render(&self) -> Vec<String> {
        self.failure().map(TraceNode::render).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.failures.clear();
        self.debug_lines.clear();
    }

    /// パターン評価の開始
    pub(crate) fn open(&mut self) {
        self.frames.push(Vec::new());
    }

    /// パターン評価の終了。評価中に記録された子の失敗を返す
    pub(crate) fn close(&mut self) -> Vec<TraceNode> {
        self.frames.pop().unwrap_or_default()
    }

    /// 失敗を親パターンの枠（なければトップレベル）へ記録する
    pub(crate) fn record(&mut self, failure: TraceNode) {
        match self.frames.last_mut() {
            Some(frame) => frame.push(failure),
            None => self.failures.push(failure),
        }
    }

    /// デバッグ行を出力する
    pub(crate) fn emit(&mut self, line: String) {
        log::info!("{}", line);
        self.debug_lines.push(line);
    }
}
