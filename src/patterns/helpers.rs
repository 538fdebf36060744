//! よく使う組み合わせの略記

use super::Pattern;

/// 関数呼び出しだけからなる式文。外側の式文は内側のデバッグ設定を引き継ぐ
pub fn call_insn(call: Pattern) -> Pattern {
    let debug = call.options().debug.clone();
    Pattern::expr_ins(call).debug(debug)
}

/// 代入だけからなる式文
pub fn asg_insn(x: Pattern, y: Pattern) -> Pattern {
    Pattern::expr_ins(Pattern::asg(x, y))
}
