//! 照合の実行時状態
//!
//! 1回の照合試行ごとに作り直す束縛環境（`MatchContext`）と、
//! 失敗理由の木（`MatchTrace`）を提供する。

pub mod context;
pub mod trace;

pub use context::MatchContext;
pub use trace::{format_ea, MatchTrace, TraceNode};
