//! 組み込みスキーム

mod terminal_debug;
mod thunk_nuker;

pub use terminal_debug::TerminalDebug;
pub use thunk_nuker::ThunkNuker;

use super::Scheme;

/// 登録する組み込みスキームの一覧（登録順）
pub fn all() -> Vec<(&'static str, Box<dyn Scheme>)> {
    vec![
        (ThunkNuker::NAME, Box::new(ThunkNuker::new())),
        (TerminalDebug::NAME, Box::new(TerminalDebug::new())),
    ]
}
