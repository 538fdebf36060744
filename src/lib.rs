//! ctree Pattern Matching Library
//!
//! デコンパイラのctree（関数本体の構文木）に対する宣言的なパターン照合と、
//! 照合結果に基づく木の書き換えを提供する。

pub mod ctree;
pub mod error;
pub mod matching;
pub mod patterns;
pub mod scheme;

// Re-export commonly used types
pub use ctree::{CTree, CType, Ea, Node, NodeData, NodeId, NodeSpec, Op, TreeSpec};
pub use error::{CtreeError, MatchError, MatchResult, PatternError, SchemeError};
pub use matching::{MatchContext, MatchTrace, TraceNode};
pub use patterns::{asg_insn, call_insn, DebugFilter, Pattern, PatternKind, StructConstraint};
pub use scheme::{run_schemes, AstPatch, RunOptions, RunReport, Scheme, SchemeRegistry};
