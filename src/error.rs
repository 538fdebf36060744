//! 統一的なエラーハンドリングモジュール
//!
//! パターンの照合失敗はエラーではなく `bool` で表す。ここで扱うのは、
//! パターン構築時の設定ミスと、ホスト側の木やスキーム登録に関するエラーだけ。

use thiserror::Error;

use crate::ctree::{NodeId, Op};

/// クレート全体の統一エラー型
#[derive(Error, Debug)]
pub enum MatchError {
    /// パターン構築エラー
    #[error("パターン構築エラー: {0}")]
    Pattern(#[from] PatternError),

    /// ctree操作エラー
    #[error("ctree操作エラー: {0}")]
    Ctree(#[from] CtreeError),

    /// スキーム登録エラー
    #[error("スキームエラー: {0}")]
    Scheme(#[from] SchemeError),

    /// ファイルI/Oエラー
    #[error("ファイル操作エラー: {0}")]
    Io(#[from] std::io::Error),
}

/// パターン構築時のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("未知の操作種別: '{name}'")]
    UnknownOp { name: String },

    #[error("{op} は二項演算子ではありません")]
    NotBinaryOp { op: Op },

    #[error("{op} は単項演算子ではありません")]
    NotUnaryOp { op: Op },

    #[error("{combinator} には少なくとも1つの子パターンが必要です")]
    EmptyCombinator { combinator: &'static str },

    #[error("文字列の最小長は1以上でなければなりません（指定値: {min_len}）")]
    InvalidMinLen { min_len: usize },
}

/// ctreeの構築・書き換え時のエラー
#[derive(Error, Debug)]
pub enum CtreeError {
    #[error("存在しないノード: {id}")]
    UnknownNode { id: NodeId },

    #[error("ノード {id} は文ではありません")]
    NotAStatement { id: NodeId },

    #[error("不正な操作種別: {expected} を期待しましたが、{op} が見つかりました")]
    InvalidOp { op: Op, expected: &'static str },

    #[error("ノード {id} は親から切り離されています")]
    DetachedNode { id: NodeId },

    #[error("JSONの読み込みに失敗しました: {0}")]
    Json(#[from] serde_json::Error),
}

/// スキーム登録・参照時のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    #[error("スキーム {name} は既に登録されています")]
    Duplicate { name: String },

    #[error("未登録のスキーム: {name}")]
    Unknown { name: String },
}

/// Result型のエイリアス
pub type MatchResult<T> = Result<T, MatchError>;
pub type PatternResult<T> = Result<T, PatternError>;
pub type CtreeResult<T> = Result<T, CtreeError>;
pub type SchemeResult<T> = Result<T, SchemeError>;
