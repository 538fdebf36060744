//! スキームを木全体に適用するドライバ

use super::{Scheme, SchemeRegistry};
use crate::ctree::{CTree, Ea, NodeId};
use crate::error::SchemeResult;
use crate::matching::MatchContext;

/// ドライバの設定
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 実行するスキーム名。空なら登録順にすべて
    pub schemes: Vec<String>,
    /// このアドレスのノードで照合が失敗したら、失敗木を記録する
    pub trace_at: Option<Ea>,
}

/// スキーム1つ分の実行結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeReport {
    pub name: String,
    /// 一致したノード（前順）
    pub matches: Vec<NodeId>,
    /// 適用できたパッチの数
    pub patches_applied: usize,
    /// 適用に失敗したパッチのエラーメッセージ
    pub errors: Vec<String>,
    /// `trace_at` で指定したノードの失敗木
    pub traces: Vec<(NodeId, Vec<String>)>,
}

/// 実行結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub schemes: Vec<SchemeReport>,
}

impl RunReport {
    pub fn total_matches(&self) -> usize {
        self.schemes.iter().map(|s| s.matches.len()).sum()
    }

    pub fn total_patches(&self) -> usize {
        self.schemes.iter().map(|s| s.patches_applied).sum()
    }
}

/// 登録済みスキームを木に適用する
///
/// 各スキームについて木を前順にたどり、候補ノードごとに新しい `MatchContext` で照合する。
/// パッチは一致の直後に適用されるので、後続の候補は書き換え後の木を見る。
pub fn run_schemes(
    tree: &mut CTree,
    registry: &SchemeRegistry,
    options: &RunOptions,
) -> SchemeResult<RunReport> {
    let selected: Vec<(&str, &dyn Scheme)> = if options.schemes.is_empty() {
        registry
            .iter()
            .map(|(name, scheme)| (name, scheme as &dyn Scheme))
            .collect()
    } else {
        options
            .schemes
            .iter()
            .map(|name| registry.get(name).map(|scheme| (name.as_str(), scheme)))
            .collect::<SchemeResult<Vec<_>>>()?
    };

    let mut report = RunReport::default();
    for (name, scheme) in selected {
        report
            .schemes
            .push(run_scheme(tree, name, scheme, options.trace_at));
    }
    Ok(report)
}

fn run_scheme(tree: &mut CTree, name: &str, scheme: &dyn Scheme, trace_at: Option<Ea>) -> SchemeReport {
    let mut report = SchemeReport {
        name: name.to_string(),
        ..SchemeReport::default()
    };

    for id in tree.preorder() {
        // 先に適用したパッチで切り離されたノードは飛ばす
        if !tree.is_attached(id) {
            continue;
        }

        let mut ctx = MatchContext::new();
        if !scheme.pattern().check(tree, Some(id), &mut ctx) {
            let ea = tree.get(id).and_then(|node| node.ea);
            if trace_at.is_some() && ea == trace_at {
                report.traces.push((id, ctx.trace().render()));
            }
            continue;
        }

        log::debug!("scheme '{}' matched {}: {}", name, id, tree.dstr(id));
        report.matches.push(id);

        let Some(patch) = scheme.on_matched_item(tree, id, &ctx) else {
            continue;
        };
        match patch.apply(tree) {
            Ok(()) => report.patches_applied += 1,
            Err(e) => {
                log::warn!("scheme '{}' could not patch {}: {}", name, id, e);
                report.errors.push(e.to_string());
            }
        }
    }
    report
}
