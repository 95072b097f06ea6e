//! Text rendering of mining results and Tarantula rankings.

use crate::result::MiningResult;
use crate::tarantula::LineRank;
use crate::NodeId;
use faultgraph_trace::NodeInfoCollection;

pub const PATH_SEPARATOR: &str = "    ->    ";

/// Source text of a node's line, or `#<id>` when unavailable.
pub fn statement(id: NodeId, infos: &NodeInfoCollection, source_lines: &[String]) -> String {
    infos
        .get(id)
        .and_then(|info| (info.line as usize).checked_sub(1))
        .and_then(|idx| source_lines.get(idx))
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map_or_else(|| format!("#{id}"), str::to_string)
}

/// One line per result: `rank  score  stmt    ->    stmt ...`.
///
/// Each result's `text` is set to its rendered statement sequence.
pub fn render_report(
    results: &mut [MiningResult],
    infos: &NodeInfoCollection,
    source_lines: &[String],
) -> Vec<String> {
    results
        .iter_mut()
        .enumerate()
        .map(|(i, result)| {
            let text = result
                .path
                .nodes()
                .iter()
                .map(|&id| statement(id, infos, source_lines))
                .collect::<Vec<_>>()
                .join(PATH_SEPARATOR);
            let line = format!("{}  {:.3}  {}", i + 1, result.score, text);
            result.text = Some(text);
            line
        })
        .collect()
}

/// `rank<TAB>line<TAB>score` rows.
pub fn render_tarantula(ranking: &[LineRank]) -> Vec<String> {
    ranking
        .iter()
        .map(|r| format!("{}\t{}\t{:.3}", r.rank, r.line, r.score))
        .collect()
}
