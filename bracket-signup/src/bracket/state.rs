use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::progression::ProgressionGraph;
use super::types::{ScoreRow, ScoreTable, Slot};
use crate::error::{SignupError, SignupResult};

/// Number of first-round slots in the deployed bracket
pub const DEFAULT_ROOT_COUNT: usize = 12;

/// `<word> <digits> <rest>`, e.g. `June 7 8:30pm`
fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w+ \d+) (.+)$").expect("label pattern is valid"))
}

/// Splits a composite slot label into (date, time)
pub fn parse_label(label: &str) -> SignupResult<(String, String)> {
    let captures = label_pattern()
        .captures(label)
        .ok_or_else(|| SignupError::InvalidLabel(label.to_string()))?;
    Ok((captures[1].to_string(), captures[2].to_string()))
}

/// Builds the bracket from the Scores table: the first `root_count` rows are
/// returned in table order, each carrying its chain of successor slots.
/// Nothing is cached; every call is a fresh projection of the rows.
pub fn read_state(table: &ScoreTable, graph: &ProgressionGraph, root_count: usize) -> SignupResult<Vec<Slot>> {
    table
        .rows()
        .iter()
        .take(root_count)
        .map(|row| {
            let mut visited = HashSet::new();
            visited.insert(row.label.as_str());
            build_slot(row, table, graph, &mut visited)
        })
        .collect()
}

/// Slot view of a single row, without following progression
pub fn slot_view(row: &ScoreRow) -> SignupResult<Slot> {
    let (date, time) = parse_label(&row.label)?;
    Ok(Slot {
        date,
        time,
        occupant_a: row.occupants[0].clone(),
        occupant_b: row.occupants[1].clone(),
        next: None,
    })
}

fn build_slot<'a>(
    row: &'a ScoreRow,
    table: &'a ScoreTable,
    graph: &'a ProgressionGraph,
    visited: &mut HashSet<&'a str>,
) -> SignupResult<Slot> {
    let mut slot = slot_view(row)?;

    if let Some(next_label) = graph.successor(&row.label) {
        let (_, next_row) = table
            .find(next_label)
            .ok_or_else(|| SignupError::BrokenProgression(format!("Couldn't find {next_label} in scores")))?;
        // A repeated label means the Rounds table loops
        if !visited.insert(next_row.label.as_str()) {
            return Err(SignupError::BrokenProgression(format!(
                "progression from {} loops back to {next_label}",
                row.label
            )));
        }
        slot.next = Some(Box::new(build_slot(next_row, table, graph, visited)?));
    }

    Ok(slot)
}
