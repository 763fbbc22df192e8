use super::request::DesiredSlot;
use crate::bracket::{Occupant, ScoreTable};
use crate::error::{SignupError, SignupResult};
use crate::store::{A1Range, SCORES_SHEET};

/// One occupant cell of the Scores table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimCell {
    /// Index into the score table
    pub index: usize,
    pub occupant: Occupant,
}

/// Everything needed to move a band into a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPlan {
    pub target: ClaimCell,
    pub target_range: A1Range,
    /// Cells already holding the band anywhere in the table
    pub existing: Vec<(ClaimCell, A1Range)>,
}

/// Sheet range of an occupant cell
pub fn cell_range(table: &ScoreTable, cell: ClaimCell) -> A1Range {
    A1Range::cell(SCORES_SHEET, cell.occupant.column(), table.sheet_row(cell.index))
}

/// Works out where `band_name` goes for `desired` and which of its earlier
/// claims have to be vacated. A band already in the slot keeps its own cell;
/// otherwise the target is the first open occupant cell. A full slot is
/// rejected without touching anything.
pub fn plan_claim(band_name: &str, desired: &DesiredSlot, table: &ScoreTable) -> SignupResult<ClaimPlan> {
    let (index, row) = table.find(&desired.label()).ok_or_else(|| SignupError::SlotNotFound {
        date: desired.date.clone(),
        time: desired.time.clone(),
    })?;

    let held = [Occupant::A, Occupant::B]
        .into_iter()
        .find(|&occupant| holds(row.occupant(occupant), band_name));
    let occupant = match (held, row.occupant(Occupant::A), row.occupant(Occupant::B)) {
        (Some(occupant), _, _) => occupant,
        (None, None, _) => Occupant::A,
        (None, Some(_), None) => Occupant::B,
        (None, Some(_), Some(_)) => {
            return Err(SignupError::SlotFull {
                date: desired.date.clone(),
                time: desired.time.clone(),
            })
        }
    };
    let target = ClaimCell { index, occupant };

    let existing = existing_claims(band_name, table)
        .into_iter()
        .filter(|cell| *cell != target)
        .map(|cell| (cell, cell_range(table, cell)))
        .collect();

    Ok(ClaimPlan {
        target,
        target_range: cell_range(table, target),
        existing,
    })
}

/// Every occupant cell, across the whole table, holding `band_name`
pub fn existing_claims(band_name: &str, table: &ScoreTable) -> Vec<ClaimCell> {
    let mut cells = Vec::new();
    for (index, row) in table.rows().iter().enumerate() {
        for occupant in [Occupant::A, Occupant::B] {
            if holds(row.occupant(occupant), band_name) {
                cells.push(ClaimCell { index, occupant });
            }
        }
    }
    cells
}

/// Whether an occupant cell holds `band_name` (already lower-cased)
pub fn holds(cell: Option<&str>, band_name: &str) -> bool {
    cell.is_some_and(|held| held.to_lowercase() == band_name)
}

/// Mirrors a committed plan onto the in-memory table
pub fn apply_claim(table: &mut ScoreTable, plan: &ClaimPlan, name: &str) {
    for (cell, _) in &plan.existing {
        table.set_occupant(cell.index, cell.occupant, None);
    }
    table.set_occupant(plan.target.index, plan.target.occupant, Some(name.to_string()));
}
