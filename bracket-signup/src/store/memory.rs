use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{A1Range, RangeStore};
use crate::error::StoreError;

/// A store operation, recorded in the order it was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Read(String),
    Write(String, Vec<Vec<String>>),
    Clear(String),
}

/// In-process grid of sheets with the same range semantics as the
/// spreadsheet API
#[derive(Default)]
pub struct MemoryStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    ops: Mutex<Vec<StoreOp>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seeds a sheet starting at row 1, column A
    pub fn with_sheet(self, name: &str, rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        self.sheets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), grid);
        self
    }

    /// Makes every later write or clear of exactly `range` fail
    pub fn fail_writes_to(&self, range: &str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(range.to_string());
    }

    /// Snapshot of a sheet's grid
    pub fn sheet(&self, name: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Value of a single cell, empty string when unset
    pub fn cell(&self, name: &str, col: usize, row: usize) -> String {
        self.sheet(name)
            .get(row - 1)
            .and_then(|cells| cells.get(col))
            .cloned()
            .unwrap_or_default()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Writes and clears only, in order
    pub fn mutations(&self) -> Vec<StoreOp> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, StoreOp::Read(_)))
            .collect()
    }

    fn record(&self, op: StoreOp) {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).push(op);
    }

    fn check_failure(&self, range: &A1Range) -> Result<(), StoreError> {
        let failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing.contains(&range.to_string()) {
            return Err(StoreError::Status {
                status: 500,
                body: format!("simulated failure writing {range}"),
            });
        }
        Ok(())
    }
}

fn last_col(range: &A1Range) -> usize {
    range.end.map(|end| end.col).unwrap_or(range.start.col)
}

/// Zero-based (first_row, last_row) for a range over a grid of `len` rows
fn row_bounds(range: &A1Range, len: usize) -> (usize, usize) {
    let first = range.start.row.map(|row| row - 1).unwrap_or(0);
    let last_row = match range.end {
        Some(end) => end.row,
        None => range.start.row,
    };
    let last = match last_row {
        Some(row) => row - 1,
        None => len.saturating_sub(1),
    };
    (first, last)
}

#[async_trait]
impl RangeStore for MemoryStore {
    async fn read(&self, range: &A1Range) -> Result<Vec<Vec<String>>, StoreError> {
        self.record(StoreOp::Read(range.to_string()));
        let grid = self.sheet(&range.sheet);
        if grid.is_empty() {
            return Ok(Vec::new());
        }
        let (first_row, last_row) = row_bounds(range, grid.len());
        let (first_col, last_col) = (range.start.col, last_col(range));

        let mut rows: Vec<Vec<String>> = Vec::new();
        for r in first_row..=last_row {
            let Some(cells) = grid.get(r) else {
                break;
            };
            let mut row: Vec<String> = (first_col..=last_col)
                .map(|c| cells.get(c).cloned().unwrap_or_default())
                .collect();
            while row.last().is_some_and(|cell| cell.is_empty()) {
                row.pop();
            }
            rows.push(row);
        }
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn write(&self, range: &A1Range, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        self.record(StoreOp::Write(range.to_string(), rows.clone()));
        self.check_failure(range)?;
        let mut sheets = self.sheets.lock().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.entry(range.sheet.clone()).or_default();
        let first_row = range.start.row.map(|row| row - 1).unwrap_or(0);
        for (dr, values) in rows.into_iter().enumerate() {
            let r = first_row + dr;
            if grid.len() <= r {
                grid.resize(r + 1, Vec::new());
            }
            for (dc, value) in values.into_iter().enumerate() {
                let c = range.start.col + dc;
                if grid[r].len() <= c {
                    grid[r].resize(c + 1, String::new());
                }
                grid[r][c] = value;
            }
        }
        Ok(())
    }

    async fn clear(&self, range: &A1Range) -> Result<(), StoreError> {
        self.record(StoreOp::Clear(range.to_string()));
        self.check_failure(range)?;
        let mut sheets = self.sheets.lock().unwrap_or_else(|e| e.into_inner());
        let Some(grid) = sheets.get_mut(&range.sheet) else {
            return Ok(());
        };
        if grid.is_empty() {
            return Ok(());
        }
        let (first_row, last_row) = row_bounds(range, grid.len());
        for r in first_row..=last_row.min(grid.len() - 1) {
            for c in range.start.col..=last_col(range) {
                if let Some(cell) = grid[r].get_mut(c) {
                    cell.clear();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> MemoryStore {
        MemoryStore::new().with_sheet(
            "Bands",
            &[
                &["Name", "Email", "Phone"],
                &["Alpha", "alpha@example.com", "555-0100"],
                &["Beta", "beta@example.com", "555-0101"],
            ],
        )
    }

    #[tokio::test]
    async fn reads_whole_columns_and_trims_trailing_cells() {
        let store = bands();
        let rows = store.read(&A1Range::columns("Bands", 0, 1)).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Alpha".to_string(), "alpha@example.com".to_string()]);

        let store = MemoryStore::new().with_sheet("Scores", &[&["Slot"], &["June 7 8pm", "alpha", ""], &["", "", ""]]);
        let rows = store.read(&A1Range::block("Scores", 0, 2, 2, 22)).await.unwrap();
        assert_eq!(rows, vec![vec!["June 7 8pm".to_string(), "alpha".to_string()]]);
    }

    #[tokio::test]
    async fn write_grows_the_grid_and_clear_empties_cells() {
        let store = bands();
        let row = vec!["Gamma".to_string(), "gamma@example.com".to_string(), "555-0102".to_string()];
        store.write(&A1Range::block("Bands", 0, 4, 2, 4), vec![row]).await.unwrap();
        assert_eq!(store.cell("Bands", 0, 4), "Gamma");

        store.clear(&A1Range::cell("Bands", 1, 2)).await.unwrap();
        assert_eq!(store.cell("Bands", 1, 2), "");
        assert_eq!(store.cell("Bands", 0, 2), "Alpha");
    }

    #[tokio::test]
    async fn missing_sheet_reads_as_empty() {
        let store = MemoryStore::new();
        let rows = store.read(&A1Range::block("Rounds", 0, 2, 2, 13)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn injected_failures_are_reported() {
        let store = bands();
        store.fail_writes_to("Bands!B2");
        let err = store.clear(&A1Range::cell("Bands", 1, 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 500, .. }));
        assert_eq!(store.cell("Bands", 1, 2), "alpha@example.com");
        assert_eq!(store.mutations(), vec![StoreOp::Clear("Bands!B2".to_string())]);
    }
}
