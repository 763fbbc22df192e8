use serde::Serialize;

/// One contested date/time period in the bracket, serialized as a `Round`.
/// `next` is a copy of the slot the winner advances into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub date: String,
    pub time: String,
    #[serde(rename = "band1")]
    pub occupant_a: Option<String>,
    #[serde(rename = "band2")]
    pub occupant_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Slot>>,
}

impl Slot {
    /// This slot followed by every slot its winner can advance into
    pub fn chain(&self) -> impl Iterator<Item = &Slot> {
        std::iter::successors(Some(self), |slot| slot.next.as_deref())
    }
}

/// Body of the state endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateResponse {
    pub rounds: Vec<Slot>,
}

/// Which of a slot's two occupant cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    A,
    B,
}

impl Occupant {
    pub fn index(self) -> usize {
        match self {
            Occupant::A => 0,
            Occupant::B => 1,
        }
    }

    /// Zero-based sheet column (A holds the label)
    pub fn column(self) -> usize {
        self.index() + 1
    }
}

/// One raw row of the Scores table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub label: String,
    pub occupants: [Option<String>; 2],
}

impl ScoreRow {
    pub fn from_cells(cells: &[String]) -> Self {
        let occupant = |i: usize| cells.get(i).filter(|cell| !cell.is_empty()).cloned();
        ScoreRow {
            label: cells.first().cloned().unwrap_or_default(),
            occupants: [occupant(1), occupant(2)],
        }
    }

    pub fn occupant(&self, which: Occupant) -> Option<&str> {
        self.occupants[which.index()].as_deref()
    }
}

/// The Scores table as read, remembering which sheet row it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    rows: Vec<ScoreRow>,
    first_row: usize,
}

impl ScoreTable {
    pub fn from_rows(values: &[Vec<String>], first_row: usize) -> Self {
        ScoreTable {
            rows: values.iter().map(|cells| ScoreRow::from_cells(cells)).collect(),
            first_row,
        }
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Sheet row number of the row at `index`
    pub fn sheet_row(&self, index: usize) -> usize {
        self.first_row + index
    }

    /// First row whose label is exactly `label`
    pub fn find(&self, label: &str) -> Option<(usize, &ScoreRow)> {
        self.rows.iter().enumerate().find(|(_, row)| row.label == label)
    }

    /// Sets one occupant cell, mirroring a write (`Some`) or clear (`None`)
    pub fn set_occupant(&mut self, index: usize, which: Occupant, value: Option<String>) {
        if let Some(row) = self.rows.get_mut(index) {
            row.occupants[which.index()] = value;
        }
    }
}
