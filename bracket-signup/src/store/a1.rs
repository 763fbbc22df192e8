use std::fmt;

/// One corner of an A1 range. Columns are zero-based, rows one-based.
/// A missing row means the whole column (as in `Bands!A:B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub col: usize,
    pub row: Option<usize>,
}

/// A named range such as `Scores!A2:C22`, `Bands!A:B` or `Scores!B5`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl A1Range {
    /// A single cell
    pub fn cell(sheet: &str, col: usize, row: usize) -> Self {
        A1Range {
            sheet: sheet.to_string(),
            start: CellRef { col, row: Some(row) },
            end: None,
        }
    }

    /// A rectangular block from (first_col, first_row) to (last_col, last_row)
    pub fn block(sheet: &str, first_col: usize, first_row: usize, last_col: usize, last_row: usize) -> Self {
        A1Range {
            sheet: sheet.to_string(),
            start: CellRef { col: first_col, row: Some(first_row) },
            end: Some(CellRef { col: last_col, row: Some(last_row) }),
        }
    }

    /// Whole columns, e.g. `Bands!A:B`
    pub fn columns(sheet: &str, first_col: usize, last_col: usize) -> Self {
        A1Range {
            sheet: sheet.to_string(),
            start: CellRef { col: first_col, row: None },
            end: Some(CellRef { col: last_col, row: None }),
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, format_cell(self.start))?;
        if let Some(end) = self.end {
            write!(f, ":{}", format_cell(end))?;
        }
        Ok(())
    }
}

/// Converts a zero-based column index to its letters (0 -> A, 26 -> AA)
pub fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn format_cell(cell: CellRef) -> String {
    match cell.row {
        Some(row) => format!("{}{}", column_letters(cell.col), row),
        None => column_letters(cell.col),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{bands_range, rounds_range, scores_range};

    #[test]
    fn display_matches_sheet_addressing() {
        assert_eq!(scores_range().to_string(), "Scores!A2:C22");
        assert_eq!(rounds_range().to_string(), "Rounds!A2:C13");
        assert_eq!(bands_range().to_string(), "Bands!A:B");
        assert_eq!(A1Range::cell("Scores", 1, 5).to_string(), "Scores!B5");
        assert_eq!(A1Range::block("Bands", 0, 9, 2, 9).to_string(), "Bands!A9:C9");
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(2), "C");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(702), "AAA");
    }
}
