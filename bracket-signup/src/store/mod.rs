pub mod a1;
pub mod auth;
#[cfg(test)]
pub mod memory;
pub mod sheets;

use async_trait::async_trait;

use crate::error::StoreError;

pub use a1::A1Range;
pub use auth::{Authenticator, ServiceAccount, ServiceAccountKey, StaticToken};
#[cfg(test)]
pub use memory::MemoryStore;
pub use sheets::SheetsClient;

pub const SCORES_SHEET: &str = "Scores";
pub const ROUNDS_SHEET: &str = "Rounds";
pub const BANDS_SHEET: &str = "Bands";

/// Sheet row holding the first score row (row 1 is the header)
pub const SCORES_FIRST_ROW: usize = 2;

/// `Scores!A2:C22`: slot label plus the two occupant cells
pub fn scores_range() -> A1Range {
    A1Range::block(SCORES_SHEET, 0, SCORES_FIRST_ROW, 2, 22)
}

/// `Rounds!A2:C13`: three-wide progression ladder
pub fn rounds_range() -> A1Range {
    A1Range::block(ROUNDS_SHEET, 0, 2, 2, 13)
}

/// `Bands!A:B`: name and email of every registered band
pub fn bands_range() -> A1Range {
    A1Range::columns(BANDS_SHEET, 0, 1)
}

/// Tabular store addressed by A1 ranges. Reads return rows in
/// `majorDimension=ROWS` order with trailing empty cells and rows omitted.
#[async_trait]
pub trait RangeStore: Send + Sync {
    async fn read(&self, range: &A1Range) -> Result<Vec<Vec<String>>, StoreError>;

    async fn write(&self, range: &A1Range, rows: Vec<Vec<String>>) -> Result<(), StoreError>;

    /// Empties the cells of a range without removing rows or columns
    async fn clear(&self, range: &A1Range) -> Result<(), StoreError>;
}
