use super::request::Entrant;
use crate::store::{A1Range, BANDS_SHEET};

/// Outcome of looking an entrant up in the Bands table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Lower-cased stored name, used to recognise the band's claims
    pub band_name: String,
    pub is_new: bool,
    /// Sheet row of the matching row, or the row a new band is appended at
    pub row: usize,
}

impl Registration {
    /// `Bands!A{n}:C{n}` for a new band's `[name, email, phone]`
    pub fn append_range(&self) -> A1Range {
        A1Range::block(BANDS_SHEET, 0, self.row, 2, self.row)
    }
}

/// Finds the entrant among `band_rows` (read from `Bands!A:B`, so row 0 is
/// sheet row 1). The first row whose name or email matches case-insensitively
/// wins, even if a later row matches the other field. Nothing is merged.
pub fn find_or_register(entrant: &Entrant, band_rows: &[Vec<String>]) -> Registration {
    let name = entrant.name.to_lowercase();
    let email = entrant.email.to_lowercase();

    let found = band_rows.iter().position(|row| {
        let stored_name = row.first().map(|v| v.to_lowercase());
        let stored_email = row.get(1).map(|v| v.to_lowercase());
        stored_name.as_deref() == Some(name.as_str()) || stored_email.as_deref() == Some(email.as_str())
    });

    match found {
        Some(index) => {
            // A row matched by email may have no name; fall back to the submitted one
            let band_name = band_rows[index]
                .first()
                .filter(|stored| !stored.is_empty())
                .map(|stored| stored.to_lowercase())
                .unwrap_or(name);
            Registration {
                band_name,
                is_new: false,
                row: index + 1,
            }
        }
        None => Registration {
            band_name: name,
            is_new: true,
            row: band_rows.len() + 1,
        },
    }
}
