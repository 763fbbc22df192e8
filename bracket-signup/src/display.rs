use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::bracket::Slot;

/// Formats an occupant cell for display
pub fn format_occupant(occupant: Option<&str>) -> String {
    occupant.map(str::to_string).unwrap_or_else(|| "[EMPTY]".to_string())
}

/// Writes the bracket as an indented tree, one first-round slot per block
pub fn write_bracket<W: Write>(out: &mut W, rounds: &[Slot]) -> std::io::Result<()> {
    writeln!(out, "=== Bracket ({} first-round slots) ===", rounds.len())?;
    for (i, root) in rounds.iter().enumerate() {
        writeln!(out)?;
        for (depth, slot) in root.chain().enumerate() {
            let prefix = if depth == 0 {
                format!("Slot {}", i + 1)
            } else {
                format!("{}-> Round {}", "  ".repeat(depth), depth + 1)
            };
            writeln!(
                out,
                "{} ({} {}): {} vs {}",
                prefix,
                slot.date,
                slot.time,
                format_occupant(slot.occupant_a.as_deref()),
                format_occupant(slot.occupant_b.as_deref()),
            )?;
        }
    }
    Ok(())
}

/// Prints the bracket to stdout
pub fn print_bracket(rounds: &[Slot]) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_bracket(&mut handle, rounds)
}

/// Exports every distinct slot as a CSV row: round, date, time, band1, band2.
/// Later-round slots reached from several first-round slots appear once.
pub fn write_bracket_csv<P: AsRef<Path>>(path: P, rounds: &[Slot]) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    write_csv_rows(&mut wtr, rounds)?;
    wtr.flush()?;
    Ok(())
}

fn write_csv_rows<W: Write>(wtr: &mut csv::Writer<W>, rounds: &[Slot]) -> csv::Result<()> {
    wtr.write_record(["round", "date", "time", "band1", "band2"])?;
    let mut seen = HashSet::new();
    for root in rounds {
        for (depth, slot) in root.chain().enumerate() {
            if !seen.insert((slot.date.as_str(), slot.time.as_str())) {
                continue;
            }
            let round = (depth + 1).to_string();
            wtr.write_record([
                round.as_str(),
                slot.date.as_str(),
                slot.time.as_str(),
                slot.occupant_a.as_deref().unwrap_or(""),
                slot.occupant_b.as_deref().unwrap_or(""),
            ])?;
        }
    }
    Ok(())
}
