//! CSV persistence of [`CalculationSnapshot`] rows.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use rechner_core::CalculationSnapshot;
use tracing::debug;

/// Writes one snapshot row, preceded by the header when `with_header` is set.
pub fn write_snapshot<W: Write>(
    writer: W,
    snapshot: &CalculationSnapshot,
    with_header: bool,
) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(writer);
    writer.serialize(snapshot)?;
    writer.flush()?;
    Ok(())
}

/// Appends a row to the CSV file at `path`. A new or empty file gets the
/// header first.
pub fn append_snapshot(
    path: &Path,
    snapshot: &CalculationSnapshot,
) -> anyhow::Result<()> {
    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    debug!(path = %path.display(), is_new, "appending snapshot");
    write_snapshot(file, snapshot, is_new)?;
    Ok(())
}
