use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredRecordSet;

/// Write the filtered events as CSV: normalized column names, no index column.
pub fn write_csv<W: Write>(view: &FilteredRecordSet, sink: W) -> Result<()> {
    let dataset = view.dataset;
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(sink);

    writer
        .write_record(dataset.column_names())
        .context("writing CSV header")?;
    for event in view.events() {
        writer
            .write_record(
                dataset
                    .layout
                    .iter()
                    .map(|&col| dataset.cell_text(event, col)),
            )
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// UTF-8 bytes of [`write_csv`], ready for a download button.
pub fn to_csv_bytes(view: &FilteredRecordSet) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

pub fn save_csv(view: &FilteredRecordSet, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(view)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} events to {}", view.len(), path.display());
    Ok(())
}
