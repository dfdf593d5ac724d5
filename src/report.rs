use crate::error::DigestError;
use crate::types::quote::QuoteRecord;
use std::path::Path;
use tracing::info;

pub const REPORT_HEADER: [&str; 5] = [
    "Quote",
    "Author",
    "Summary",
    "Translation (HI)",
    "Motivational",
];

/// Overwrite `path` with the header row and one row per record; returns the data row count.
pub fn write_csv(path: &Path, records: &[QuoteRecord]) -> Result<usize, DigestError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REPORT_HEADER)?;
    for record in records {
        writer.write_record(record.as_row())?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "report written");
    Ok(records.len())
}
