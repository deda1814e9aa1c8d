use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::Timelike;
use std::io::Cursor;

/// Extract the first worksheet of a workbook as CSV text
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .context("Failed to open spreadsheet")?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Spreadsheet has no worksheets")?
        .context("Failed to read first worksheet")?;

    tracing::debug!(rows = range.height(), columns = range.width(), "Read worksheet");

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in range.rows() {
        writer
            .write_record(row.iter().map(cell_text))
            .context("Failed to write CSV row")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Dates as ISO text, the date alone when there is no time of day
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(value) if value.num_seconds_from_midnight() == 0 => {
                value.format("%Y-%m-%d").to_string()
            }
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.to_string(),
        },
        other => other.to_string(),
    }
}
