//! CSV output backend.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use abm_engine::DataTable;

use crate::OutputResult;

/// Streams one [`DataTable`] to a CSV file: header row first, then every
/// data row in table order.
pub struct CsvTableWriter {
    writer:   Writer<File>,
    finished: bool,
}

impl CsvTableWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self {
            writer:   Writer::from_path(path)?,
            finished: false,
        })
    }

    /// Write the table's header and all of its rows.
    pub fn write(&mut self, table: &DataTable) -> OutputResult<()> {
        self.writer.write_record(table.columns())?;
        for row in table.rows() {
            self.writer
                .write_record(row.iter().map(ToString::to_string))?;
        }
        Ok(())
    }

    /// Flush the underlying file.  Idempotent — safe to call more than once.
    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}

/// One-shot convenience: write `table` to `path` and flush.
pub fn write_table(table: &DataTable, path: &Path) -> OutputResult<()> {
    let mut writer = CsvTableWriter::create(path)?;
    writer.write(table)?;
    writer.finish()
}
