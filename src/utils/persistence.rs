//! Thin CSV codec for the ledger table.
//!
//! The file is a plain grid: a header row, then one row per account. Structure
//! is validated by [`crate::ledger::Ledger::load`]; this module only moves
//! cells in and out.

use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::errors::Result;

const TMP_SUFFIX: &str = "tmp";

/// Header cells of a freshly created, empty ledger file.
pub const TEMPLATE_HEADER: [&str; 2] = ["Account", "Type"];

/// A raw data row with its 1-based line number in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Raw grid read from a ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Reads every record; `None` when the source holds no rows at all.
pub fn read_table(source: impl Read) -> Result<Option<Table>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Ok(None),
    };

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(index + 2);
        rows.push(TableRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(Some(Table { header, rows }))
}

/// Writes the header followed by each row.
pub fn write_table<W: Write>(sink: W, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(false).from_writer(sink);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Stages the write in a sibling temp file, then renames it over `path`.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    if let Err(err) = write(&mut file).and_then(|_| file.sync_all().map_err(Into::into)) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Creates an empty ledger file at `path` unless one exists. Returns whether it was created.
pub fn ensure_template(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let header: Vec<String> = TEMPLATE_HEADER.iter().map(|cell| cell.to_string()).collect();
    write_atomic(path, |file| write_table(file, &header, &[]))?;
    info!(path = %path.display(), "created ledger template");
    Ok(true)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
