use std::fs::{File, OpenOptions};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::CsvError;

/// How [`append_rows`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Add rows to the end; write the header only if the file is new or empty.
    #[default]
    Append,
    /// Truncate the file and start over with a fresh header.
    Overwrite,
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CsvError + '_ {
    move |source| CsvError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Writes `rows` to the CSV file at `path`.
///
/// Parent directories are created as needed. Returns the number of rows
/// written.
///
/// # Errors
///
/// Returns [`CsvError::Io`] if the file cannot be opened or flushed and
/// [`CsvError::Csv`] if a row fails to serialize.
pub fn append_rows<T: Serialize>(
    path: &Path,
    rows: &[T],
    mode: WriteMode,
) -> Result<usize, CsvError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let needs_header = match mode {
        WriteMode::Overwrite => true,
        WriteMode::Append => std::fs::metadata(path).map_or(true, |m| m.len() == 0),
    };

    let file = match mode {
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path),
        WriteMode::Overwrite => File::create(path),
    }
    .map_err(io_err(path))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(io_err(path))?;

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        header = needs_header,
        "csv rows written"
    );
    Ok(rows.len())
}

/// Reads every row of the CSV file at `path`.
///
/// # Errors
///
/// Returns [`CsvError::Io`] if the file cannot be opened and
/// [`CsvError::Csv`] if a row does not match `T`.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CsvError> {
    let file = File::open(path).map_err(io_err(path))?;
    let mut reader = csv::Reader::from_reader(file);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(CsvError::from)
}

/// Number of data rows (header excluded) in the file at `path`.
///
/// A missing file counts as zero rows.
///
/// # Errors
///
/// Returns [`CsvError::Io`] for an unreadable file and [`CsvError::Csv`]
/// for a malformed one.
pub fn count_rows(path: &Path) -> Result<usize, CsvError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(io_err(path)(e)),
    };
    let mut reader = csv::Reader::from_reader(file);
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
