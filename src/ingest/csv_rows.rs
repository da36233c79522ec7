//! CSV reader producing ordered rows for the import adapter

use crate::ingest::{FieldValue, ImportError, ImportResult, Row};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a CSV file into rows keyed by the header line
pub fn read_rows_from_path<P: AsRef<Path>>(path: P) -> ImportResult<Vec<Row>> {
    let path_str = path.as_ref().to_string_lossy().to_string();
    let content = fs::read(&path).map_err(|source| ImportError::Io {
        path: path_str.clone(),
        source,
    })?;
    debug!(path = %path_str, bytes = content.len(), "read import file");
    read_rows_from_bytes(&content)
}

/// Parse CSV text; `;`, `,` and tab delimiters are detected from the header
pub fn read_rows_from_str(content: &str) -> ImportResult<Vec<Row>> {
    read_rows_from_bytes(content.as_bytes())
}

/// Parse raw CSV bytes. Cells that are not valid UTF-8 (legacy exports)
/// are decoded lossily instead of failing the whole file.
pub fn read_rows_from_bytes(content: &[u8]) -> ImportResult<Vec<Row>> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    let header_end = content.iter().position(|b| *b == b'\n').unwrap_or(content.len());
    let delimiter = detect_delimiter(&String::from_utf8_lossy(&content[..header_end]));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|header| String::from_utf8_lossy(header).into_owned())
        .collect();
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let mut row = Row::new();
        for (index, header) in headers.iter().enumerate() {
            let value = record
                .get(index)
                .map(|cell| FieldValue::from_cell(&String::from_utf8_lossy(cell)))
                .unwrap_or(FieldValue::Empty);
            row.push(header, value);
        }
        if !row.is_blank() {
            rows.push(row);
        }
    }
    debug!(delimiter = %(delimiter as char), columns = headers.len(), rows = rows.len(), "csv parsed");
    Ok(rows)
}

fn detect_delimiter(header_line: &str) -> u8 {
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|d| header_line.bytes().filter(|b| b == d).count())
        .filter(|d| header_line.as_bytes().contains(d))
        .unwrap_or(b',')
}
