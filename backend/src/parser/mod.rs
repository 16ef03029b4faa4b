//! Dataset loading and writing with encoding and delimiter auto-detection.
//!
//! Converts CSV rows or JSON arrays of flat objects into [`Record`]s and back.
//! No matching logic here.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{LoadError, LoadResult};
use crate::models::{FieldValue, Record};

/// On-disk representation of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    /// Pick a format from the file extension; anything but `.json` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DataFormat::Json,
            _ => DataFormat::Csv,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Csv => f.write_str("csv"),
            DataFormat::Json => f.write_str("json"),
        }
    }
}

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Parsed records
    pub records: Vec<Record>,
    /// Source format
    pub format: DataFormat,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter (CSV only)
    pub delimiter: Option<char>,
    /// Column headers in source order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let label = encoding.to_lowercase();
    match label.as_str() {
        "utf-8" | "utf8" | "ascii" => {
            let text = match String::from_utf8(bytes.to_vec()) {
                Ok(s) => s,
                Err(_) => String::from_utf8_lossy(bytes).into_owned(),
            };
            if text.starts_with('\u{feff}') {
                Ok(text['\u{feff}'.len_utf8()..].to_string())
            } else {
                Ok(text)
            }
        }
        _ => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => {
                let (decoded, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    debug!(encoding = enc.name(), "replacement characters inserted while decoding");
                }
                Ok(decoded.into_owned())
            }
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Each row becomes a [`Record`] keyed by the trimmed header names; cell
/// types are inferred with [`FieldValue::infer`]. Short rows get `Null` for
/// the missing cells, extra cells are ignored, blank lines are skipped.
///
/// # Example
/// ```
/// use recmatch::parser::parse_csv_str;
/// use recmatch::FieldValue;
///
/// let rows = parse_csv_str("name;age\nAlice;30\nBob;25", ';').unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].get("age"), Some(&FieldValue::Integer(30)));
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> LoadResult<Vec<Record>> {
    parse_csv_with_headers(content, delimiter).map(|(_, records)| records)
}

fn parse_csv_with_headers(content: &str, delimiter: char) -> LoadResult<(Vec<String>, Vec<Record>)> {
    if !delimiter.is_ascii() {
        return Err(LoadError::Unsupported(format!("delimiter '{}' is not ASCII", delimiter)));
    }
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptyFile);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.clone(), FieldValue::infer(row.get(i).unwrap_or(""))))
            .collect();
        records.push(record);
    }

    Ok((headers, records))
}

/// Parse a JSON array of flat objects.
///
/// Nested arrays or objects are rejected: records hold scalars only.
pub fn parse_json_str(content: &str) -> LoadResult<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let items = value
        .as_array()
        .ok_or_else(|| LoadError::Unsupported("expected a JSON array of objects".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                LoadError::Unsupported(format!("element {} is not an object", index))
            })?;
            object
                .iter()
                .map(|(field, value)| {
                    FieldValue::try_from(value)
                        .map(|v| (field.clone(), v))
                        .map_err(|reason| {
                            LoadError::Unsupported(format!("element {}, field '{}': {}", index, field, reason))
                        })
                })
                .collect::<LoadResult<Record>>()
        })
        .collect()
}

/// Field names across all records, in first-appearance order.
pub fn collect_headers(records: &[Record]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut headers = Vec::new();
    for record in records {
        for (field, _) in record {
            if seen.insert(field.as_str()) {
                headers.push(field.clone());
            }
        }
    }
    headers
}

/// Load a dataset file with auto-detection.
///
/// `.json` files are read as JSON arrays; everything else as CSV with
/// encoding and delimiter detection.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> LoadResult<LoadedDataset> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let loaded = parse_bytes_auto(&bytes, DataFormat::from_path(path))?;

    info!(
        path = %path.display(),
        format = %loaded.format,
        encoding = %loaded.encoding,
        records = loaded.records.len(),
        "loaded dataset"
    );
    Ok(loaded)
}

/// Parse raw bytes in the given format with encoding detection.
pub fn parse_bytes_auto(bytes: &[u8], format: DataFormat) -> LoadResult<LoadedDataset> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    match format {
        DataFormat::Json => {
            let records = parse_json_str(&content)?;
            let headers = collect_headers(&records);
            Ok(LoadedDataset {
                records,
                format,
                encoding,
                delimiter: None,
                headers,
            })
        }
        DataFormat::Csv => {
            let delimiter = detect_delimiter(&content);
            let (headers, records) = parse_csv_with_headers(&content, delimiter)?;
            Ok(LoadedDataset {
                records,
                format,
                encoding,
                delimiter: Some(delimiter),
                headers,
            })
        }
    }
}

/// Render records as pretty-printed JSON.
pub fn write_json(records: &[Record]) -> LoadResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Render records as CSV.
///
/// The header is the union of all field names in first-appearance order;
/// absent fields and nulls become empty cells.
pub fn write_csv(records: &[Record], delimiter: char) -> LoadResult<String> {
    if !delimiter.is_ascii() {
        return Err(LoadError::Unsupported(format!("delimiter '{}' is not ASCII", delimiter)));
    }

    let headers = collect_headers(records);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(Vec::new());

    if !headers.is_empty() {
        writer.write_record(&headers)?;
    }
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| record.get(h).map(FieldValue::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LoadError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| LoadError::Encoding(e.to_string()))
}

/// Write records to `path`, as JSON for `.json` and comma-separated CSV otherwise.
pub fn save_dataset<P: AsRef<Path>>(path: P, records: &[Record]) -> LoadResult<()> {
    let path = path.as_ref();
    let content = match DataFormat::from_path(path) {
        DataFormat::Json => write_json(records)?,
        DataFormat::Csv => write_csv(records, ',')?,
    };
    std::fs::write(path, content)?;
    debug!(path = %path.display(), records = records.len(), "saved dataset");
    Ok(())
}
