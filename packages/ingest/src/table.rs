//! Delimited bytes to loosely typed rows.
//!
//! Every record becomes a [`serde_json::Value`] object keyed by the trimmed
//! header names. Cell values are typed dynamically: empty cells become
//! `null`, `true`/`false` become booleans, numeric-looking text becomes a
//! number, and everything else stays a string. Identity columns are the
//! exception and always keep their text, so a vessel called `True` or a call
//! sign like `1E5` survives unchanged.

use crate::LoadError;

/// Columns whose cells are kept as text instead of being typed.
pub const TEXT_COLUMNS: &[&str] = &["vessel_name", "imo", "mmsi", "call_sign"];

/// Parses CSV input into one JSON object per record.
///
/// Blank lines are ignored and records may be shorter or longer than the
/// header. A record the CSV reader cannot decode (e.g. invalid UTF-8) is
/// skipped with a warning rather than failing the whole load.
///
/// # Errors
///
/// Returns [`LoadError::Empty`] for blank input, [`LoadError::NoHeader`] if
/// the header row is missing, and [`LoadError::Csv`] if the header itself
/// cannot be read.
pub fn parse_rows(input: impl AsRef<[u8]>) -> Result<Vec<serde_json::Value>, LoadError> {
    let input = input.as_ref();
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(LoadError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LoadError::NoHeader);
    }

    let mut rows = Vec::new();
    let mut skipped = 0_usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping unreadable CSV record {}: {e}", line + 1);
                skipped += 1;
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut map = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = record.get(i).unwrap_or("");
            let value = if TEXT_COLUMNS.contains(&header.as_str()) {
                text_value(cell)
            } else {
                infer_value(cell)
            };
            map.insert(header.clone(), value);
        }
        rows.push(serde_json::Value::Object(map));
    }

    log::info!(
        "Parsed {} CSV records ({skipped} skipped as unreadable)",
        rows.len()
    );

    Ok(rows)
}

/// Keeps a cell as trimmed text, `null` when empty.
fn text_value(cell: &str) -> serde_json::Value {
    let cell = cell.trim();
    if cell.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(cell.to_owned())
    }
}

/// Converts one cell of text into a typed JSON value.
#[must_use]
pub fn infer_value(cell: &str) -> serde_json::Value {
    let cell = cell.trim();

    if cell.is_empty() {
        return serde_json::Value::Null;
    }

    match cell {
        "true" | "TRUE" | "True" => return serde_json::Value::Bool(true),
        "false" | "FALSE" | "False" => return serde_json::Value::Bool(false),
        _ => {}
    }

    if let Ok(int) = cell.parse::<i64>() {
        return serde_json::Value::from(int);
    }

    if looks_numeric(cell)
        && let Ok(float) = cell.parse::<f64>()
        && let Some(number) = serde_json::Number::from_f64(float)
    {
        return serde_json::Value::Number(number);
    }

    serde_json::Value::String(cell.to_owned())
}

/// Rejects text that Rust's float parser accepts but which is not a plain
/// decimal number (`inf`, `NaN`, ...).
fn looks_numeric(cell: &str) -> bool {
    cell.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
