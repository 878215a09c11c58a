use crate::domain::model::PostalCode;
use crate::utils::error::{PipelineError, Result};
use std::collections::HashSet;

/// Parse a comma-separated origin specification into an ordered-unique ZIP
/// list. Invalid entries are dropped, not reported; an entirely empty result
/// is the caller's configuration error.
pub fn parse_origin_spec(spec: &str) -> Vec<PostalCode> {
    dedupe(spec.split(',').filter_map(PostalCode::parse))
}

/// Parse the destination table and pull the ZIP column as raw text, so
/// leading zeros survive. Accepts comma-, semicolon-, or tab-delimited
/// input; the delimiter is sniffed from the header line.
pub fn parse_destination_table(bytes: &[u8], column: &str) -> Result<Vec<PostalCode>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::UnreadableFileError {
            message: e.to_string(),
        })?;

    let index = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| PipelineError::MissingColumnError {
            column: column.to_string(),
        })?;

    let mut codes = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::UnreadableFileError {
            message: e.to_string(),
        })?;
        if let Some(code) = record.get(index).and_then(PostalCode::parse) {
            codes.push(code);
        }
    }

    Ok(dedupe(codes.into_iter()))
}

fn dedupe(codes: impl Iterator<Item = PostalCode>) -> Vec<PostalCode> {
    let mut seen = HashSet::new();
    codes.filter(|code| seen.insert(code.clone())).collect()
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|&b| b == b'\n').next().unwrap_or(bytes);
    for delimiter in [b'\t', b';'] {
        if header.contains(&delimiter) && !header.contains(&b',') {
            return delimiter;
        }
    }
    b','
}
