use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Whitespace-delimited two-column spectra
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TextError {
    #[error("content is not text")]
    NotText,

    #[error("line {line}: expected at least 2 columns, found {found}")]
    TooFewColumns { line: usize, found: usize },

    #[error("line {line}: '{token}' is not a number")]
    BadNumber { line: usize, token: String },

    #[error("no data rows")]
    NoRows,

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Parse a two-column table: col1 = wavelength, col2 = flux.
///
/// Columns are separated by any run of spaces or tabs. Lines starting with
/// `#` and blank lines are skipped, extra columns are ignored, and a single
/// non-numeric header line before the first data row is tolerated.
pub fn parse_two_columns(bytes: &[u8]) -> Result<(Vec<f64>, Vec<f64>), TextError> {
    let text = std::str::from_utf8(bytes).map_err(|_| TextError::NotText)?;
    if text.contains('\0') {
        return Err(TextError::NotText);
    }
    let text = text.replace('\t', " ");

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut wave = Vec::new();
    let mut flux = Vec::new();
    let mut header_allowed = true;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let tokens: Vec<&str> = record.iter().filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 2 {
            return Err(TextError::TooFewColumns {
                line,
                found: tokens.len(),
            });
        }

        let parsed = (tokens[0].parse::<f64>(), tokens[1].parse::<f64>());
        match parsed {
            (Ok(w), Ok(f)) => {
                wave.push(w);
                flux.push(f);
            }
            _ if header_allowed => {}
            (Err(_), _) => {
                return Err(TextError::BadNumber {
                    line,
                    token: tokens[0].to_string(),
                })
            }
            (_, Err(_)) => {
                return Err(TextError::BadNumber {
                    line,
                    token: tokens[1].to_string(),
                })
            }
        }
        header_allowed = false;
    }

    if wave.is_empty() {
        return Err(TextError::NoRows);
    }
    Ok((wave, flux))
}

/// Write two equal-length columns as space-separated scientific notation,
/// one sample per line.
pub fn write_two_columns(path: &Path, first: &[f64], second: &[f64]) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .quote_style(QuoteStyle::Never)
        .from_path(path)?;

    for (a, b) in first.iter().zip(second) {
        writer.write_record([format!("{a:.18e}"), format!("{b:.18e}")])?;
    }
    writer.flush()?;
    Ok(())
}
