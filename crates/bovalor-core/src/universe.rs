//! Ticker universe loading.
//!
//! The universe is a semicolon-delimited reference file (one row per listed
//! company) whose `Código` column holds the bare B3 company code. Codes are
//! suffixed with the exchange market identifier and returned in file order.

use std::fs;
use std::path::Path;

use crate::{Ticker, UniverseError};

/// Header name of the company-code column.
pub const CODE_COLUMN: &str = "Código";

/// Field delimiter of the reference file.
const DELIMITER: char = ';';

/// Load the ordered ticker universe from a reference file.
///
/// # Errors
///
/// Returns [`UniverseError`] when the file is unreadable, empty, lacks the
/// company-code column, or contains a code that fails ticker validation.
/// All of these are fatal: with no universe nothing downstream can run.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Ticker>, UniverseError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| UniverseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = contents.lines().enumerate();

    let (_, header) = lines
        .by_ref()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| UniverseError::Empty {
            path: path.to_path_buf(),
        })?;

    let code_index = header
        .trim_start_matches('\u{feff}')
        .split(DELIMITER)
        .position(|column| column.trim() == CODE_COLUMN)
        .ok_or_else(|| UniverseError::MissingColumn {
            path: path.to_path_buf(),
            column: CODE_COLUMN.to_owned(),
        })?;

    let mut tickers = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }

        let code = line
            .split(DELIMITER)
            .nth(code_index)
            .map(str::trim)
            .unwrap_or_default();

        let ticker = Ticker::with_exchange_suffix(code).map_err(|source| {
            UniverseError::InvalidCode {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            }
        })?;
        tickers.push(ticker);
    }

    if tickers.is_empty() {
        return Err(UniverseError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(tickers)
}
