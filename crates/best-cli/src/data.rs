//! Loading observations from text and CSV files.
//!
//! Two layouts are accepted:
//! - plain text with one number per line (blank lines and `#` comments are skipped)
//! - CSV with a header row; the values come from the named column, or from
//!   the first column whose cells are all numeric

use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Observations of one group, read from a file.
#[derive(Debug, Clone)]
pub(crate) struct Observations {
    /// Parsed values
    pub values: Vec<f64>,
    /// Column the values came from (`None` for plain text)
    pub column: Option<String>,
    /// File the values were read from
    pub path: PathBuf,
}

impl Observations {
    /// Load observations from `path`.
    ///
    /// # Errors
    ///
    /// Missing file, unreadable CSV, unknown column, or a cell that is not a number.
    pub(crate) fn load<P: AsRef<Path>>(path: P, column: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;

        let first_line = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'));
        let is_plain = first_line.is_some_and(|line| line.parse::<f64>().is_ok());

        let observations = if is_plain && column.is_none() {
            Self {
                values: parse_plain(path, &text)?,
                column: None,
                path: path.to_path_buf(),
            }
        } else {
            let (values, name) = parse_csv(path, &text, column)?;
            Self {
                values,
                column: Some(name),
                path: path.to_path_buf(),
            }
        };
        debug!(
            path = %path.display(),
            n = observations.values.len(),
            column = observations.column.as_deref().unwrap_or("-"),
            "loaded observations"
        );
        Ok(observations)
    }

    /// Display name derived from the file stem, e.g. `drug` for `data/drug.csv`.
    pub(crate) fn name(&self) -> String {
        self.path
            .file_stem()
            .map_or_else(|| self.path.display().to_string(), |s| s.to_string_lossy().into_owned())
    }
}

fn parse_plain(path: &Path, text: &str) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value = line.parse::<f64>().map_err(|_| CliError::InvalidData {
            path: path.to_path_buf(),
            line: idx + 1,
            message: format!("'{line}' is not a number"),
        })?;
        values.push(value);
    }
    Ok(values)
}

fn parse_csv(path: &Path, text: &str, column: Option<&str>) -> Result<(Vec<f64>, String)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows: Vec<(usize, csv::StringRecord)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        rows.push((line, record));
    }

    let col_idx = match column {
        Some(col) => headers
            .iter()
            .position(|h| h == col)
            .ok_or_else(|| CliError::MissingColumn {
                column: col.to_string(),
                available: headers.iter().collect::<Vec<_>>().join(", "),
            })?,
        None => (0..headers.len())
            .find(|&idx| {
                let mut cells = rows
                    .iter()
                    .filter_map(|(_, record)| record.get(idx))
                    .filter(|cell| !cell.is_empty())
                    .peekable();
                cells.peek().is_some() && cells.all(|cell| cell.parse::<f64>().is_ok())
            })
            .ok_or_else(|| CliError::InvalidData {
                path: path.to_path_buf(),
                line: 1,
                message: "no column contains only numbers".to_string(),
            })?,
    };

    let mut values = Vec::with_capacity(rows.len());
    for (line, record) in &rows {
        let cell = record.get(col_idx).unwrap_or("");
        if cell.is_empty() {
            continue;
        }
        let value = cell.parse::<f64>().map_err(|_| CliError::InvalidData {
            path: path.to_path_buf(),
            line: *line,
            message: format!("'{cell}' is not a number"),
        })?;
        values.push(value);
    }

    let name = headers.get(col_idx).unwrap_or_default().to_string();
    Ok((values, name))
}
