//! Tabular data handling shared by all models

use super::{ModelError, ModelResult};
use std::path::Path;

/// Row-major numeric table
pub type Matrix = Vec<Vec<f64>>;

/// Read raw data into a matrix
///
/// `raw` is a path to an existing CSV file, or inline rows separated by `;`
/// or newlines with comma-separated columns (`"1,2,3;4,5,6"`).
pub fn extract(raw: &str) -> ModelResult<Matrix> {
    let path = Path::new(raw.trim());
    if !raw.trim().is_empty() && path.is_file() {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Extracting data from file");
        return parse_matrix(&content);
    }

    parse_matrix(raw)
}

/// Parse inline or CSV text into a rectangular matrix
///
/// Blank lines and `#` comments are skipped. A first row made only of
/// non-numeric cells is treated as a header.
pub fn parse_matrix(text: &str) -> ModelResult<Matrix> {
    let mut rows: Matrix = Vec::new();
    let mut width: Option<usize> = None;

    let lines = text
        .split(['\n', ';'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    for (index, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();

        if index == 0 && cells.iter().all(|c| c.parse::<f64>().is_err()) {
            continue;
        }

        let row = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| match cell.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(ModelError::InvalidData(format!(
                    "row {}, column {}: '{}' is not a finite number",
                    index + 1,
                    col + 1,
                    cell
                ))),
            })
            .collect::<ModelResult<Vec<f64>>>()?;

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(ModelError::InvalidData(format!(
                    "row {} has {} columns, expected {}",
                    index + 1,
                    row.len(),
                    w
                )));
            }
            Some(_) => {}
        }

        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ModelError::InvalidData("no data rows".to_string()));
    }

    Ok(rows)
}

/// Split each row into features (all but the last column) and target (last column)
pub fn split_target(data: Matrix) -> ModelResult<(Matrix, Vec<f64>)> {
    let mut features = Vec::with_capacity(data.len());
    let mut target = Vec::with_capacity(data.len());

    for (index, mut row) in data.into_iter().enumerate() {
        if row.len() < 2 {
            return Err(ModelError::InvalidData(format!(
                "row {} needs at least one feature column and a target column",
                index + 1
            )));
        }
        // Length checked above
        let y = row.pop().unwrap_or_default();
        target.push(y);
        features.push(row);
    }

    Ok((features, target))
}

/// Check that a training set is non-empty, rectangular, and aligned with its target
pub fn check_training_set(features: &Matrix, target: &[f64]) -> ModelResult<usize> {
    if features.is_empty() {
        return Err(ModelError::InvalidData("training set is empty".to_string()));
    }
    if features.len() != target.len() {
        return Err(ModelError::InvalidData(format!(
            "{} feature rows but {} target values",
            features.len(),
            target.len()
        )));
    }
    let width = check_width(features, None)?;

    if let Some(index) = features
        .iter()
        .position(|row| row.iter().any(|v| !v.is_finite()))
    {
        return Err(ModelError::InvalidData(format!(
            "row {} has a non-finite feature value",
            index + 1
        )));
    }
    if let Some(index) = target.iter().position(|y| !y.is_finite()) {
        return Err(ModelError::InvalidData(format!(
            "row {} has a non-finite target value",
            index + 1
        )));
    }

    Ok(width)
}

/// Check that every row has the same number of columns, optionally a given one
pub fn check_width(features: &Matrix, expected: Option<usize>) -> ModelResult<usize> {
    let width = match expected {
        Some(w) => w,
        None => features.first().map(Vec::len).unwrap_or(0),
    };
    if width == 0 {
        return Err(ModelError::InvalidData("rows have no feature columns".to_string()));
    }

    if let Some((index, row)) = features.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(ModelError::InvalidData(format!(
            "row {} has {} features, expected {}",
            index + 1,
            row.len(),
            width
        )));
    }

    Ok(width)
}
