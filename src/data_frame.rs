use crate::error::{Error, Result};
use ndarray::prelude::*;
use std::path::Path;

pub type V = f64;

/// Samples × features, one row per sample
pub type DataFrame = Array2<V>;

/// One value per sample, aligned with the rows of a `DataFrame`
pub type Labels = Array1<V>;

/// Cells read as a missing genotype
const MISSING: [&str; 3] = ["", "NA", "-9"];

pub fn parse_value(cell: &str) -> Result<V> {
    let cell = cell.trim();
    if MISSING.iter().any(|m| *m == cell) {
        return Ok(V::NAN);
    }
    cell.parse::<V>()
        .map_err(|e| Error::dataset(format!("invalid numeric value `{}`: {}", cell, e)))
}

/// Stacks equally sized rows into a frame
pub fn from_rows(rows: Vec<Vec<V>>) -> Result<DataFrame> {
    let samples = rows.len();
    let cols = rows.first().map_or(0, Vec::len);
    let mut buffer = Vec::with_capacity(samples * cols);
    for (index, row) in rows.into_iter().enumerate() {
        if row.len() != cols {
            return Err(Error::dataset(format!(
                "row {} has {} columns, expected {}",
                index,
                row.len(),
                cols
            )));
        }
        buffer.extend(row);
    }
    Ok(DataFrame::from_shape_vec((samples, cols), buffer)?)
}

/// Headerless numeric csv, e.g. a partition written by `save_csv`
pub fn read_csv<P: AsRef<Path>>(file_path: P) -> Result<DataFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(file_path.as_ref())?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_value).collect::<Result<Vec<V>>>()?);
    }
    from_rows(rows)
}

pub fn save_csv<P: AsRef<Path>>(df: &DataFrame, file_path: P, headers: &[&str]) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path.as_ref())?;
    if !headers.is_empty() {
        writer.write_record(headers)?;
    }
    for row in df.outer_iter() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Copies the given rows in order; indices must be in bounds
pub fn select_rows(df: &DataFrame, rows: &[usize]) -> DataFrame {
    df.select(Axis(0), rows)
}

pub fn select_labels(labels: &Labels, rows: &[usize]) -> Labels {
    labels.select(Axis(0), rows)
}
