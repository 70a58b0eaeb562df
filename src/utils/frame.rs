//! Column extraction helpers shared by the processing stages

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::*;

/// Ordered column names of a table
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Fail with [`PipelineError::FeatureNotFound`] for the first absent column
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<()> {
    for name in columns {
        let name = name.as_ref();
        if df.column(name).is_err() {
            return Err(PipelineError::FeatureNotFound(name.to_string()));
        }
    }
    Ok(())
}

fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))
}

fn reject_nulls(column: &Column, name: &str) -> Result<()> {
    let nulls = column.null_count();
    if nulls > 0 {
        return Err(PipelineError::ShapeError {
            expected: format!("no missing values in '{}'", name),
            actual: format!("{} missing values", nulls),
        });
    }
    Ok(())
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Is the column stored as a number
pub fn is_numeric(df: &DataFrame, name: &str) -> Result<bool> {
    Ok(is_numeric_dtype(get_column(df, name)?.dtype()))
}

/// Values of a numeric column as `f64`
pub fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = get_column(df, name)?;
    reject_nulls(column, name)?;

    if !is_numeric_dtype(column.dtype()) {
        return Err(PipelineError::ShapeError {
            expected: format!("numeric column '{}'", name),
            actual: format!("{}", column.dtype()),
        });
    }

    let casted = column.cast(&DataType::Float64)?;
    let values = casted
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Values of a discrete column as `i64`.
/// Floats are accepted only when every value is integral.
pub fn column_to_i64(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let values = column_to_f64(df, name)?;
    values
        .into_iter()
        .map(|v| {
            if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(PipelineError::ShapeError {
                    expected: format!("discrete values in '{}'", name),
                    actual: format!("{}", v),
                })
            }
        })
        .collect()
}

/// Values of any column rendered as strings
pub fn column_to_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = get_column(df, name)?;
    reject_nulls(column, name)?;

    let casted = column.cast(&DataType::String)?;
    let values = casted
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(values)
}

/// Row-major feature matrix from the named columns
pub fn feature_matrix<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let mut x = Array2::zeros((n_rows, columns.len()));
    for (j, name) in columns.iter().enumerate() {
        let values = column_to_f64(df, name.as_ref())?;
        for (i, v) in values.into_iter().enumerate() {
            x[[i, j]] = v;
        }
    }
    Ok(x)
}
