use polars::prelude::*;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

pub fn polars_err(msg: impl Into<String>) -> PolarsError {
    PolarsError::ComputeError(msg.into().into())
}

fn empty_string_frame(column_names: &[&str]) -> PolarsResult<DataFrame> {
    let series: Vec<Series> = column_names
        .iter()
        .map(|name| Series::new(PlSmallStr::from(*name), Vec::<String>::new()))
        .collect();
    DataFrame::new(series.into_iter().map(Into::into).collect())
}

/// Headerless TSV reader. Every column is read as String so ids like
/// `0008150` keep their leading zeros. The first `column_names.len()` columns
/// get those names; anything to the right is kept as `extra_N`.
pub fn read_headerless_tsv(path: &Path, column_names: &[&str]) -> PolarsResult<DataFrame> {
    // Leading blank lines are skipped; the first populated line fixes the width.
    let (blank_lines, first_line) = {
        let file = File::open(path).map_err(|e| polars_err(format!("{}: {}", path.display(), e)))?;
        let mut blank_lines = 0usize;
        let mut first_line = None;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| polars_err(format!("{}: {}", path.display(), e)))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                blank_lines += 1;
            } else {
                first_line = Some(line.to_string());
                break;
            }
        }
        (blank_lines, first_line)
    };
    let Some(first_line) = first_line else {
        warn!("{} is empty", path.display());
        return empty_string_frame(column_names);
    };
    if blank_lines > 0 {
        debug!("Skipping {} leading blank line(s) in {}", blank_lines, path.display());
    }

    let field_count = first_line.split('\t').count();
    if field_count < column_names.len() {
        return Err(polars_err(format!(
            "{} has {} tab-separated columns, expected at least {} ({})",
            path.display(),
            field_count,
            column_names.len(),
            column_names.join(", ")
        )));
    }
    let dtype_override: Arc<Vec<DataType>> = Arc::new(vec![DataType::String; field_count]);

    let mut df = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(blank_lines)
        .with_dtype_overwrite(Some(dtype_override))
        .map_parse_options(|mut o| {
            o.separator = b'\t';
            o.quote_char = None;
            o.encoding = CsvEncoding::LossyUtf8;
            o.truncate_ragged_lines = true;
            o
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let names: Vec<PlSmallStr> = (0..df.width())
        .map(|i| match column_names.get(i) {
            Some(name) => PlSmallStr::from(*name),
            None => PlSmallStr::from(format!("extra_{}", i - column_names.len() + 1)),
        })
        .collect();
    df.set_column_names(names)?;
    debug!("Read {} rows x {} cols from {}", df.height(), df.width(), path.display());

    Ok(df)
}

/// Zips two string columns into owned pairs, dropping rows where either side is null.
pub fn string_pairs(df: &DataFrame, left: &str, right: &str) -> PolarsResult<Vec<(String, String)>> {
    let left_values = df.column(left)?.str()?;
    let right_values = df.column(right)?.str()?;

    let mut pairs = Vec::with_capacity(df.height());
    for (row, (l, r)) in left_values.into_iter().zip(right_values.into_iter()).enumerate() {
        match (l, r) {
            (Some(l), Some(r)) => pairs.push((l.to_string(), r.to_string())),
            _ => warn!("Skipping row {}: missing `{}` or `{}`", row + 1, left, right),
        }
    }
    Ok(pairs)
}
