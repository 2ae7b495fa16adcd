use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::RawSeries;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw 2D-LC trace from a file.  Dispatch by extension.
///
/// Column 0 is the acquisition time (minutes), column 1 the intensity.
///
/// Supported formats:
/// * `.parquet` – first two numeric columns
/// * `.json`    – `{ "time": [...], "intensity": [...] }` or `[[t, i], ...]`
/// * `.csv`     – comma-separated
/// * `.tsv` / `.txt` – tab-separated
///
/// `has_headers` skips the first line of delimited text files; JSON and
/// Parquet carry their own schema and ignore it.
pub fn load_file(path: &Path, has_headers: bool) -> Result<RawSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_delimited(path, b',', has_headers)?,
        "tsv" | "txt" => load_delimited(path, b'\t', has_headers)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    if raw.len() < 2 {
        bail!("{} holds {} samples, need at least 2", path.display(), raw.len());
    }
    Ok(raw)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Two leading columns of floats; any further columns are ignored.
fn load_delimited(path: &Path, delimiter: u8, has_headers: bool) -> Result<RawSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening delimited text file")?;

    let mut time = Vec::new();
    let mut intensity = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        time.push(parse_cell(record.get(0), row_no, "time")?);
        intensity.push(parse_cell(record.get(1), row_no, "intensity")?);
    }

    RawSeries::new(time, intensity).context("building raw series")
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = cell.with_context(|| format!("Row {row}: missing '{col}' column"))?;
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Either column-oriented:
///
/// ```json
/// { "time": [0.0, 0.004, ...], "intensity": [12.1, 12.4, ...] }
/// ```
///
/// or row-oriented pairs:
///
/// ```json
/// [[0.0, 12.1], [0.004, 12.4], ...]
/// ```
fn load_json(path: &Path) -> Result<RawSeries> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let (time, intensity) = match &root {
        JsonValue::Object(obj) => (
            json_array_to_f64(obj.get("time"), "time")?,
            json_array_to_f64(obj.get("intensity"), "intensity")?,
        ),
        JsonValue::Array(rows) => {
            let mut time = Vec::with_capacity(rows.len());
            let mut intensity = Vec::with_capacity(rows.len());
            for (i, row) in rows.iter().enumerate() {
                let pair = row
                    .as_array()
                    .filter(|p| p.len() >= 2)
                    .with_context(|| format!("Row {i} is not a [time, intensity] pair"))?;
                time.push(pair[0].as_f64().with_context(|| format!("Row {i}, time: not a number"))?);
                intensity.push(
                    pair[1]
                        .as_f64()
                        .with_context(|| format!("Row {i}, intensity: not a number"))?,
                );
            }
            (time, intensity)
        }
        _ => bail!("Expected a JSON object or array at the top level"),
    };

    RawSeries::new(time, intensity).context("building raw series")
}

fn json_array_to_f64(val: Option<&JsonValue>, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("{col}[{j}]: not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding a raw trace.
///
/// The first two numeric columns (Float64, Float32, Int64, Int32) are taken
/// as time and intensity, whatever their names. Works with files written by
/// both **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawSeries> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let numeric: Vec<usize> = builder
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| is_numeric(f.data_type()))
        .map(|(i, _)| i)
        .take(2)
        .collect();
    let [t_idx, y_idx] = numeric[..] else {
        bail!("Parquet file needs two numeric columns, found {}", numeric.len());
    };

    let reader = builder.build().context("building parquet reader")?;

    let mut time = Vec::new();
    let mut intensity = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        time.extend(extract_f64_column(batch.column(t_idx)).context("reading time column")?);
        intensity.extend(
            extract_f64_column(batch.column(y_idx)).context("reading intensity column")?,
        );
    }

    RawSeries::new(time, intensity).context("building raw series")
}

// -- Parquet / Arrow helpers --

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32
    )
}

/// Widen a numeric column to `f64`; nulls become `NaN`.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    let values = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, |i| i as f64))
            .collect(),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        std::fs::write(&path, "Time,Intensity\n0.0, 1.5\n0.5,2.5\n\n1.0,3.5\n").unwrap();

        let raw = load_file(&path, true).unwrap();
        assert_eq!(raw.time(), &[0.0, 0.5, 1.0]);
        assert_eq!(raw.intensity(), &[1.5, 2.5, 3.5]);
    }

    #[test]
    fn header_must_be_declared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        std::fs::write(&path, "Time,Intensity\n0.0,1.5\n0.5,2.5\n").unwrap();
        assert!(load_file(&path, false).is_err());
    }

    #[test]
    fn tsv_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");
        std::fs::write(&path, "0\t10\tA\n1\t11\tB\n2\t12\tC\n").unwrap();
        let raw = load_file(&path, false).unwrap();
        assert_eq!(raw.intensity(), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn json_both_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let cols = dir.path().join("cols.json");
        std::fs::write(&cols, r#"{"time": [0, 1, 2], "intensity": [5, 6, 7]}"#).unwrap();
        let pairs = dir.path().join("pairs.json");
        std::fs::write(&pairs, "[[0, 5], [1, 6], [2, 7]]").unwrap();

        let a = load_file(&cols, false).unwrap();
        let b = load_file(&pairs, false).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.time(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn json_length_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"time": [0, 1, 2], "intensity": [5, 6]}"#).unwrap();
        assert!(load_file(&path, false).is_err());
    }

    #[test]
    fn parquet_takes_first_two_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("label", DataType::Utf8, false),
            Field::new("t", DataType::Float64, false),
            Field::new("signal", DataType::Float32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(arrow::array::StringArray::from(vec!["a", "b", "c"])),
                Arc::new(Float64Array::from(vec![0.0, 0.1, 0.2])),
                Arc::new(Float32Array::from(vec![Some(1.0), None, Some(3.0)])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let raw = load_file(&path, false).unwrap();
        assert_eq!(raw.time(), &[0.0, 0.1, 0.2]);
        assert_eq!(raw.intensity()[0], 1.0);
        assert!(raw.intensity()[1].is_nan());
    }

    #[test]
    fn unknown_extension_and_short_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = dir.path().join("run.xlsx");
        std::fs::write(&xlsx, "").unwrap();
        assert!(load_file(&xlsx, false).is_err());

        let one = dir.path().join("one.csv");
        std::fs::write(&one, "0,1\n").unwrap();
        assert!(load_file(&one, false).is_err());
    }
}
