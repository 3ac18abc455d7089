//! Parquet persistence for date partitions.
//!
//! Layout: one file per `record_date`, named `<YYYY-MM-DD>.parquet`, holding
//! all three columns (the date column is kept so each file reads on its own).
//! Existing files are overwritten.
//!
//! Writer properties are fixed and carry no timestamps, so the same partition
//! always encodes to the same bytes.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arrow::array::{Array, ArrayRef, Date32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, TimeDelta};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use tracing::debug;

use crate::domain::{ExchangeRateRecord, Partition, Partitions};
use crate::error::AppError;

pub const COL_COUNTRY_CURRENCY_DESC: &str = "country_currency_desc";
pub const COL_EXCHANGE_RATE: &str = "exchange_rate";
pub const COL_RECORD_DATE: &str = "record_date";

pub fn rates_schema() -> SchemaRef {
    static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(Schema::new(vec![
                Field::new(COL_COUNTRY_CURRENCY_DESC, DataType::Utf8, false),
                Field::new(COL_EXCHANGE_RATE, DataType::Utf8, false),
                Field::new(COL_RECORD_DATE, DataType::Date32, false),
            ]))
        })
        .clone()
}

fn writer_properties() -> &'static WriterProperties {
    static PROPERTIES: OnceLock<WriterProperties> = OnceLock::new();
    PROPERTIES.get_or_init(|| {
        let metadata = vec![KeyValue {
            key: "quarterly_fx.version".to_string(),
            value: Some(env!("CARGO_PKG_VERSION").to_string()),
        }];

        WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_dictionary_enabled(true)
            .set_statistics_enabled(EnabledStatistics::Chunk)
            .set_key_value_metadata(Some(metadata))
            .build()
    })
}

/// Write every partition to `dir`, in ascending date order.
///
/// Returns the written paths in the same order. Not transactional: a failure
/// part-way leaves earlier files in place.
pub fn write_partitions(dir: &Path, partitions: &Partitions) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let mut written = Vec::with_capacity(partitions.len());
    for partition in partitions.values() {
        let path = dir.join(partition.file_name());
        write_partition(&path, partition)?;
        written.push(path);
    }
    Ok(written)
}

/// Write one partition to `path`, replacing any existing file.
pub fn write_partition(path: &Path, partition: &Partition) -> Result<(), AppError> {
    let batch = to_record_batch(&partition.records)?;

    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_properties().clone()))
        .map_err(|e| AppError::io(format!("Failed to create Parquet writer for '{}': {e}", path.display())))?;
    writer
        .write(&batch)
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
    writer
        .close()
        .map_err(|e| AppError::io(format!("Failed to finalize '{}': {e}", path.display())))?;

    debug!(path = %path.display(), rows = partition.len(), "wrote partition");
    Ok(())
}

/// Load the records stored in one partition file.
pub fn read_partition(path: &Path) -> Result<Vec<ExchangeRateRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open '{}': {e}", path.display())))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|builder| builder.build())
        .map_err(|e| AppError::io(format!("Failed to read Parquet '{}': {e}", path.display())))?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| AppError::io(format!("Failed to decode '{}': {e}", path.display())))?;
        out.extend(from_record_batch(&batch).map_err(|msg| {
            AppError::io(format!("Unexpected layout in '{}': {msg}", path.display()))
        })?);
    }
    Ok(out)
}

/// Load every `*.parquet` file in `dir`, sorted by file name.
pub fn read_partitions(dir: &Path) -> Result<Vec<(PathBuf, Vec<ExchangeRateRecord>)>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::io(format!("Failed to list '{}': {e}", dir.display())))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| AppError::io(format!("Failed to list '{}': {e}", dir.display())))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let records = read_partition(&path)?;
            Ok((path, records))
        })
        .collect()
}

fn to_record_batch(records: &[ExchangeRateRecord]) -> Result<RecordBatch, AppError> {
    let descs = StringArray::from_iter_values(records.iter().map(|r| r.country_currency_desc.as_str()));
    let rates = StringArray::from_iter_values(records.iter().map(|r| r.exchange_rate.as_str()));
    let dates = records
        .iter()
        .map(|r| date_to_days(r.record_date))
        .collect::<Option<Vec<i32>>>()
        .ok_or_else(|| AppError::io("record_date outside the Date32 range"))?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(descs),
        Arc::new(rates),
        Arc::new(Date32Array::from(dates)),
    ];
    RecordBatch::try_new(rates_schema(), columns)
        .map_err(|e| AppError::io(format!("Failed to build record batch: {e}")))
}

fn from_record_batch(batch: &RecordBatch) -> Result<Vec<ExchangeRateRecord>, String> {
    let descs = string_column(batch, COL_COUNTRY_CURRENCY_DESC)?;
    let rates = string_column(batch, COL_EXCHANGE_RATE)?;
    let dates = batch
        .column_by_name(COL_RECORD_DATE)
        .and_then(|c| c.as_any().downcast_ref::<Date32Array>())
        .ok_or_else(|| format!("missing Date32 column '{COL_RECORD_DATE}'"))?;

    (0..batch.num_rows())
        .map(|i| {
            if descs.is_null(i) || rates.is_null(i) || dates.is_null(i) {
                return Err(format!("null value in row {i}"));
            }
            let record_date =
                days_to_date(dates.value(i)).ok_or_else(|| format!("invalid record_date in row {i}"))?;
            Ok(ExchangeRateRecord {
                country_currency_desc: descs.value(i).to_string(),
                exchange_rate: rates.value(i).to_string(),
                record_date,
            })
        })
        .collect()
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, String> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| format!("missing Utf8 column '{name}'"))
}

// Date32 stores days since 1970-01-01.
fn date_to_days(date: NaiveDate) -> Option<i32> {
    i32::try_from(date.signed_duration_since(NaiveDate::default()).num_days()).ok()
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(TimeDelta::try_days(i64::from(days))?)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::io::ingest::partition;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(desc: &str, rate: &str, date: NaiveDate) -> ExchangeRateRecord {
        ExchangeRateRecord {
            country_currency_desc: desc.to_string(),
            exchange_rate: rate.to_string(),
            record_date: date,
        }
    }

    fn sample_partitions() -> Partitions {
        let records = vec![
            record("Canada-Dollar", "1.35", ymd(2024, 3, 31)),
            record("Euro Zone-Euro", "0.92", ymd(2024, 3, 31)),
            record("Canada-Dollar", "1.36", ymd(2024, 6, 30)),
        ];
        partition(records, 3).unwrap()
    }

    #[test]
    fn date32_conversion_is_epoch_days() {
        assert_eq!(date_to_days(ymd(1970, 1, 1)), Some(0));
        assert_eq!(date_to_days(ymd(1970, 1, 2)), Some(1));
        assert_eq!(date_to_days(ymd(1969, 12, 31)), Some(-1));
        let d = ymd(2024, 3, 31);
        assert_eq!(days_to_date(date_to_days(d).unwrap()), Some(d));
    }

    #[test]
    fn writes_one_file_per_date_and_reads_back() {
        let dir = tempdir().unwrap();
        let partitions = sample_partitions();

        let written = write_partitions(dir.path(), &partitions).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2024-03-31.parquet", "2024-06-30.parquet"]);

        for (path, partition) in written.iter().zip(partitions.values()) {
            assert_eq!(read_partition(path).unwrap(), partition.records);
        }

        let loaded = read_partitions(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].0, written[0]);
        assert_eq!(loaded[1].1.len(), 1);
    }

    #[test]
    fn rewriting_is_byte_identical() {
        let dir = tempdir().unwrap();
        let partitions = sample_partitions();

        let first = write_partitions(dir.path(), &partitions).unwrap();
        let before: Vec<Vec<u8>> = first.iter().map(|p| fs::read(p).unwrap()).collect();

        let second = write_partitions(dir.path(), &partitions).unwrap();
        let after: Vec<Vec<u8>> = second.iter().map(|p| fs::read(p).unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(before, after);
    }

    #[test]
    fn existing_file_is_overwritten_not_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2024-03-31.parquet");
        fs::write(&path, b"stale").unwrap();

        let partitions = sample_partitions();
        write_partitions(dir.path(), &partitions).unwrap();

        let records = read_partition(&path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn read_partitions_skips_other_files() {
        let dir = tempdir().unwrap();
        write_partitions(dir.path(), &sample_partitions()).unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let loaded = read_partitions(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn creates_missing_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("fx").join("quarterly");
        let written = write_partitions(&nested, &sample_partitions()).unwrap();
        assert!(written.iter().all(|p| p.exists()));
    }
}
