//! The ingestion pipeline, independent of argument parsing and printing:
//! fetch -> completeness check + partition -> write -> optional read-back.
//!
//! Partitioning (and so the completeness check) finishes before the first
//! file is written, so an inconsistent fetch never reaches disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::{Transport, TreasuryClient};
use crate::domain::{Partitions, QueryBoundary};
use crate::error::AppError;
use crate::io::{ingest, parquet};

/// Everything a single run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub boundary: QueryBoundary,
    pub pages: usize,
    pub records: usize,
    /// Written files, ascending by record date.
    pub files: Vec<PathBuf>,
}

/// Execute the full ingestion pipeline and return what it produced.
pub fn run_ingest<T: Transport>(
    client: &TreasuryClient<T>,
    boundary: &QueryBoundary,
    output_dir: &Path,
    verify: bool,
) -> Result<RunOutput, AppError> {
    // 1) Fetch every page since the boundary.
    let fetched = client.fetch_all(boundary)?;
    let pages = fetched.pages;

    // 2) Check the count against the declared total and group by date.
    let partitions = ingest::partition(fetched.records, fetched.declared_total)?;
    let records = ingest::record_count(&partitions);
    info!(partitions = partitions.len(), records, "validated fetch");

    // 3) Write one Parquet file per date.
    let files = parquet::write_partitions(output_dir, &partitions)?;

    // 4) Optionally read the files back.
    if verify {
        verify_written(&files, &partitions)?;
        info!(files = files.len(), "verified written partitions");
    }

    Ok(RunOutput {
        boundary: *boundary,
        pages,
        records,
        files,
    })
}

/// Read each written file back and compare its row count to the partition
/// it came from.
pub fn verify_written(files: &[PathBuf], partitions: &Partitions) -> Result<(), AppError> {
    for (path, partition) in files.iter().zip(partitions.values()) {
        let stored = parquet::read_partition(path)?;
        if stored.len() != partition.len() {
            return Err(AppError::io(format!(
                "Read-back of '{}' found {} rows, expected {}.",
                path.display(),
                stored.len(),
                partition.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::*;
    use crate::config::RatesConfig;
    use crate::data::scripted::{ScriptedTransport, page_body};
    use crate::error::ErrorKind;

    fn boundary() -> QueryBoundary {
        QueryBoundary::new(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
    }

    fn client(responses: Vec<(u16, String)>) -> TreasuryClient<ScriptedTransport> {
        TreasuryClient::new(ScriptedTransport::new(responses), &RatesConfig::default())
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn multi_page_run_writes_one_file_per_date() {
        let dir = tempdir().unwrap();
        let client = client(vec![
            (
                200,
                page_body(
                    &[
                        ("Canada-Dollar", "1.35", "2023-12-31"),
                        ("Canada-Dollar", "1.35", "2024-03-31"),
                        ("Euro Zone-Euro", "0.92", "2024-03-31"),
                    ],
                    Some(6),
                    Some("&page%5Bnumber%5D=2"),
                ),
            ),
            (
                200,
                page_body(
                    &[
                        ("Japan-Yen", "151.2", "2024-03-31"),
                        ("Canada-Dollar", "1.36", "2024-06-30"),
                        ("Euro Zone-Euro", "0.93", "2024-06-30"),
                    ],
                    Some(6),
                    None,
                ),
            ),
        ]);

        let run = run_ingest(&client, &boundary(), dir.path(), true).unwrap();
        assert_eq!(run.pages, 2);
        assert_eq!(run.records, 6);
        assert_eq!(
            file_names(dir.path()),
            vec!["2023-12-31.parquet", "2024-03-31.parquet", "2024-06-30.parquet"]
        );

        let counts: Vec<usize> = run
            .files
            .iter()
            .map(|p| parquet::read_partition(p).unwrap().len())
            .collect();
        assert_eq!(counts, vec![1, 3, 2]);
    }

    #[test]
    fn completeness_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let client = client(vec![(
            200,
            page_body(&[("Canada-Dollar", "1.35", "2024-03-31")], Some(2), None),
        )]);

        let err = run_ingest(&client, &boundary(), dir.path(), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Completeness);
        assert!(file_names(dir.path()).is_empty());
    }

    #[test]
    fn fetch_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let client = client(vec![
            (
                200,
                page_body(&[("Canada-Dollar", "1.35", "2024-03-31")], Some(2), Some("&page%5Bnumber%5D=2")),
            ),
            (404, "{}".to_string()),
        ]);

        let err = run_ingest(&client, &boundary(), dir.path(), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.status(), Some(404));
        assert!(file_names(dir.path()).is_empty());
    }

    #[test]
    fn verify_catches_mismatched_files() {
        let dir = tempdir().unwrap();
        let client = client(vec![(
            200,
            page_body(
                &[
                    ("Canada-Dollar", "1.35", "2024-03-31"),
                    ("Canada-Dollar", "1.36", "2024-06-30"),
                ],
                Some(2),
                None,
            ),
        )]);
        let run = run_ingest(&client, &boundary(), dir.path(), false).unwrap();

        let fetched = vec![
            crate::domain::ExchangeRateRecord {
                country_currency_desc: "Canada-Dollar".to_string(),
                exchange_rate: "1.35".to_string(),
                record_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            };
            2
        ];
        let bigger = ingest::partition(fetched, 2).unwrap();

        let err = verify_written(&run.files[..1], &bigger).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
