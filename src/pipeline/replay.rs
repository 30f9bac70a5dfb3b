// src/pipeline/replay.rs

//! Replay archived real-time log files into the ingestion stream.
//!
//! Firehose backups hold the raw lines exactly as they were received. Each
//! line is checked against the schema width and republished verbatim.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{AppError, Result};
use crate::models::LogSchema;
use crate::stream::RecordPublisher;
use crate::utils::fs::list_files;

/// Lines between progress reports.
const PROGRESS_INTERVAL: usize = 1000;

/// Replay behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Skip lines with the wrong field count instead of aborting
    pub skip_invalid: bool,
}

/// Totals of a replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub files: usize,
    pub sent: usize,
    pub skipped: usize,
}

/// Replay every file in `dir`, in name order.
pub async fn run_replay(
    dir: &Path,
    schema: &LogSchema,
    publisher: &dyn RecordPublisher,
    options: ReplayOptions,
) -> Result<ReplaySummary> {
    let files = list_files(dir)?;
    log::info!("Replaying {} files from {}", files.len(), dir.display());

    let mut summary = ReplaySummary::default();
    for path in &files {
        replay_file(path, schema, publisher, options, &mut summary).await?;
        summary.files += 1;
    }

    log::info!(
        "Replay complete: {} files, {} records sent, {} skipped",
        summary.files,
        summary.sent,
        summary.skipped
    );
    Ok(summary)
}

async fn replay_file(
    path: &Path,
    schema: &LogSchema,
    publisher: &dyn RecordPublisher,
    options: ReplayOptions,
    summary: &mut ReplaySummary,
) -> Result<()> {
    log::info!("Replaying {}", path.display());

    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.is_empty() {
            continue;
        }

        let found = line.split('\t').count();
        if found != schema.width() {
            let context = format!("{}:{}", path.display(), line_number);
            if options.skip_invalid {
                log::warn!(
                    "Skipping {}: expected {} fields, found {}",
                    context,
                    schema.width(),
                    found
                );
                summary.skipped += 1;
                continue;
            }
            return Err(AppError::Schema {
                context,
                expected: schema.width(),
                found,
            });
        }

        let receipt = publisher.publish(&line).await?;
        summary.sent += 1;
        log::debug!(
            "Sent {}:{} -> {} :: {}",
            path.display(),
            line_number,
            receipt.shard_id,
            receipt.sequence_number
        );
        if summary.sent % PROGRESS_INTERVAL == 0 {
            log::info!("{} records sent", summary.sent);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::tests::SAMPLE_LINE;
    use crate::stream::tests::MemoryPublisher;

    fn write_backup(dir: &Path, name: &str, lines: &[&str]) {
        std::fs::write(dir.join(name), lines.join("\n")).unwrap();
    }

    #[tokio::test]
    async fn test_replay_sends_lines_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let second = SAMPLE_LINE.replacen("200", "404", 1);
        write_backup(dir.path(), "b-backup", &[second.as_str()]);
        write_backup(dir.path(), "a-backup", &[SAMPLE_LINE, "", SAMPLE_LINE]);

        let publisher = MemoryPublisher::default();
        let summary = run_replay(
            dir.path(),
            &LogSchema::default(),
            &publisher,
            ReplayOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                files: 2,
                sent: 3,
                skipped: 0
            }
        );
        let lines = publisher.lines.lock().unwrap();
        assert_eq!(lines[0], SAMPLE_LINE);
        assert_eq!(lines[2], second);
    }

    #[tokio::test]
    async fn test_replay_aborts_on_invalid_line() {
        let dir = tempfile::tempdir().unwrap();
        write_backup(dir.path(), "backup", &[SAMPLE_LINE, "only\ttwo"]);

        let publisher = MemoryPublisher::default();
        let err = run_replay(
            dir.path(),
            &LogSchema::default(),
            &publisher,
            ReplayOptions::default(),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Schema {
                context,
                expected,
                found,
            } => {
                assert!(context.ends_with("backup:2"));
                assert_eq!(expected, 27);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(publisher.lines.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replay_validates_whitespace_only_lines() {
        let dir = tempfile::tempdir().unwrap();
        let empty_columns = "\t".repeat(26);
        write_backup(dir.path(), "backup", &[empty_columns.as_str(), "\t\t\t"]);

        let publisher = MemoryPublisher::default();
        let err = run_replay(
            dir.path(),
            &LogSchema::default(),
            &publisher,
            ReplayOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Schema { found: 4, .. }));
        assert_eq!(*publisher.lines.lock().unwrap(), vec![empty_columns]);
    }

    #[tokio::test]
    async fn test_replay_skips_invalid_lines() {
        let dir = tempfile::tempdir().unwrap();
        write_backup(dir.path(), "backup", &["bad", SAMPLE_LINE, "also\tbad"]);

        let publisher = MemoryPublisher::default();
        let summary = run_replay(
            dir.path(),
            &LogSchema::default(),
            &publisher,
            ReplayOptions { skip_invalid: true },
        )
        .await
        .unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[tokio::test]
    async fn test_replay_missing_directory() {
        let publisher = MemoryPublisher::default();
        let result = run_replay(
            Path::new("/nonexistent/backup"),
            &LogSchema::default(),
            &publisher,
            ReplayOptions::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
