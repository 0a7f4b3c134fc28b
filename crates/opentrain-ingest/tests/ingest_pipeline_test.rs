//! Batch ingestor behaviour against in-memory fakes

mod common;

use common::{init_test_tracing, stop_file, stop_line, write_lines, CountingSchema, MemorySession};
use opentrain_ingest::{ingest, IngestError, IngestOptions, RecordError, Session};

#[tokio::test]
async fn test_batches_are_ceil_of_lines_over_commit_every() {
    init_test_tracing();

    for (lines, commit_every, expected_batches) in [(10, 3, 4), (9, 3, 3), (1, 10_000, 1), (5, 1, 5)] {
        let file = stop_file(lines);
        let mut schema = CountingSchema::default();
        let mut session = MemorySession::default();
        let options = IngestOptions::default().with_commit_every(commit_every);

        let report = ingest(file.path(), &mut schema, &mut session, &options)
            .await
            .expect("ingest should succeed");

        assert_eq!(report.batches, expected_batches, "{lines} lines / {commit_every}");
        assert_eq!(report.lines_read, lines);
        assert_eq!(report.rows_written, lines as u64);
        assert_eq!(session.durable.len(), lines);
        assert_eq!(session.pending(), 0);
    }
}

#[tokio::test]
async fn test_rows_keep_file_order() {
    let file = stop_file(7);
    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();

    ingest(
        file.path(),
        &mut schema,
        &mut session,
        &IngestOptions::default().with_commit_every(2),
    )
    .await
    .expect("ingest should succeed");

    let trains: Vec<i32> = session.durable.iter().map(|s| s.train_num).collect();
    assert_eq!(trains, (100..107).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_malformed_line_aborts_and_keeps_committed_batches() {
    init_test_tracing();

    let commit_every = 3;
    let bad_line = 8;

    let mut lines: Vec<String> = (0..10).map(|i| stop_line(200 + i, 3700)).collect();
    lines[bad_line - 1] = "20130115\t\"207\"\t06x0\t0603\t0605\t0607\t3700".to_string();
    let file = write_lines(&lines);

    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();
    let options = IngestOptions::default().with_commit_every(commit_every);

    let err = ingest(file.path(), &mut schema, &mut session, &options)
        .await
        .expect_err("line 8 is malformed");

    match err {
        IngestError::MalformedRecord { line, source } => {
            assert_eq!(line, bad_line);
            assert!(matches!(source, RecordError::Decode { field: "arrive_expected", .. }));
        },
        other => panic!("unexpected error: {other}"),
    }

    // k * floor((j - 1) / k)
    assert_eq!(session.durable.len(), commit_every * ((bad_line - 1) / commit_every));
    assert_eq!(session.durable.len(), 6);
    assert_eq!(session.pending(), 1);
}

#[tokio::test]
async fn test_short_line_reports_missing_fields() {
    let file = write_lines(&[stop_line(1, 1), "20130115\t\"2\"\t0600\t0603\t0605".to_string()]);
    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();

    let err = ingest(file.path(), &mut schema, &mut session, &IngestOptions::default())
        .await
        .expect_err("second line has five fields");

    assert!(matches!(
        err,
        IngestError::MalformedRecord {
            line: 2,
            source: RecordError::MissingFields { expected: 7, found: 5 },
        }
    ));
    assert!(session.durable.is_empty());
}

#[tokio::test]
async fn test_empty_file_only_resets() {
    let file = write_lines(&[]);
    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();

    let report = ingest(file.path(), &mut schema, &mut session, &IngestOptions::default())
        .await
        .expect("empty file is fine");

    assert_eq!((schema.drops, schema.creates), (1, 1));
    assert_eq!(report.lines_read, 0);
    assert_eq!(report.batches, 0);
    assert_eq!(session.commits, 1);
    assert!(session.durable.is_empty());
}

#[tokio::test]
async fn test_max_lines_caps_the_run() {
    let file = stop_file(25);
    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();
    let options = IngestOptions::default()
        .with_commit_every(10)
        .with_max_lines(12);

    let report = ingest(file.path(), &mut schema, &mut session, &options)
        .await
        .expect("ingest should succeed");

    assert_eq!(report.lines_read, 12);
    assert_eq!(report.rows_written, 12);
    assert_eq!(report.batches, 2);
}

#[tokio::test]
async fn test_missing_file_fails_after_reset() {
    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();

    let err = ingest(
        std::path::Path::new("/nonexistent/stops.tsv"),
        &mut schema,
        &mut session,
        &IngestOptions::default(),
    )
    .await
    .expect_err("file does not exist");

    assert!(matches!(err, IngestError::Io { .. }));
    assert_eq!(schema.drops, 1);
}

#[tokio::test]
async fn test_invalid_utf8_line_reports_line_number() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let mut contents = format!("{}\n", stop_line(1, 1)).into_bytes();
    contents.extend_from_slice(b"20130115\t\"2\"\t0600\t0603\t0605\t0607\t37\xff00\n");
    contents.extend_from_slice(format!("{}\n", stop_line(3, 1)).as_bytes());
    std::io::Write::write_all(&mut file, &contents).expect("Failed to write temp file");

    let mut schema = CountingSchema::default();
    let mut session = MemorySession::default();

    let err = ingest(file.path(), &mut schema, &mut session, &IngestOptions::default())
        .await
        .expect_err("second line is not UTF-8");

    assert!(matches!(
        err,
        IngestError::MalformedRecord {
            line: 2,
            source: RecordError::Encoding(_),
        }
    ));
    assert_eq!(session.pending(), 1);
    assert!(session.durable.is_empty());
}
