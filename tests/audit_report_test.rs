//! Integration tests for CSV audit reports.

use chrono::{Local, TimeZone};
use folha_status::audit::{AuditLabel, AuditRecord, AuditWriter};
use std::fs;

fn record(label: AuditLabel) -> AuditRecord {
    AuditRecord {
        timestamp: Local.with_ymd_and_hms(2024, 11, 29, 18, 30, 5).unwrap(),
        server: "db1".to_string(),
        database: "payroll".to_string(),
        ids: "1,2,3".to_string(),
        label,
    }
}

fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("report should be readable");
    reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

#[test]
fn test_report_creates_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("relatorios");
    assert!(!dir.exists());

    let writer = AuditWriter::new(&dir);
    let path = writer
        .append(&record(AuditLabel::Processed))
        .expect("report should be written");

    assert!(dir.is_dir());
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "fechamento_2024-11-29_18-30-05.csv"
    );
}

#[test]
fn test_report_has_header_and_one_data_row() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = AuditWriter::new(tmp.path());
    let path = writer.append(&record(AuditLabel::Processed)).unwrap();

    let rows = read_rows(&path);
    assert_eq!(
        rows,
        vec![
            vec!["Data", "Servidor", "Banco", "IDs Processados"],
            vec!["2024-11-29 18:30:05", "db1", "payroll", "1,2,3"],
        ]
    );
}

#[test]
fn test_report_quotes_id_list() {
    let tmp = tempfile::tempdir().unwrap();
    let path = AuditWriter::new(tmp.path())
        .append(&record(AuditLabel::Processed))
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(
        raw,
        "Data,Servidor,Banco,IDs Processados\n2024-11-29 18:30:05,db1,payroll,\"1,2,3\"\n"
    );
}

#[test]
fn test_restricted_label() {
    let tmp = tempfile::tempdir().unwrap();
    let path = AuditWriter::new(tmp.path())
        .append(&record(AuditLabel::Closed))
        .unwrap();

    let rows = read_rows(&path);
    assert_eq!(rows[0][3], "IDs Fechados");
}

#[test]
fn test_existing_directory_is_reused() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("other.txt"), "keep me").unwrap();

    let path = AuditWriter::new(tmp.path())
        .append(&record(AuditLabel::Processed))
        .unwrap();

    assert!(path.exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("other.txt")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_same_second_reports_do_not_overwrite() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = AuditWriter::new(tmp.path());

    let first = writer.append(&record(AuditLabel::Processed)).unwrap();
    let mut second_record = record(AuditLabel::Processed);
    second_record.ids = "4".to_string();
    let second = writer.append(&second_record).unwrap();

    assert_ne!(first, second);
    assert_eq!(
        second.file_name().unwrap().to_str().unwrap(),
        "fechamento_2024-11-29_18-30-05_1.csv"
    );
    assert_eq!(read_rows(&first)[1][3], "1,2,3");
    assert_eq!(read_rows(&second)[1][3], "4");
}

#[test]
fn test_write_failure_is_swallowed() {
    let tmp = tempfile::tempdir().unwrap();
    // A regular file where the directory should be.
    let blocked = tmp.path().join("relatorios");
    fs::write(&blocked, "not a directory").unwrap();

    let result = AuditWriter::new(&blocked).append(&record(AuditLabel::Processed));
    assert!(result.is_none());
}
