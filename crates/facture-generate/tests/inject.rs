use std::path::{Path, PathBuf};

use facture_core::{AttrSpec, GroupInput, RowInput, TableConfig, Tables, TargetSpec};
use facture_generate::FactureEngine;
use uuid::Uuid;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("facture_inject_it_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn marker(target: &str, position: &str) -> String {
    format!("-- facture_json: {{\"target_name\": \"{target}\", \"position\": \"{position}\"}}\n")
}

/// `total` numbered lines with markers for each `(target, start, end)`.
fn target_file(total: usize, regions: &[(&str, usize, usize)]) -> String {
    (1..=total)
        .map(|linenum| {
            for (target, start, end) in regions {
                if linenum == *start {
                    return marker(target, "start");
                }
                if linenum == *end {
                    return marker(target, "end");
                }
            }
            format!("line {linenum}\n")
        })
        .collect()
}

fn products_tables(target: &str) -> Tables {
    let mut tables = Tables::new();
    tables.insert(
        "products".to_string(),
        TableConfig {
            target: Some(target.to_string()),
            attrs: vec![AttrSpec::with_seq("id", 1000), AttrSpec::with_default("name", "thing")],
        },
    );
    tables
}

fn lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read target file")
}

#[test]
fn rows_land_between_markers() {
    let dir = temp_dir();
    let path = dir.join("seed.sql");
    let original = target_file(12, &[("products", 5, 9)]);
    std::fs::write(&path, &original).expect("write seed");

    let targets = vec![TargetSpec::section_in_file("products", &path)];
    let inputs = vec![
        GroupInput::new("facture_group_a", 100)
            .row(RowInput::new("products p1"))
            .row(RowInput::new("products p2")),
    ];
    let engine = FactureEngine::default();
    let result = engine
        .run(inputs, &products_tables("products"), &targets)
        .expect("run");
    let report = engine.inject(&result, &targets).expect("inject");

    let blocks: Vec<String> = result.groups[0]
        .data
        .iter()
        .map(|row| row.output_sql.clone().expect("sql"))
        .collect();
    let updated = read(&path);
    let before = lines(&original);
    let after = lines(&updated);

    assert_eq!(after[..5], before[..5]);
    let tail = &before[8..];
    assert_eq!(after[after.len() - tail.len()..], *tail);

    let expected_payload = format!("\n{}\n\n", blocks.join(",\n\n"));
    let start = before[..5].concat().len();
    let end = updated.len() - tail.concat().len();
    assert_eq!(&updated[start..end], expected_payload);

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].targets[0].rows, 2);
    assert_eq!(report.files[0].targets[0].span.start_line, 5);
    assert_eq!(report.files[0].targets[0].span.end_line, 9);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn two_targets_in_one_file() {
    let dir = temp_dir();
    let path = dir.join("seed.sql");
    let original = target_file(60, &[("first", 5, 10), ("second", 50, 55)]);
    std::fs::write(&path, &original).expect("write seed");

    let mut tables = products_tables("first");
    tables.insert(
        "users".to_string(),
        TableConfig {
            target: Some("second".to_string()),
            attrs: vec![AttrSpec::with_seq("id", 10)],
        },
    );
    let targets = vec![
        TargetSpec::section_in_file("first", &path),
        TargetSpec::section_in_file("second", &path),
    ];
    let inputs = vec![
        GroupInput::new("facture_group_a", 100)
            .row(RowInput::new("products p"))
            .row(RowInput::new("users u")),
    ];
    let engine = FactureEngine::default();
    let result = engine.run(inputs, &tables, &targets).expect("run");
    engine.inject(&result, &targets).expect("inject");

    let updated = read(&path);
    let before = lines(&original);
    let after = lines(&updated);

    let product_sql = result.groups[0].data[0].output_sql.clone().expect("sql");
    let user_sql = result.groups[0].data[1].output_sql.clone().expect("sql");
    let first_payload = format!("\n{product_sql}\n\n");
    let second_payload = format!("\n{user_sql}\n\n");

    let expected = [
        before[..5].concat(),
        first_payload,
        before[9..50].concat(),
        second_payload,
        before[54..].concat(),
    ]
    .concat();
    assert_eq!(updated, expected);
    assert_eq!(after[..5], before[..5]);
    assert_eq!(after[after.len() - 6..], before[54..]);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_markers_leave_the_file_alone() {
    let dir = temp_dir();
    let path = dir.join("seed.sql");
    let original = target_file(8, &[]);
    std::fs::write(&path, &original).expect("write seed");

    let targets = vec![TargetSpec::section_in_file("products", &path)];
    let inputs = vec![GroupInput::new("facture_group_a", 100).row(RowInput::new("products p"))];
    let engine = FactureEngine::default();
    let result = engine
        .run(inputs, &products_tables("products"), &targets)
        .expect("run");
    let err = engine.inject(&result, &targets).expect_err("no markers");

    assert_eq!(err.to_string(), "could not find a start for target products");
    assert_eq!(read(&path), original);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_target_file_is_an_io_error() {
    let dir = temp_dir();
    let path = dir.join("absent.sql");
    let targets = vec![TargetSpec::section_in_file("products", &path)];
    let inputs = vec![GroupInput::new("facture_group_a", 100).row(RowInput::new("products p"))];
    let engine = FactureEngine::default();
    let result = engine
        .run(inputs, &products_tables("products"), &targets)
        .expect("run");

    let err = engine.inject(&result, &targets).expect_err("absent file");
    assert!(matches!(err, facture_core::FactureError::Io { .. }));
    std::fs::remove_dir_all(&dir).ok();
}
