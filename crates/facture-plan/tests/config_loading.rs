use std::path::{Path, PathBuf};

use facture_core::ReferenceRegistry;
use facture_plan::{
    PlanError, RowEntry, config_json_schema_value, load_config, load_config_dir,
};
use serde_json::json;
use uuid::Uuid;

fn example_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs/examples")
        .join(name)
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("facture_plan_it_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn retail_example_loads_without_warnings() {
    let loaded =
        load_config_dir(&example_dir("retail"), &ReferenceRegistry::new()).expect("load retail");

    assert!(loaded.warnings.is_empty(), "unexpected warnings");
    assert_eq!(loaded.config.tables.len(), 3);
    assert_eq!(loaded.config.groups.len(), 2);
    assert_eq!(loaded.config.groups[0].offset, 10000);
    let products = &loaded.config.tables["products"];
    let names: Vec<&str> = products.attr_names().collect();
    assert_eq!(names, vec!["id", "classified_code", "created_at", "updated_at"]);
    assert_eq!(products.attrs[0].seq.map(|seq| seq.start), Some(21000000000));

    let rp1 = &loaded.config.groups[0].data[3];
    assert_eq!(rp1.tablestr(), "retailer_products rp1");
    assert_eq!(
        rp1.body().and_then(|body| body.refs.get("product_id")),
        Some(&json!(".p1.id"))
    );
}

#[test]
fn workflows_example_builds_reference_objects() {
    let registry = ReferenceRegistry::new();
    let loaded = load_config_dir(&example_dir("workflows"), &registry).expect("load workflows");

    assert_eq!(loaded.config.targets.len(), 3);
    assert_eq!(loaded.config.targets[0].kind, "section_in_file");
    assert_eq!(loaded.config.targets[0].section_name.as_deref(), Some("users"));

    let inputs = loaded.config.to_group_inputs(&registry).expect("inputs");
    let w_1 = &inputs[0].data[4];
    assert_eq!(w_1.tablestr, "workflows w_1");
    assert_eq!(
        w_1.ref_objs["query"].anchors(),
        vec![".p_1.id".to_string(), ".a_us2.id".to_string()]
    );
    assert!(matches!(loaded.config.groups[0].data[2], RowEntry::Single(_)));
}

#[test]
fn json_config_is_accepted() {
    let dir = temp_dir();
    let path = dir.join("facture.json");
    std::fs::write(
        &path,
        r#"{
            "tables": {"calls": {"attrs": [{"name": "id", "seq": {"start": 300}}]}},
            "groups": [{"group": "facture_group_a", "offset": 3, "data": ["calls c"]}]
        }"#,
    )
    .expect("write config");

    let loaded = load_config(&path, &ReferenceRegistry::new()).expect("load json");
    assert_eq!(loaded.config.groups[0].data[0].tablestr(), "calls c");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn invalid_config_reports_every_issue() {
    let dir = temp_dir();
    std::fs::write(
        dir.join("facture.toml"),
        r#"
[tables.calls]
attrs = [{ name = "id", seq = { start = 1 }, default = 4 }, { name = "id" }]
"#,
    )
    .expect("write config");

    let err = load_config_dir(&dir, &ReferenceRegistry::new()).expect_err("invalid");
    let PlanError::Invalid(report) = err else {
        panic!("expected a validation report");
    };
    let codes: Vec<&str> = report.errors.iter().map(|issue| issue.code.as_str()).collect();
    assert_eq!(codes, vec!["attr_rule_conflict", "duplicate_attr"]);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_top_level_key_is_a_schema_violation() {
    let dir = temp_dir();
    std::fs::write(dir.join("facture.toml"), "[tabels.calls]\n").expect("write config");

    let err = load_config_dir(&dir, &ReferenceRegistry::new()).expect_err("typo");
    let PlanError::Invalid(report) = err else {
        panic!("expected a validation report");
    };
    assert_eq!(report.errors[0].code, "schema_violation");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn emitted_schema_lists_top_level_keys() {
    let schema = config_json_schema_value().expect("schema");
    let properties = schema["properties"].as_object().expect("properties");
    assert!(properties.contains_key("tables"));
    assert!(properties.contains_key("groups"));
    assert!(properties.contains_key("targets"));
}
