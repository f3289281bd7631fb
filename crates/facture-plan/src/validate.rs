use std::collections::HashSet;

use facture_core::ReferenceRegistry;
use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::model::FactureConfig;

/// Configuration that passed structural and semantic validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: FactureConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a configuration document against the configuration JSON Schema.
pub fn validate_config_json(
    config_json: &Value,
    config_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(config_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Semantic checks that the JSON Schema cannot express.
pub fn validate_config_semantics(
    config: &FactureConfig,
    registry: &ReferenceRegistry,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_tables(config, &mut report);
    validate_targets(config, &mut report);
    validate_reference_kinds(config, registry, &mut report);

    report
}

/// Validate the configuration end-to-end, returning structured issues on failure.
pub fn validate_config(
    config_json: &Value,
    config_schema: &Value,
    registry: &ReferenceRegistry,
) -> Result<ValidatedConfig, ValidationReport> {
    let structural = match validate_config_json(config_json, config_schema) {
        Ok(report) => report,
        Err(err) => {
            return Err(ValidationReport::single_error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let config: FactureConfig = match serde_json::from_value(config_json.clone()) {
        Ok(config) => config,
        Err(err) => {
            return Err(ValidationReport::single_error(
                "invalid_config_json",
                "/",
                err.to_string(),
            ));
        }
    };

    let semantic = validate_config_semantics(&config, registry);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedConfig {
        config,
        warnings: semantic.warnings,
    })
}

fn validate_tables(config: &FactureConfig, report: &mut ValidationReport) {
    for (table_name, table) in &config.tables {
        let base_path = format!("/tables/{table_name}");
        if table.attrs.is_empty() {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "table_without_attrs",
                format!("{base_path}/attrs"),
                format!("table '{table_name}' declares no attributes"),
                Some("rows of this table render as empty blocks".to_string()),
            ));
        }

        let mut seen = HashSet::new();
        for (idx, attr) in table.attrs.iter().enumerate() {
            let attr_path = format!("{base_path}/attrs/{idx}");
            if !seen.insert(attr.name.as_str()) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "duplicate_attr",
                    attr_path.clone(),
                    format!("attribute '{}' is declared twice in table '{table_name}'", attr.name),
                    Some("keep a single entry per attribute".to_string()),
                ));
            }
            if attr.default.is_some() && attr.seq.is_some() {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "attr_rule_conflict",
                    attr_path,
                    format!(
                        "attribute '{}' of table '{table_name}' has both a default and a seq",
                        attr.name
                    ),
                    Some("choose either default or seq".to_string()),
                ));
            }
        }
    }
}

fn validate_targets(config: &FactureConfig, report: &mut ValidationReport) {
    let used: HashSet<&str> = config
        .tables
        .values()
        .filter_map(|table| table.target.as_deref())
        .collect();

    let mut seen = HashSet::new();
    for (idx, target) in config.targets.iter().enumerate() {
        let base_path = format!("/targets/{idx}");
        if !seen.insert(target.name.as_str()) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_target",
                format!("{base_path}/name"),
                format!("target '{}' is declared more than once", target.name),
                Some("target names must be unique".to_string()),
            ));
        }
        if target.filename.as_os_str().is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "empty_target_filename",
                format!("{base_path}/filename"),
                format!("target '{}' has an empty filename", target.name),
                None,
            ));
        }
        if !used.contains(target.name.as_str()) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "unused_target",
                base_path,
                format!("no table routes rows to target '{}'", target.name),
                Some("set `target` on a table or remove the target".to_string()),
            ));
        }
    }
}

fn validate_reference_kinds(
    config: &FactureConfig,
    registry: &ReferenceRegistry,
    report: &mut ValidationReport,
) {
    for (group_idx, group) in config.groups.iter().enumerate() {
        for (row_idx, entry) in group.data.iter().enumerate() {
            let Some(body) = entry.body() else {
                continue;
            };
            for (name, spec) in &body.ref_objs {
                if registry.contains(&spec.kind) {
                    continue;
                }
                let known: Vec<&str> = registry.kinds().collect();
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "unknown_reference_kind",
                    format!("/groups/{group_idx}/data/{row_idx}/1/ref_objs/{name}/kind"),
                    format!(
                        "reference object '{name}' in group '{}' has unknown kind '{}'",
                        group.group, spec.kind
                    ),
                    Some(format!("known kinds: {}", known.join(", "))),
                ));
            }
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
