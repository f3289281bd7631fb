use std::env;
use std::path::PathBuf;

use facture_core::ReferenceRegistry;
use facture_plan::{
    PlanError, ValidationReport, config_json_schema_value, find_config_file, read_config_value,
    validate_config,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conf_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let path = find_config_file(&conf_dir)?;
    let config_json = read_config_value(&path)?;
    let schema_json = config_json_schema_value()?;

    let validated = match validate_config(&config_json, &schema_json, &ReferenceRegistry::new()) {
        Ok(validated) => validated,
        Err(report) => {
            eprintln!("config validation failed: {}", path.display());
            print_report(&report);
            return Err(PlanError::Invalid(report).into());
        }
    };

    if !validated.warnings.is_empty() {
        eprintln!("config validated with warnings:");
        print_report(&ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings,
        });
    } else {
        println!("config validated successfully");
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in &report.errors {
        eprintln!("error {} {}: {}", issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
    for issue in &report.warnings {
        eprintln!("warning {} {}: {}", issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
}
