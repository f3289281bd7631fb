//! Injection of rendered rows into marked regions of target files.

pub mod atomic;
pub mod markers;
pub mod splice;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use facture_core::{FactureError, Group, Result, TargetSpec};

pub use atomic::write_bytes_atomic;
pub use markers::{
    Marker, MarkerPayload, MarkerPosition, MarkerScanner, MarkerSpan, locate_target,
    validate_markers,
};
pub use splice::{injection_payload, splice_regions};

#[derive(Debug, Clone, Serialize)]
pub struct InjectionReport {
    pub files: Vec<InjectedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InjectedFile {
    pub filename: PathBuf,
    pub targets: Vec<InjectedTarget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InjectedTarget {
    pub name: String,
    pub span: MarkerSpan,
    pub rows: usize,
}

struct PreparedFile {
    filename: PathBuf,
    contents: String,
    regions: Vec<(MarkerSpan, String)>,
    report: InjectedFile,
}

/// Write each target's rows between its markers.
///
/// Every target file is read and checked before the first one is written.
pub fn inject_targets(groups: &[Group], targets: &[TargetSpec]) -> Result<InjectionReport> {
    if targets.is_empty() {
        return Err(FactureError::conf(
            "You have no targets specified in the configuration. \
             Use --skip-targets if that is intentional.",
        ));
    }

    let mut names = BTreeSet::new();
    for target in targets {
        if !names.insert(target.name.as_str()) {
            return Err(FactureError::conf(format!(
                "target '{}' is declared more than once",
                target.name
            )));
        }
    }

    let output_values = collect_output_values(groups)?;
    // Keyed by the resolved path so two spellings of one file share a single read and write.
    let mut by_file: BTreeMap<PathBuf, (&PathBuf, Vec<&TargetSpec>)> = BTreeMap::new();
    for target in targets {
        let resolved = std::fs::canonicalize(&target.filename)
            .map_err(|err| FactureError::io(&target.filename, err))?;
        by_file
            .entry(resolved)
            .or_insert_with(|| (&target.filename, Vec::new()))
            .1
            .push(target);
    }

    let scanner = MarkerScanner::new()?;
    let mut prepared = Vec::with_capacity(by_file.len());
    for (resolved, (filename, file_targets)) in by_file {
        let contents =
            std::fs::read_to_string(&resolved).map_err(|err| FactureError::io(filename, err))?;
        let markers = scanner.scan(filename, &contents)?;
        validate_markers(filename, &markers)?;

        let mut regions = Vec::with_capacity(file_targets.len());
        let mut injected = Vec::with_capacity(file_targets.len());
        for target in file_targets {
            let span = locate_target(&target.name, &markers)?;
            let values = output_values
                .get(target.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            debug!(
                target = %target.name,
                file = %filename.display(),
                start_line = span.start_line,
                end_line = span.end_line,
                rows = values.len(),
                "target located"
            );
            regions.push((span, injection_payload(values)));
            injected.push(InjectedTarget {
                name: target.name.clone(),
                span,
                rows: values.len(),
            });
        }

        prepared.push(PreparedFile {
            filename: resolved,
            contents,
            regions,
            report: InjectedFile {
                filename: filename.clone(),
                targets: injected,
            },
        });
    }

    let mut files = Vec::with_capacity(prepared.len());
    for file in prepared {
        let updated = splice_regions(&file.contents, file.regions);
        write_bytes_atomic(&file.filename, updated.as_bytes())?;
        info!(
            file = %file.report.filename.display(),
            targets = file.report.targets.len(),
            "target file updated"
        );
        files.push(file.report);
    }

    Ok(InjectionReport { files })
}

/// Rendered blocks per target name, in group order then row order.
fn collect_output_values(groups: &[Group]) -> Result<BTreeMap<&str, Vec<String>>> {
    let mut values: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for group in groups {
        for row in &group.data {
            let Some(target) = &row.target else {
                continue;
            };
            let sql = row.output_sql.as_ref().ok_or_else(|| {
                FactureError::conf(format!(
                    "alias \"{}\" in group \"{}\" has no sql output to inject",
                    row.alias, group.group
                ))
            })?;
            values.entry(target.name.as_str()).or_default().push(sql.clone());
        }
    }
    Ok(values)
}
