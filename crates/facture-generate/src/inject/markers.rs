//! `facture_json` marker lines.
//!
//! A target file delimits each injected region with two comment lines:
//!
//! ```text
//! -- facture_json: {"target_name": "products", "position": "start"}
//! -- facture_json: {"target_name": "products", "position": "end"}
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use facture_core::{FactureError, Result};

pub const MARKER_PATTERN: &str = r".*facture_json: (.*)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPosition {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPayload {
    pub target_name: String,
    pub position: MarkerPosition,
}

/// A marker found in a file. `linenum` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub filename: PathBuf,
    pub linenum: usize,
    pub payload: MarkerPayload,
}

/// Line numbers of a target's start and end markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerSpan {
    pub start_line: usize,
    pub end_line: usize,
}

pub struct MarkerScanner {
    re: Regex,
}

impl MarkerScanner {
    pub fn new() -> Result<Self> {
        let re = Regex::new(MARKER_PATTERN)
            .map_err(|err| FactureError::conf(format!("invalid marker pattern: {err}")))?;
        Ok(Self { re })
    }

    /// Every marker of `contents`, in line order.
    pub fn scan(&self, filename: &Path, contents: &str) -> Result<Vec<Marker>> {
        let mut markers = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let linenum = index + 1;
            if let Some(payload) = self.parse_line(line, filename, linenum)? {
                markers.push(Marker {
                    filename: filename.to_path_buf(),
                    linenum,
                    payload,
                });
            }
        }
        Ok(markers)
    }

    /// Parse one line. Lines without a marker yield `None`.
    ///
    /// Text after the JSON object (such as a closing `*/`) is ignored.
    pub fn parse_line(
        &self,
        line: &str,
        filename: &Path,
        linenum: usize,
    ) -> Result<Option<MarkerPayload>> {
        let Some(json_text) = self.re.captures(line).and_then(|caps| caps.get(1)) else {
            return Ok(None);
        };

        let value = serde_json::Deserializer::from_str(json_text.as_str())
            .into_iter::<Value>()
            .next()
            .and_then(|parsed| parsed.ok())
            .ok_or_else(|| {
                FactureError::conf(format!(
                    "facture_json on line {linenum} in '{}' is not valid JSON",
                    filename.display()
                ))
            })?;

        serde_json::from_value(value).map(Some).map_err(|_| {
            FactureError::conf(format!(
                "facture_json on line {linenum} in '{}' must carry target_name and position",
                filename.display()
            ))
        })
    }
}

#[derive(Debug, Default)]
struct TargetMarkers {
    starts: Vec<usize>,
    ends: Vec<usize>,
}

/// Check the markers of one file: each target starts once, ends once, ends
/// after it starts, and no two regions overlap.
pub fn validate_markers(filename: &Path, markers: &[Marker]) -> Result<()> {
    let file = filename.display();
    let mut by_target: BTreeMap<&str, TargetMarkers> = BTreeMap::new();
    for marker in markers {
        let entry = by_target.entry(marker.payload.target_name.as_str()).or_default();
        match marker.payload.position {
            MarkerPosition::Start => entry.starts.push(marker.linenum),
            MarkerPosition::End => entry.ends.push(marker.linenum),
        }
    }

    for (target, found) in &by_target {
        if found.starts.len() > 1 {
            return Err(FactureError::conf(format!(
                "file '{file}' starts target '{target}' more than once"
            )));
        }
    }

    let mut regions = Vec::with_capacity(by_target.len());
    for (target, found) in &by_target {
        let region = match (found.starts.as_slice(), found.ends.as_slice()) {
            (_, [_, _, ..]) => {
                return Err(FactureError::conf(format!(
                    "file '{file}' ends target '{target}' more than once"
                )));
            }
            ([_], []) => {
                return Err(FactureError::conf(format!(
                    "file '{file}' starts target '{target}' but does not end it"
                )));
            }
            ([], [_]) => {
                return Err(FactureError::conf(format!(
                    "file '{file}' ends target '{target}' but does not start it"
                )));
            }
            ([start], [end]) if end < start => {
                return Err(FactureError::conf(format!(
                    "file '{file}' ends target '{target}' before it starts"
                )));
            }
            ([start], [end]) => (*start, *end, *target),
            _ => continue,
        };
        regions.push(region);
    }

    regions.sort_unstable();
    for pair in regions.windows(2) {
        let (_, previous_end, previous) = pair[0];
        let (next_start, _, next) = pair[1];
        if next_start < previous_end {
            return Err(FactureError::conf(format!(
                "file '{file}' has overlapping targets '{previous}' and '{next}'"
            )));
        }
    }

    Ok(())
}

/// Start and end lines of `target_name` among `markers`.
pub fn locate_target(target_name: &str, markers: &[Marker]) -> Result<MarkerSpan> {
    let line_of = |position: MarkerPosition| {
        markers
            .iter()
            .filter(|marker| {
                marker.payload.target_name == target_name && marker.payload.position == position
            })
            .map(|marker| marker.linenum)
            .last()
    };

    let start_line = line_of(MarkerPosition::Start).ok_or_else(|| {
        FactureError::conf(format!("could not find a start for target {target_name}"))
    })?;
    let end_line = line_of(MarkerPosition::End).ok_or_else(|| {
        FactureError::conf(format!("could not find an end for target {target_name}"))
    })?;

    Ok(MarkerSpan {
        start_line,
        end_line,
    })
}
