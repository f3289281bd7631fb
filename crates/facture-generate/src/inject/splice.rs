use std::iter;

use super::markers::MarkerSpan;

/// Text placed between a target's markers: the blocks joined by `",\n\n"`,
/// preceded by one newline and followed by two.
pub fn injection_payload(values: &[String]) -> String {
    format!("\n{}\n\n", values.join(",\n\n"))
}

/// Replace the lines strictly between each span's markers with its payload.
///
/// Spans are applied from the bottom of the file up so earlier line numbers
/// stay valid. Marker lines and everything outside the spans are kept as is.
pub fn splice_regions(contents: &str, mut regions: Vec<(MarkerSpan, String)>) -> String {
    regions.sort_by(|(a, _), (b, _)| b.start_line.cmp(&a.start_line));

    let mut lines: Vec<String> = contents.split_inclusive('\n').map(str::to_string).collect();
    for (span, payload) in regions {
        let first_replaced = span.start_line.min(lines.len());
        let end_marker = span.end_line.saturating_sub(1).clamp(first_replaced, lines.len());
        lines.splice(first_replaced..end_marker, iter::once(payload));
    }
    lines.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> String {
        (1..=count).map(|n| format!("line {n}\n")).collect()
    }

    #[test]
    fn payload_joins_blocks() {
        let payload = injection_payload(&["(a)".to_string(), "(b)".to_string()]);
        assert_eq!(payload, "\n(a),\n\n(b)\n\n");
    }

    #[test]
    fn replaces_only_lines_between_markers() {
        let contents = numbered(10);
        let span = MarkerSpan {
            start_line: 5,
            end_line: 9,
        };
        let result = splice_regions(&contents, vec![(span, "X\n".to_string())]);
        assert_eq!(
            result,
            "line 1\nline 2\nline 3\nline 4\nline 5\nX\nline 9\nline 10\n"
        );
    }

    #[test]
    fn adjacent_markers_insert_without_removing() {
        let contents = numbered(3);
        let span = MarkerSpan {
            start_line: 1,
            end_line: 2,
        };
        let result = splice_regions(&contents, vec![(span, "X\n".to_string())]);
        assert_eq!(result, "line 1\nX\nline 2\nline 3\n");
    }

    #[test]
    fn several_regions_in_any_order() {
        let contents = numbered(60);
        let regions = vec![
            (
                MarkerSpan {
                    start_line: 5,
                    end_line: 10,
                },
                "A\n".to_string(),
            ),
            (
                MarkerSpan {
                    start_line: 50,
                    end_line: 55,
                },
                "B\n".to_string(),
            ),
        ];
        let result = splice_regions(&contents, regions);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[4], "line 5");
        assert_eq!(lines[5], "A");
        assert_eq!(lines[6], "line 10");
        assert_eq!(lines[46], "line 50");
        assert_eq!(lines[47], "B");
        assert_eq!(lines[48], "line 55");
        assert_eq!(lines.len(), 60 - 8 + 2);
    }
}
