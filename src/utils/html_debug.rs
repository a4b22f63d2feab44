// src/utils/html_debug.rs
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::AppError;

/// Markers the extractors anchor on, paired with the highlight class they get.
const REPORT_MARKERS: [(&str, &str); 5] = [
    (r"<b>\s*Strategy Tester Report\s*</b>", "title"),
    (r"Orders<", "section"),
    (r"Deals<", "section"),
    (r"Comment</b>", "columns"),
    (r#"(?i)<tr[^>]*bgcolor="?#(?:FFFFFF|F7F7F7)"?[^>]*>"#, "row"),
];

static MARKER_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    REPORT_MARKERS
        .iter()
        .map(|(pat, kind)| (Regex::new(pat).expect("Failed to compile report marker"), *kind))
        .collect()
});

/// Wraps every highlight range in a styled span and writes the page to `path`.
/// Ranges overlapping an earlier one are dropped.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-title { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-section { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-columns { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-row { outline: 1px dashed #ADD8E6; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, kind) in sorted {
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);
        debug_html.push_str(&format!(
            "<span class=\"highlight-{}\" title=\"Position: {}-{}, Type: {}\">",
            kind, start, end, kind
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");
        last_pos = end;
    }
    debug_html.push_str(&html[last_pos..]);
    debug_html.push_str("\n</body>\n</html>");

    fs::write(path, debug_html)?;
    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Finds the extraction markers in a decoded report. Returns (start, end, kind) byte ranges.
pub fn find_report_markers(html: &str) -> Vec<(usize, usize, &'static str)> {
    MARKER_RES
        .iter()
        .flat_map(|(re, kind)| re.find_iter(html).map(move |m| (m.start(), m.end(), *kind)))
        .collect()
}

/// Writes an annotated copy of the report with the extraction markers highlighted.
pub fn annotate_report(html: &str, path: &Path) -> Result<(), AppError> {
    let markers = find_report_markers(html);
    tracing::debug!("Found {} extraction markers for debug output", markers.len());
    save_debug_html(html, path, &markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_title_section_and_row_markers() {
        let html = r##"<table><tr><td><b>Strategy Tester Report</b></td></tr></table>
            <b>Orders</b><b>Comment</b><tr bgcolor="#F7F7F7"><td>1</td></tr>"##;
        let kinds: Vec<&str> = find_report_markers(html).into_iter().map(|m| m.2).collect();
        assert!(kinds.contains(&"title"));
        assert!(kinds.contains(&"section"));
        assert!(kinds.contains(&"columns"));
        assert!(kinds.contains(&"row"));
    }

    #[test]
    fn test_annotated_file_wraps_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.html");
        annotate_report("<p><b>Deals</b></p>", &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<span class=\"highlight-section\""));
        assert!(written.contains("Deals<</span>"));
        assert!(written.ends_with("</html>"));
    }
}
