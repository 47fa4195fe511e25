use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Numeric portion of a mixed identifier ("Amdt_COM-10.html" -> 10),
/// used as the ascending sort key; identifiers with no digits sort first.
pub fn extract_number(id: &str) -> u64 {
    NUMBER_RE
        .find(id)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Write the fixed header record, then the rows, which the caller has
/// already sorted and projected into header order.
pub fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_portion() {
        assert_eq!(extract_number("Amdt_COM-10.html"), 10);
        assert_eq!(extract_number("42"), 42);
        assert_eq!(extract_number("sans-numero"), 0);
    }

    #[test]
    fn sort_is_numeric_not_lexicographic() {
        let mut ids = vec!["10", "2", "1"];
        ids.sort_by_key(|id| extract_number(id));
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            vec!["1".to_string(), "true".to_string()],
            vec!["2".to_string(), "false".to_string()],
        ];
        write_csv(&path, &["Amendement", "ContientAssurance"], &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["Amendement,ContientAssurance", "1,true", "2,false"]);
    }
}
