use std::collections::HashMap;

/// Byte span (start of `<!--`, end after `-->`) of the first comment
/// whose body contains `token`, scanning in document order.
fn find_comment(doc: &str, token: &str) -> Option<(usize, usize)> {
    let mut cursor = 0;
    while let Some(rel) = doc[cursor..].find("<!--") {
        let start = cursor + rel;
        let body_start = start + 4;
        let body_end = body_start + doc[body_start..].find("-->")?;
        if doc[body_start..body_end].contains(token) {
            return Some((start, body_end + 3));
        }
        cursor = body_end + 3;
    }
    None
}

/// Extract the raw document slices between `debut_<field>` and
/// `fin_<field>` marker comments, one entry per field found.
///
/// A field with either marker missing, or with the begin marker after the
/// end marker, is omitted from the map; consumers treat absence as an
/// empty field. Only the first occurrence of each marker counts, so
/// duplicated markers later in the document change nothing.
pub fn extract_regions(doc: &str, fields: &[&str]) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for field in fields {
        let debut = find_comment(doc, &format!("debut_{field}"));
        let fin = find_comment(doc, &format!("fin_{field}"));
        if let (Some((_, debut_end)), Some((fin_start, _))) = (debut, fin) {
            if debut_end <= fin_start {
                out.insert(field.to_string(), doc[debut_end..fin_start].to_string());
            }
        }
    }
    out
}

// ── Tests ──
