use crate::parties::FALLBACK_LABEL;

/// Keyword variants marking insurance-related amendments.
pub const ASSURANCE_KEYWORDS: &[&str] = &["assurance", "assurances"];

/// Subdivision label the specific-article flag matches against.
pub const TARGET_SUBDIVISION: &str = "Article 14";

/// Turn a reference-lookup hit into a display label, falling back to the
/// fixed "not found" label instead of failing on unknown codes.
pub fn resolve(label: Option<&str>) -> String {
    label.map_or_else(|| FALLBACK_LABEL.to_string(), str::to_string)
}

/// True when any keyword appears, case-insensitively, in any field.
pub fn contains_any(keywords: &[&str], fields: &[&str]) -> bool {
    fields.iter().any(|field| {
        let lower = field.to_lowercase();
        keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()))
    })
}

/// Exact-equality flag against a specific subdivision label.
pub fn matches_subdivision(label: &str, target: &str) -> bool {
    label == target
}

// ── Tests ──
