pub mod html;
pub mod json;

use std::sync::LazyLock;

use regex::Regex;

/// Sentinel for a field whose key is absent or empty.
pub const NOT_AVAILABLE: &str = "N/A";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Remove anything matching an open/close angle-bracket tag, non-greedy.
/// Idempotent: a stripped string contains no tag pattern to strip again.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").to_string()
}

/// Entity decode then tag strip, in that order (so `&lt;p&gt;` is also
/// removed). Used for the visible-text pass over dispositif/objet
/// fragments and for JSON field cleanup.
pub fn visible_text(fragment: &str) -> String {
    strip_tags(&decode_entities(fragment))
}

// Named entities seen in amendment documents. Not a full HTML5 table;
// numeric references cover the rest.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&nbsp;", "\u{a0}"),
    ("&rsquo;", "\u{2019}"),
    ("&lsquo;", "\u{2018}"),
    ("&rdquo;", "\u{201d}"),
    ("&ldquo;", "\u{201c}"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&hellip;", "…"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&eacute;", "é"),
    ("&egrave;", "è"),
    ("&ecirc;", "ê"),
    ("&euml;", "ë"),
    ("&agrave;", "à"),
    ("&acirc;", "â"),
    ("&ccedil;", "ç"),
    ("&icirc;", "î"),
    ("&iuml;", "ï"),
    ("&ocirc;", "ô"),
    ("&oelig;", "œ"),
    ("&ugrave;", "ù"),
    ("&ucirc;", "û"),
    ("&deg;", "°"),
    ("&euro;", "€"),
];

// Longest named entity above is 8 bytes; numeric goes up to &#x10FFFF;
const MAX_ENTITY_LEN: usize = 10;

/// Decode numeric (`&#233;`, `&#xE9;`) and common named HTML entities in
/// a single pass. Unknown entities are left untouched.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let semi = rest.find(';').filter(|&e| e < MAX_ENTITY_LEN);
        if let Some(end) = semi {
            if let Some(decoded) = decode_entity(&rest[..=end]) {
                out.push_str(&decoded);
                rest = &rest[end + 1..];
                continue;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix("&#") {
        let num = num.strip_suffix(';')?;
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(String::from);
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, rep)| (*rep).to_string())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_non_greedy() {
        assert_eq!(strip_tags("<p>Un <b>texte</b> simple</p>"), "Un texte simple");
    }

    #[test]
    fn strip_is_idempotent() {
        let once = strip_tags("<div class=\"a\">x</div> < y");
        let twice = strip_tags(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("d&eacute;put&eacute;"), "député");
        assert_eq!(decode_entities("&#233;lu &amp; r&#xE9;&#233;lu"), "élu & réélu");
    }

    #[test]
    fn leaves_unknown_entities_and_bare_ampersands() {
        assert_eq!(decode_entities("A & B &inconnu; C"), "A & B &inconnu; C");
    }

    #[test]
    fn visible_text_drops_decoded_tags_too() {
        assert_eq!(visible_text("&lt;p&gt;Texte&lt;/p&gt;"), "Texte");
        assert_eq!(visible_text("<p>Une assurance</p>"), "Une assurance");
    }
}
