//! Group section extraction.
//!
//! A group section opens with a table header cell carrying `id="cn_<id>"`
//! whose text is the group's display name. The member region of a section is
//! the text between the end of that header (`</thead>`) and the closing
//! `</tbody>` of the same table. Each region is located by re-searching the
//! whole document for the section's exact marker, so sections may appear in
//! any order relative to their tables.
use std::collections::HashSet;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::normalize::clean_text;

static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<thead>\s*<tr[^>]*>\s*<td[^>]*\bid="cn_([^"]*)"[^>]*>(.*?)</td>\s*</tr>\s*</thead>"#,
    )
    .expect("section marker regex is valid")
});

const REGION_END: &str = "</tbody>";
const NEXT_SECTION: &str = "<thead";

/// A group header found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSection {
    /// Raw `cn_` attribute value, unique per document.
    pub identifier: String,
    /// Cleaned header text, the externally visible group key.
    pub display_name: String,
}

/// A section paired with its member region, if one was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSection<'a> {
    pub section: GroupSection,
    pub rows: Option<&'a str>,
}

/// Locate every group section marker in document order. Later sections
/// repeating an identifier already seen are dropped.
pub fn find_sections(document: &str) -> Vec<GroupSection> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for caps in SECTION_MARKER.captures_iter(document) {
        let (Some(id), Some(name)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if !seen.insert(id.as_str()) {
            warn!("duplicate group identifier cn_{} ignored", id.as_str());
            continue;
        }
        out.push(GroupSection {
            identifier: id.as_str().to_string(),
            display_name: clean_text(name.as_str()),
        });
    }
    out
}

/// Find the member region belonging to `section`.
///
/// The identifier is matched literally. Returns `None` when the header is not
/// followed by a `</tbody>` before the next table header.
pub fn member_region<'a>(document: &'a str, section: &GroupSection) -> Option<&'a str> {
    let pattern = format!(
        r#"(?s)<td[^>]*\bid="cn_{}"[^>]*>.*?</thead>"#,
        regex::escape(&section.identifier)
    );
    let anchor = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("cannot anchor group {}: {}", section.display_name, e);
            return None;
        }
    };
    let start = anchor.find(document)?.end();
    let tail = &document[start..];
    let end = tail.find(REGION_END)?;
    if tail[..end].contains(NEXT_SECTION) {
        return None;
    }
    Some(&tail[..end])
}

/// Extract every section with its member region.
pub fn extract_sections(document: &str) -> Vec<ExtractedSection<'_>> {
    find_sections(document)
        .into_iter()
        .map(|section| {
            let rows = member_region(document, &section);
            if rows.is_none() {
                debug!(
                    "group {} (cn_{}) has no member table; recording zero rows",
                    section.display_name, section.identifier
                );
            }
            ExtractedSection { section, rows }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: &str, name: &str) -> String {
        format!(r#"<thead><tr><td colspan="10" id="cn_{id}">{name}</td></tr></thead>"#)
    }

    #[test]
    fn finds_sections_in_document_order() {
        let doc = format!(
            "<table>{}<tbody></tbody></table><table>{}<tbody></tbody></table>",
            header("Domain Admins", "Domain Admins"),
            header("Backup Operators", "Backup &amp; Restore")
        );
        let s = find_sections(&doc);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].identifier, "Domain Admins");
        assert_eq!(s[1].display_name, "Backup & Restore");
    }

    #[test]
    fn region_is_bounded_by_its_own_tbody() {
        let doc = format!(
            "<table>{}<tbody><tr><td>a</td></tr></tbody></table><table>{}<tbody><tr><td>b</td></tr></tbody></table>",
            header("A", "A"),
            header("B", "B")
        );
        let ex = extract_sections(&doc);
        assert_eq!(ex[0].rows, Some("<tbody><tr><td>a</td></tr>"));
        assert_eq!(ex[1].rows, Some("<tbody><tr><td>b</td></tr>"));
    }

    #[test]
    fn identifier_with_pattern_characters_is_literal() {
        let doc = format!(
            "<table>{}<tbody><tr><td>x</td></tr></tbody></table><table>{}<tbody><tr><td>y</td></tr></tbody></table>",
            header("Admins (all)", "First"),
            header("Admins [x]+.*", "Second")
        );
        let ex = extract_sections(&doc);
        assert_eq!(ex.len(), 2);
        assert!(ex[0].rows.unwrap().contains(">x<"));
        assert!(ex[1].rows.unwrap().contains(">y<"));
    }

    #[test]
    fn missing_tbody_yields_no_region() {
        let doc = format!(
            "<table>{}</table><table>{}<tbody><tr><td>b</td></tr></tbody></table>",
            header("Empty", "Empty"),
            header("Full", "Full")
        );
        let ex = extract_sections(&doc);
        assert_eq!(ex[0].rows, None);
        assert!(ex[1].rows.is_some());
    }

    #[test]
    fn duplicate_identifier_is_dropped() {
        let doc = format!(
            "{}<tbody></tbody>{}<tbody></tbody>",
            header("G", "One"),
            header("G", "Two")
        );
        let s = find_sections(&doc);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].display_name, "One");
    }
}
