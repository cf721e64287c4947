//! Member row normalization.
//!
//! A member region is split into `<tr>` fragments; each fragment's cells are
//! read in order and mapped to a [`MemberRecord`] through the selected
//! [`ExportLayout`]. Fragments that do not fit the layout are skipped.
use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use crate::layout::{CellKind, ExportLayout};
use crate::member::MemberRecord;

static ROW_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<tr(?:\s[^>]*)?>(.*?)</tr>").expect("row fragment regex is valid")
});

static CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(td|th)(?:\s[^>]*)?>(.*?)</t[dh]>").expect("cell regex is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("row does not fit {layout} layout: expected {expected} leading cells, found {found}")]
    StructuralMismatch {
        layout: ExportLayout,
        expected: usize,
        found: usize,
    },
}

/// Members read from one region plus fragment counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RowBatch {
    pub members: Vec<MemberRecord>,
    pub fragments: usize,
    pub skipped: usize,
}

/// Strip nested tags, decode the basic entities, and collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, " ");
    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map one `<tr>` body to a member using `layout`.
pub fn normalize_fragment(
    fragment: &str,
    layout: ExportLayout,
) -> Result<MemberRecord, NormalizeError> {
    let expected = layout.cells();
    let cells: Vec<(CellKind, &str)> = CELL
        .captures_iter(fragment)
        .filter_map(|caps| {
            let kind = match caps.get(1)?.as_str() {
                "th" => CellKind::Header,
                _ => CellKind::Data,
            };
            Some((kind, caps.get(2)?.as_str()))
        })
        .collect();

    let fits = cells.len() >= expected.len()
        && cells.iter().zip(expected).all(|((kind, _), want)| kind == want);
    if !fits {
        return Err(NormalizeError::StructuralMismatch {
            layout,
            expected: expected.len(),
            found: cells.len(),
        });
    }

    Ok(MemberRecord::new(
        &clean_text(cells[layout.canonical_index()].1),
        &clean_text(cells[layout.short_index()].1),
        &clean_text(cells[layout.flags_index()].1),
    ))
}

/// Split a member region into fragments and normalize each one.
pub fn normalize_rows(block: &str, layout: ExportLayout) -> RowBatch {
    let mut batch = RowBatch::default();
    for caps in ROW_FRAGMENT.captures_iter(block) {
        let Some(body) = caps.get(1) else { continue };
        batch.fragments += 1;
        match normalize_fragment(body.as_str(), layout) {
            Ok(m) => batch.members.push(m),
            Err(e) => {
                trace!("skipping row: {}", e);
                batch.skipped += 1;
            }
        }
    }
    batch
}
