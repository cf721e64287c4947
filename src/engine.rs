//! Engine: runs extraction and normalization over one input document, fills
//! the group store, and runs the naming-convention audit on top of it.
//!
//! Typical usage:
//!
//! ```no_run
//! use addump::engine::{AnalysisOptions, Engine};
//! # fn main() -> anyhow::Result<()> {
//! let opts = AnalysisOptions::default();
//! let mut engine = Engine::new(opts.layout);
//! engine.load_from_file_path("/path/to/domain_users_by_group.html")?;
//! print!("{}", addump::report::render_group_listing(&engine.store.list_groups(opts.sort)));
//! # Ok(())
//! # }
//! ```
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};

use crate::audit::{AuditReport, Auditor, ConventionRule, DONT_EXPIRE_PASSWD};
use crate::extract::extract_sections;
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, read_document};
use crate::layout::ExportLayout;
use crate::normalize::normalize_rows;
use crate::store::{GroupStore, SortMode};

/// Options handed over by the command-line adapter.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub layout: ExportLayout,
    pub rules: Vec<ConventionRule>,
    pub noted_attributes: Vec<String>,
    pub sort: SortMode,
    pub detailed: bool,
    /// Destination for a member listing; written by the caller.
    pub output: Option<PathBuf>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            layout: ExportLayout::default(),
            rules: Vec::new(),
            noted_attributes: vec![DONT_EXPIRE_PASSWD.to_string()],
            sort: SortMode::default(),
            detailed: false,
            output: None,
        }
    }
}

/// Counters collected while loading a document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub sections: usize,
    pub sections_without_table: usize,
    pub fragments: usize,
    pub skipped_fragments: usize,
}

#[derive(Debug, Default)]
pub struct Engine {
    pub layout: ExportLayout,
    pub store: GroupStore,
    pub parse_stats: Option<ParseStats>,
}

impl Engine {
    /// Create an empty engine reading member rows with `layout`.
    pub fn new(layout: ExportLayout) -> Self {
        Self {
            layout,
            store: GroupStore::new(),
            parse_stats: None,
        }
    }

    /// Load an in-memory document. Every section gets a store entry, even
    /// when no member rows were recovered for it.
    pub fn load_from_str(&mut self, document: &str) {
        let mut stats = ParseStats::default();
        for extracted in extract_sections(document) {
            let name = extracted.section.display_name.as_str();
            stats.sections += 1;
            self.store.ensure_group(name);
            let Some(rows) = extracted.rows else {
                stats.sections_without_table += 1;
                continue;
            };
            let batch = normalize_rows(rows, self.layout);
            stats.fragments += batch.fragments;
            stats.skipped_fragments += batch.skipped;
            if batch.members.is_empty() {
                debug!("group {}: 0 member rows", name);
            }
            for m in batch.members {
                self.store.add(name, m);
            }
        }
        info!(
            "loaded {} sections into {} groups ({} rows, {} skipped)",
            stats.sections,
            self.store.len(),
            stats.fragments - stats.skipped_fragments,
            stats.skipped_fragments
        );
        self.parse_stats = Some(stats);
    }

    /// Read `path` (mmap above `mmap_threshold_bytes`) and load it.
    pub fn load_from_file_path_with_threshold<P: AsRef<Path>>(
        &mut self,
        path: P,
        mmap_threshold_bytes: u64,
    ) -> Result<()> {
        let document = read_document(path, mmap_threshold_bytes)?;
        self.load_from_str(&document);
        Ok(())
    }

    /// Convenience wrapper that uses the default mmap threshold.
    pub fn load_from_file_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.load_from_file_path_with_threshold(path, DEFAULT_MMAP_THRESHOLD_BYTES)
    }

    /// Audit every distinct member against `rules`.
    pub fn audit(&self, rules: &[ConventionRule], noted_attributes: &[String]) -> AuditReport {
        Auditor::new(rules)
            .with_noted_attributes(noted_attributes)
            .audit(&self.store)
    }
}
