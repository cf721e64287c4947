//! In-memory group → members relation.
//!
//! Groups are keyed by display name and remember insertion order; members are
//! held in ordered sets so duplicates collapse and listings come out sorted.
use std::collections::{BTreeSet, HashMap};

use crate::member::MemberRecord;

/// Ordering for [`GroupStore::list_groups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Case-insensitive by display name.
    #[default]
    Alphabetical,
    /// Unique member count, largest first; ties keep insertion order.
    BySize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No users found for group: {0}")]
pub struct UnknownGroup(pub String);

#[derive(Debug, Default)]
struct GroupEntry {
    name: String,
    members: BTreeSet<MemberRecord>,
}

#[derive(Debug, Default)]
pub struct GroupStore {
    groups: Vec<GroupEntry>,
    index: HashMap<String, usize>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut GroupEntry {
        let idx = match self.index.get(name).copied() {
            Some(i) => i,
            None => {
                self.groups.push(GroupEntry {
                    name: name.to_string(),
                    members: BTreeSet::new(),
                });
                self.index.insert(name.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }

    /// Register a group with no members yet. No-op if it already exists.
    pub fn ensure_group(&mut self, name: &str) {
        self.entry(name);
    }

    /// Insert `member` under `group`, creating the group if absent. Returns
    /// `false` when an identical record was already present.
    pub fn add(&mut self, group: &str, member: MemberRecord) -> bool {
        self.entry(group).members.insert(member)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn list_groups(&self, sort: SortMode) -> Vec<GroupSummary> {
        let mut out: Vec<GroupSummary> = self
            .groups
            .iter()
            .map(|g| GroupSummary {
                name: g.name.clone(),
                members: g.members.len(),
            })
            .collect();
        match sort {
            SortMode::Alphabetical => out.sort_by_key(|g| g.name.to_lowercase()),
            SortMode::BySize => out.sort_by(|a, b| b.members.cmp(&a.members)),
        }
        out
    }

    /// Sorted, deduplicated members of `group`. A group registered without
    /// any member rows has no entries and is reported as unknown.
    pub fn list_members(&self, group: &str) -> Result<Vec<&MemberRecord>, UnknownGroup> {
        match self.index.get(group).map(|&i| &self.groups[i]) {
            Some(entry) if !entry.members.is_empty() => Ok(entry.members.iter().collect()),
            _ => Err(UnknownGroup(group.to_string())),
        }
    }

    /// Every distinct member across all groups.
    pub fn all_members(&self) -> BTreeSet<&MemberRecord> {
        self.groups.iter().flat_map(|g| g.members.iter()).collect()
    }
}
