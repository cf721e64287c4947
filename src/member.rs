//! Member data model: one account row as it appears under a group, with its
//! canonical name, short logon name, and account-control flags.
//!
//! `MemberRecord` identity is the full `(canonical_name, short_name, flags)`
//! tuple. Two rows with equal tuples collapse to one entry in the store.
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Account-control attributes captured from a single flags cell.
///
/// Tokens are split on commas with inner whitespace collapsed. Equality,
/// ordering and hashing use the token set only, so two cells listing the same
/// flags in a different order are one identity. Display keeps the order of
/// the first field seen.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    tokens: BTreeSet<String>,
    field: String,
}

impl FlagSet {
    /// Build a flag set from a raw delimiter-joined field.
    pub fn parse(raw: &str) -> Self {
        let mut tokens = BTreeSet::new();
        let mut ordered = Vec::new();
        for token in raw
            .split(',')
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())
        {
            if tokens.insert(token.clone()) {
                ordered.push(token);
            }
        }
        Self {
            tokens,
            field: ordered.join(", "),
        }
    }

    /// Substring containment over the whole normalized field, so an
    /// attribute spanning a comma still matches.
    pub fn contains(&self, attribute: &str) -> bool {
        let needle = Self::parse(attribute);
        !needle.field.is_empty() && self.field.contains(&needle.field)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl PartialEq for FlagSet {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for FlagSet {}

impl PartialOrd for FlagSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FlagSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tokens.cmp(&other.tokens)
    }
}

impl Hash for FlagSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)
    }
}

/// A normalized account row.
///
/// Field order drives the derived `Ord`, which is the listing order
/// (canonical name, then short name, then flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberRecord {
    pub canonical_name: String,
    pub short_name: String,
    pub flags: FlagSet,
}

impl MemberRecord {
    pub fn new(canonical_name: &str, short_name: &str, flags: &str) -> Self {
        Self {
            canonical_name: canonical_name.to_string(),
            short_name: short_name.to_string(),
            flags: FlagSet::parse(flags),
        }
    }

    /// Render as `short (canonical) - Flags: a, b`.
    pub fn detailed_line(&self) -> String {
        format!(
            "{} ({}) - Flags: {}",
            self.short_name, self.canonical_name, self.flags
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_ignores_order_and_spacing() {
        let a = FlagSet::parse("NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD");
        let b = FlagSet::parse("DONT_EXPIRE_PASSWD,NORMAL_ACCOUNT ,");
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_string(), "NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD");
        assert_eq!(b.to_string(), "DONT_EXPIRE_PASSWD, NORMAL_ACCOUNT");
    }

    #[test]
    fn flag_contains_is_substring_over_tokens() {
        let f = FlagSet::parse("ACCOUNT_DISABLED, password   never expires");
        assert!(f.contains("DISABLED"));
        assert!(f.contains("password never expires"));
        assert!(!f.contains("DONT_EXPIRE_PASSWD"));
        assert!(FlagSet::parse("").is_empty());
    }

    #[test]
    fn flag_contains_spans_commas() {
        let f = FlagSet::parse("NORMAL_ACCOUNT,  DONT_EXPIRE_PASSWD, SMARTCARD_REQUIRED");
        assert!(f.contains("NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD"));
        assert!(f.contains("NORMAL_ACCOUNT,DONT_EXPIRE_PASSWD"));
        assert!(!f.contains("NORMAL_ACCOUNT, SMARTCARD_REQUIRED"));
        assert!(!f.contains(" , "));
    }

    #[test]
    fn first_seen_field_order_is_displayed() {
        let mut set = BTreeSet::new();
        set.insert(MemberRecord::new("Jane Doe", "j.doe", "NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD"));
        set.insert(MemberRecord::new("Jane Doe", "j.doe", "DONT_EXPIRE_PASSWD, NORMAL_ACCOUNT"));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.iter().next().unwrap().detailed_line(),
            "j.doe (Jane Doe) - Flags: NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD"
        );
    }

    #[test]
    fn identity_is_full_tuple() {
        let a = MemberRecord::new("John Smith", "jsmith", "");
        let b = MemberRecord::new("John Smith", "jsmith", "");
        let c = MemberRecord::new("John Smith", "jsmith", "ACCOUNT_DISABLED");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            c.detailed_line(),
            "jsmith (John Smith) - Flags: ACCOUNT_DISABLED"
        );
    }
}
