//! Naming-convention auditing.
//!
//! Each distinct member is checked against an ordered list of
//! [`ConventionRule`]s: it conforms when its short name equals, ignoring
//! case, the name derived by any rule from its canonical name. Independently,
//! members whose flags contain a noted attribute (by default
//! `DONT_EXPIRE_PASSWD`) are reported for attention.
use std::fmt;
use std::str::FromStr;

use log::{debug, info};

use crate::member::MemberRecord;
use crate::store::GroupStore;

/// Account-control flag for passwords that never expire.
pub const DONT_EXPIRE_PASSWD: &str = "DONT_EXPIRE_PASSWD";

/// Derivation of a short logon name from a canonical "First ... Last" name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConventionRule {
    /// `john.smith`
    FirstDotLast,
    /// `jsmith`
    FirstInitialLast,
    /// `j.smith`
    FirstInitialDotLast,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown naming convention: {0} (expected first.last, fLast or f.last)")]
pub struct UnknownRule(pub String);

impl ConventionRule {
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstDotLast => "first.last",
            Self::FirstInitialLast => "fLast",
            Self::FirstInitialDotLast => "f.last",
        }
    }

    /// Expected short name for `canonical_name`, or `None` when the name has
    /// fewer than two whitespace-separated tokens.
    pub fn expected_short_name(self, canonical_name: &str) -> Option<String> {
        let tokens: Vec<&str> = canonical_name.split_whitespace().collect();
        let (first, last) = match tokens.as_slice() {
            [first, .., last] => (*first, *last),
            _ => return None,
        };
        let expected = match self {
            Self::FirstDotLast => format!("{}.{}", first, last),
            Self::FirstInitialLast => {
                let initial = first.chars().next()?;
                format!("{}{}", initial, last)
            }
            Self::FirstInitialDotLast => {
                let initial = first.chars().next()?;
                format!("{}.{}", initial, last)
            }
        };
        Some(expected.to_lowercase())
    }
}

impl fmt::Display for ConventionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConventionRule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first.last" | "first-last" | "firstlast" => Ok(Self::FirstDotLast),
            "flast" => Ok(Self::FirstInitialLast),
            "f.last" | "f-dot-last" => Ok(Self::FirstInitialDotLast),
            _ => Err(UnknownRule(s.to_string())),
        }
    }
}

/// Outcome of the naming check for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conformance {
    /// No rules were configured.
    NotChecked,
    Conforms,
    /// No rule matched. `expected` holds every name an applicable rule
    /// derived, which is empty for single-token canonical names.
    Mismatch { expected: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verdict {
    Conforms,
    FlaggedMismatch,
    NotedAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub member: MemberRecord,
    pub conformance: Conformance,
    /// Noted attributes present in the member's flags.
    pub noted: Vec<String>,
}

impl AuditFinding {
    pub fn is_mismatch(&self) -> bool {
        matches!(self.conformance, Conformance::Mismatch { .. })
    }

    pub fn is_noted(&self) -> bool {
        !self.noted.is_empty()
    }

    pub fn verdicts(&self) -> Vec<Verdict> {
        let mut v = Vec::new();
        match self.conformance {
            Conformance::Conforms => v.push(Verdict::Conforms),
            Conformance::Mismatch { .. } => v.push(Verdict::FlaggedMismatch),
            Conformance::NotChecked => {}
        }
        if self.is_noted() {
            v.push(Verdict::NotedAttribute);
        }
        v
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub rules: Vec<ConventionRule>,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &AuditFinding> {
        self.findings.iter().filter(|f| f.is_mismatch())
    }

    pub fn noted(&self) -> impl Iterator<Item = &AuditFinding> {
        self.findings.iter().filter(|f| f.is_noted())
    }

    pub fn finding(&self, short_name: &str) -> Option<&AuditFinding> {
        self.findings
            .iter()
            .find(|f| f.member.short_name == short_name)
    }
}

#[derive(Debug, Clone)]
pub struct Auditor {
    rules: Vec<ConventionRule>,
    noted_attributes: Vec<String>,
}

impl Auditor {
    pub fn new(rules: &[ConventionRule]) -> Self {
        Self {
            rules: rules.to_vec(),
            noted_attributes: vec![DONT_EXPIRE_PASSWD.to_string()],
        }
    }

    /// Replace the attributes reported for attention.
    pub fn with_noted_attributes<S: AsRef<str>>(mut self, attributes: &[S]) -> Self {
        self.noted_attributes = attributes
            .iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    pub fn evaluate(&self, member: &MemberRecord) -> AuditFinding {
        let conformance = if self.rules.is_empty() {
            Conformance::NotChecked
        } else {
            let actual = member.short_name.to_lowercase();
            let mut expected = Vec::new();
            let mut matched = false;
            for rule in &self.rules {
                let Some(name) = rule.expected_short_name(&member.canonical_name) else {
                    continue;
                };
                if name == actual {
                    matched = true;
                    break;
                }
                expected.push(name);
            }
            if matched {
                Conformance::Conforms
            } else {
                Conformance::Mismatch { expected }
            }
        };
        let noted = self
            .noted_attributes
            .iter()
            .filter(|a| member.flags.contains(a))
            .cloned()
            .collect();
        AuditFinding {
            member: member.clone(),
            conformance,
            noted,
        }
    }

    /// Evaluate every distinct member in the store, in member order.
    pub fn audit(&self, store: &GroupStore) -> AuditReport {
        let findings: Vec<AuditFinding> = store
            .all_members()
            .into_iter()
            .map(|m| self.evaluate(m))
            .collect();
        let report = AuditReport {
            rules: self.rules.clone(),
            findings,
        };
        debug!(
            "audited {} members against [{}]",
            report.findings.len(),
            self.rules
                .iter()
                .map(|r| r.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        info!(
            "audit: {} mismatched, {} noted",
            report.mismatches().count(),
            report.noted().count()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_expected_names() {
        assert_eq!(
            ConventionRule::FirstDotLast.expected_short_name("John Q Smith"),
            Some("john.smith".to_string())
        );
        assert_eq!(
            ConventionRule::FirstInitialLast.expected_short_name("John Smith"),
            Some("jsmith".to_string())
        );
        assert_eq!(
            ConventionRule::FirstInitialDotLast.expected_short_name("Jane Doe"),
            Some("j.doe".to_string())
        );
        assert_eq!(ConventionRule::FirstDotLast.expected_short_name("Administrator"), None);
        assert_eq!(ConventionRule::FirstInitialLast.expected_short_name("  "), None);
    }

    #[test]
    fn parses_rule_names() {
        assert_eq!(
            "FIRST.LAST".parse::<ConventionRule>().unwrap(),
            ConventionRule::FirstDotLast
        );
        assert_eq!(
            "fLast".parse::<ConventionRule>().unwrap(),
            ConventionRule::FirstInitialLast
        );
        assert_eq!(
            "F.Last".parse::<ConventionRule>().unwrap(),
            ConventionRule::FirstInitialDotLast
        );
        assert!("last.first".parse::<ConventionRule>().is_err());
    }

    #[test]
    fn comparison_ignores_case() {
        let a = Auditor::new(&[ConventionRule::FirstDotLast]);
        let f = a.evaluate(&MemberRecord::new("John Smith", "John.Smith", ""));
        assert_eq!(f.conformance, Conformance::Conforms);
    }

    #[test]
    fn any_rule_match_conforms() {
        let a = Auditor::new(&[ConventionRule::FirstDotLast, ConventionRule::FirstInitialLast]);
        let f = a.evaluate(&MemberRecord::new("John Smith", "jsmith", ""));
        assert_eq!(f.verdicts(), vec![Verdict::Conforms]);

        let reversed = Auditor::new(&[ConventionRule::FirstInitialLast, ConventionRule::FirstDotLast]);
        let g = reversed.evaluate(&MemberRecord::new("John Smith", "jsmith", ""));
        assert_eq!(g.conformance, f.conformance);
    }

    #[test]
    fn mismatch_and_noted_are_independent() {
        let a = Auditor::new(&[ConventionRule::FirstDotLast]);
        let f = a.evaluate(&MemberRecord::new("John Smith", "svc_backup", "DONT_EXPIRE_PASSWD"));
        assert_eq!(
            f.conformance,
            Conformance::Mismatch {
                expected: vec!["john.smith".to_string()]
            }
        );
        assert_eq!(
            f.verdicts(),
            vec![Verdict::FlaggedMismatch, Verdict::NotedAttribute]
        );
    }

    #[test]
    fn single_token_name_is_a_mismatch_with_no_expectation() {
        let a = Auditor::new(&[ConventionRule::FirstDotLast]);
        let f = a.evaluate(&MemberRecord::new("krbtgt", "krbtgt", ""));
        assert_eq!(f.conformance, Conformance::Mismatch { expected: vec![] });
    }

    #[test]
    fn no_rules_never_mismatch() {
        let a = Auditor::new(&[]);
        let f = a.evaluate(&MemberRecord::new("John Smith", "whatever", "DONT_EXPIRE_PASSWD"));
        assert_eq!(f.conformance, Conformance::NotChecked);
        assert_eq!(f.verdicts(), vec![Verdict::NotedAttribute]);
    }

    #[test]
    fn custom_noted_attributes() {
        let a = Auditor::new(&[]).with_noted_attributes(&["ACCOUNT_DISABLED", " "]);
        let f = a.evaluate(&MemberRecord::new("A B", "ab", "ACCOUNT_DISABLED, DONT_EXPIRE_PASSWD"));
        assert_eq!(f.noted, vec!["ACCOUNT_DISABLED".to_string()]);
    }

    #[test]
    fn noted_attribute_may_span_several_flags() {
        let a = Auditor::new(&[]).with_noted_attributes(&["ACCOUNT_DISABLED,DONT_EXPIRE_PASSWD"]);
        let f = a.evaluate(&MemberRecord::new("A B", "ab", "ACCOUNT_DISABLED, DONT_EXPIRE_PASSWD"));
        assert!(f.is_noted());
        let g = a.evaluate(&MemberRecord::new("A B", "ab", "DONT_EXPIRE_PASSWD"));
        assert!(!g.is_noted());
    }

    #[test]
    fn audit_covers_each_distinct_member_once() {
        let mut store = GroupStore::new();
        store.add("A", MemberRecord::new("John Smith", "jsmith", ""));
        store.add("B", MemberRecord::new("John Smith", "jsmith", ""));
        store.add("B", MemberRecord::new("Jane Doe", "j.doe", "DONT_EXPIRE_PASSWD"));
        let report = Auditor::new(&[ConventionRule::FirstDotLast]).audit(&store);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.mismatches().count(), 1);
        assert!(report.finding("j.doe").unwrap().is_noted());
    }
}
