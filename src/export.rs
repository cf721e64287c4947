//! Export helpers for writing results to CSV and plain text files.
//!
//! - `save_member_listing_txt` writes one rendered member line per row.
//! - `save_group_listing_csv` writes `(Group, Members)` pairs.
//! - `save_audit_csv` writes one row per audited account with its verdicts.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::Writer;
use serde::Serialize;

use crate::audit::{AuditReport, Conformance, Verdict};
use crate::store::GroupSummary;

pub fn save_member_listing_txt<P: AsRef<Path>>(lines: &[String], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    for line in lines {
        writeln!(f, "{}", line)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct GroupRow<'a> {
    #[serde(rename = "Group")]
    group: &'a str,
    #[serde(rename = "Members")]
    members: usize,
}

pub fn save_group_listing_csv<P: AsRef<Path>>(groups: &[GroupSummary], path: P) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for g in groups {
        wtr.serialize(GroupRow {
            group: &g.name,
            members: g.members,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct AuditRow<'a> {
    #[serde(rename = "ShortName")]
    short_name: &'a str,
    #[serde(rename = "CanonicalName")]
    canonical_name: &'a str,
    #[serde(rename = "Flags")]
    flags: String,
    #[serde(rename = "Verdicts")]
    verdicts: String,
    #[serde(rename = "Expected")]
    expected: String,
}

fn verdict_label(v: Verdict) -> &'static str {
    match v {
        Verdict::Conforms => "conforms",
        Verdict::FlaggedMismatch => "mismatch",
        Verdict::NotedAttribute => "noted",
    }
}

pub fn save_audit_csv<P: AsRef<Path>>(report: &AuditReport, path: P) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for f in &report.findings {
        let expected = match &f.conformance {
            Conformance::Mismatch { expected } => expected.join(" | "),
            _ => String::new(),
        };
        let verdicts: Vec<&str> = f.verdicts().into_iter().map(verdict_label).collect();
        wtr.serialize(AuditRow {
            short_name: &f.member.short_name,
            canonical_name: &f.member.canonical_name,
            flags: f.member.flags.to_string(),
            verdicts: verdicts.join(";"),
            expected,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Auditor, ConventionRule};
    use crate::member::MemberRecord;
    use crate::store::{GroupStore, SortMode};
    use tempfile::tempdir;

    #[test]
    fn writes_csv_and_txt() {
        let mut s = GroupStore::new();
        s.add("Domain Admins", MemberRecord::new("John Smith", "jsmith", ""));
        s.add(
            "Domain Admins",
            MemberRecord::new("Jane Doe", "j.doe", "NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD"),
        );
        let report = Auditor::new(&[ConventionRule::FirstDotLast]).audit(&s);

        let dir = tempdir().unwrap();
        let groups_path = dir.path().join("groups.csv");
        let audit_path = dir.path().join("audit.csv");
        let txt_path = dir.path().join("members.txt");
        save_group_listing_csv(&s.list_groups(SortMode::Alphabetical), &groups_path).unwrap();
        save_audit_csv(&report, &audit_path).unwrap();
        save_member_listing_txt(&["j.doe".to_string(), "jsmith".to_string()], &txt_path).unwrap();

        let groups = std::fs::read_to_string(groups_path).unwrap();
        let audit = std::fs::read_to_string(audit_path).unwrap();
        let txt = std::fs::read_to_string(txt_path).unwrap();
        assert_eq!(groups, "Group,Members\nDomain Admins,2\n");
        assert!(audit.starts_with("ShortName,CanonicalName,Flags,Verdicts,Expected\n"));
        assert!(audit.contains("j.doe,Jane Doe,\"NORMAL_ACCOUNT, DONT_EXPIRE_PASSWD\",mismatch;noted,jane.doe\n"));
        assert!(audit.contains("jsmith,John Smith,,mismatch,john.smith\n"));
        assert_eq!(txt, "j.doe\njsmith\n");
    }
}
