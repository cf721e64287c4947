//! Human-readable report rendering for terminal output.
//!
//! Produces the group listing, a member listing for one group, and the
//! naming-convention audit with its accounts of interest.
use colored::*;

use crate::audit::{AuditReport, Conformance};
use crate::member::MemberRecord;
use crate::store::{GroupSummary, UnknownGroup};

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

/// `Name - (count)` per group, then the total.
pub fn render_group_listing(groups: &[GroupSummary]) -> String {
    let mut out = String::new();
    for g in groups {
        out.push_str(&format!("{} - ({})\n", g.name, g.members));
    }
    out.push_str(&format!("\nTotal groups found: {}\n", groups.len()));
    out
}

/// One line per member: the short name, or the detailed form.
pub fn member_lines(members: &[&MemberRecord], detailed: bool) -> Vec<String> {
    members
        .iter()
        .map(|m| {
            if detailed {
                m.detailed_line()
            } else {
                m.short_name.clone()
            }
        })
        .collect()
}

pub fn render_member_count(group: &str, count: usize) -> String {
    format!("\n{} has {} unique users.\n", group.bold(), count)
}

/// Render a member listing, or the not-found message for an unknown group.
pub fn render_member_listing(
    group: &str,
    members: Result<&[&MemberRecord], &UnknownGroup>,
    detailed: bool,
) -> String {
    match members {
        Ok(list) => {
            let mut out = String::new();
            for line in member_lines(list, detailed) {
                out.push_str(&line);
                out.push('\n');
            }
            out.push_str(&render_member_count(group, list.len()));
            out
        }
        Err(e) => format!("{}\n", e.to_string().yellow()),
    }
}

pub fn render_audit(report: &AuditReport) -> String {
    let mut out = String::new();

    let rule_names: Vec<&str> = report.rules.iter().map(|r| r.name()).collect();
    let title = if rule_names.is_empty() {
        "Naming Convention Audit".to_string()
    } else {
        format!("Naming Convention Audit ({})", rule_names.join(", "))
    };
    out.push_str(&section_header(&title.bold().yellow().to_string()));
    let mut mismatches: Vec<String> = Vec::new();
    for f in report.mismatches() {
        let m = &f.member;
        let mut line = format!(
            "{} ({}) - Flags: {}",
            m.short_name.red(),
            m.canonical_name,
            m.flags
        );
        if let Conformance::Mismatch { expected } = &f.conformance {
            if !expected.is_empty() {
                let hint = format!(" [expected: {}]", expected.join(" | "));
                line.push_str(&hint.dimmed().to_string());
            }
        }
        mismatches.push(line);
    }
    if report.rules.is_empty() {
        out.push_str("(No naming rules selected)\n");
    } else if mismatches.is_empty() {
        out.push_str("(All accounts match the selected formats)\n");
    } else {
        out.push_str("Flagged accounts that don't match specified formats:\n");
        for line in mismatches {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.push_str(&section_header(
        &"Accounts With Noted Attributes".bold().cyan().to_string(),
    ));
    let mut any_noted = false;
    for f in report.noted() {
        any_noted = true;
        out.push_str(&format!(
            "  {} ({}) - {}\n",
            f.member.short_name,
            f.member.canonical_name,
            f.noted.join(", ").magenta()
        ));
    }
    if !any_noted {
        out.push_str("(No accounts with noted attributes)\n");
    }

    out.push_str(&format!(
        "\nAudited {} accounts: {} mismatched, {} noted\n",
        report.findings.len(),
        report.mismatches().count(),
        report.noted().count()
    ));
    out
}
