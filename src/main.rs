//! CLI entrypoint for `addump`.
//!
//! Parses command-line arguments, reads the HTML group dump, prints either the
//! group listing or the members of one group, runs the naming-convention
//! audit when asked to, and optionally writes CSV exports.
use std::fs;
use std::path::PathBuf;

use addump::{
    audit::{ConventionRule, DONT_EXPIRE_PASSWD},
    engine::{AnalysisOptions, Engine},
    export::{save_audit_csv, save_group_listing_csv, save_member_listing_txt},
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    layout::ExportLayout,
    report::{
        member_lines, render_audit, render_group_listing, render_member_count,
        render_member_listing,
    },
    store::SortMode,
};
use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info};

#[derive(Parser, Debug)]
#[command(
    name = "addump",
    version,
    about = "Parse domain groups and their users from an HTML dump"
)]
struct Args {
    /// Input HTML file
    #[arg(short = 'i', long = "input", required = true)]
    input: PathBuf,

    /// Group name to list users from (e.g. "Domain Users")
    #[arg(short = 'g', long = "group")]
    group: Option<String>,

    /// Output file for the user list of --group
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Sort groups by number of users (largest to smallest)
    #[arg(long = "sort")]
    sort: bool,

    /// Display CN and flags for users in the specified group
    #[arg(long = "detailed")]
    detailed: bool,

    /// Expect SAM names in "first.last" format
    #[arg(long = "first-last")]
    first_last: bool,

    /// Expect SAM names in "fLast" format
    #[arg(long = "flast")]
    flast: bool,

    /// Expect SAM names in "f.last" format
    #[arg(long = "f-dot-last")]
    f_dot_last: bool,

    /// Member table layout (detailed, minimal, header-cell)
    #[arg(long = "layout", default_value = "detailed")]
    layout: ExportLayout,

    /// Extra account flag to report for attention (repeatable)
    #[arg(long = "note-flag")]
    note_flags: Vec<String>,

    /// Run the audit even when no naming format is selected
    #[arg(long = "audit")]
    audit: bool,

    /// Directory for timestamped CSV exports
    #[arg(long = "export-dir")]
    export_dir: Option<PathBuf>,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log counts of sections and skipped rows encountered during parsing
    #[arg(long = "log-parse-stats")]
    log_parse_stats: bool,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }
    Ok(())
}

fn options_from_args(args: &Args) -> AnalysisOptions {
    let mut rules = Vec::new();
    if args.first_last {
        rules.push(ConventionRule::FirstDotLast);
    }
    if args.flast {
        rules.push(ConventionRule::FirstInitialLast);
    }
    if args.f_dot_last {
        rules.push(ConventionRule::FirstInitialDotLast);
    }
    let mut noted_attributes = vec![DONT_EXPIRE_PASSWD.to_string()];
    for flag in &args.note_flags {
        if !noted_attributes.contains(flag) {
            noted_attributes.push(flag.clone());
        }
    }
    AnalysisOptions {
        layout: args.layout,
        rules,
        noted_attributes,
        sort: if args.sort {
            SortMode::BySize
        } else {
            SortMode::Alphabetical
        },
        detailed: args.detailed,
        output: args.output.clone(),
    }
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    // Configure color policy
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        error!("{}", e);
        std::process::exit(2);
    }
    let opts = options_from_args(&args);
    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };

    let mut engine = Engine::new(opts.layout);
    if let Err(e) = engine.load_from_file_path_with_threshold(&args.input, threshold) {
        error!("failed to load input: {:#}", e);
        std::process::exit(3);
    }

    if let Some(group) = &args.group {
        let members = engine.store.list_members(group);
        match (&members, &opts.output) {
            (Ok(list), Some(path)) => {
                let lines = member_lines(list, opts.detailed);
                if let Err(e) = save_member_listing_txt(&lines, path) {
                    error!("failed to write {}: {}", path.display(), e);
                    std::process::exit(4);
                }
                info!("wrote {} users to {}", list.len(), path.display());
                print!("{}", render_member_count(group, list.len()));
            }
            _ => {
                let view = members.as_ref().map(|v| v.as_slice());
                print!("{}", render_member_listing(group, view, opts.detailed));
            }
        }
    } else {
        print!("{}", render_group_listing(&engine.store.list_groups(opts.sort)));
    }

    let wants_audit = !opts.rules.is_empty() || args.audit;
    let report = (wants_audit || args.export_dir.is_some())
        .then(|| engine.audit(&opts.rules, &opts.noted_attributes));
    if let (true, Some(report)) = (wants_audit, &report) {
        print!("{}", render_audit(report));
    }

    if let (Some(outdir), Some(report)) = (&args.export_dir, &report) {
        if let Err(e) = fs::create_dir_all(outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            std::process::exit(5);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let groups_csv = outdir.join(format!("addump_groups_{}.csv", ts));
        let audit_csv = outdir.join(format!("addump_audit_{}.csv", ts));
        let groups = engine.store.list_groups(opts.sort);
        if let Err(e) = save_group_listing_csv(&groups, &groups_csv) {
            error!("failed to write {}: {}", groups_csv.display(), e);
            std::process::exit(5);
        }
        if let Err(e) = save_audit_csv(report, &audit_csv) {
            error!("failed to write {}: {}", audit_csv.display(), e);
            std::process::exit(5);
        }
    }

    if args.log_parse_stats {
        if let Some(stats) = engine.parse_stats {
            log::info!(
                "parse stats: sections={}, without_table={}, rows={}, skipped_rows={}",
                stats.sections,
                stats.sections_without_table,
                stats.fragments,
                stats.skipped_fragments
            );
        } else {
            log::info!("parse stats: (not collected for this run)");
        }
    }
}
