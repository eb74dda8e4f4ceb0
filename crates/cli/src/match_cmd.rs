//! `rlink match` and `rlink validate`.

use std::path::{Path, PathBuf};

use clap::Args;
use rosterlink_io::checkpoint::{self, checkpoint_path, config_fingerprint, Checkpoint};
use rosterlink_io::csv::resolve_encoding;
use rosterlink_io::report::{report_headers, report_row, truncate_report, ReportFormat, ReportWriter};
use rosterlink_io::roster::{load_external, load_registry, LoadOptions};
use rosterlink_io::IoError;
use rosterlink_linkage::summary::VerdictCounts;
use rosterlink_linkage::{MatchConfig, Matcher, RunSummary};

use crate::exit_codes::EXIT_CHECKPOINT_MISMATCH;
use crate::CliError;

const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Args)]
pub struct MatchArgs {
    /// Employee registry CSV (first_name, last_name, id, birth_date, employer[, parents, previous])
    pub registry: PathBuf,

    /// External roster CSV (employer, first_name, last_name, ...)
    pub external: PathBuf,

    /// Report path; .xlsx writes Excel, anything else CSV
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Match config TOML; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum first-name ratio (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_first_name_ratio: Option<u8>,

    /// Minimum last-name ratio (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_last_name_ratio: Option<u8>,

    /// Minimum company ratio (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_company_ratio: Option<u8>,

    /// Separator inside the parent / previous employer columns
    #[arg(long)]
    pub list_separator: Option<String>,

    /// Extra generic word to strip from company names (repeatable)
    #[arg(long = "company-word")]
    pub company_words: Vec<String>,

    /// Registry file encoding
    #[arg(long, default_value = "utf-8")]
    pub registry_encoding: String,

    /// External roster encoding
    #[arg(long, default_value = "windows-1252")]
    pub external_encoding: String,

    /// Report encoding (CSV only)
    #[arg(long, default_value = "windows-1252")]
    pub output_encoding: String,

    /// Input field delimiter (default: sniffed)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Process inputs beyond 1,048,576 rows or 16,384 columns
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Continue an interrupted run from its checkpoint
    #[arg(long)]
    pub resume: bool,

    /// External records per batch; a checkpoint is written after each
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Config file (or defaults) with command-line overrides applied, validated.
fn effective_config(args: &MatchArgs) -> Result<MatchConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::from_file(path).map_err(CliError::config)?,
        None => MatchConfig::default(),
    };
    if let Some(v) = args.min_first_name_ratio {
        config.min_first_name_match_ratio = v;
    }
    if let Some(v) = args.min_last_name_ratio {
        config.min_last_name_match_ratio = v;
    }
    if let Some(v) = args.min_company_ratio {
        config.min_company_match_ratio = v;
    }
    if let Some(sep) = &args.list_separator {
        config.list_separator = sep.clone();
    }
    config.extra_company_words.extend(args.company_words.iter().cloned());
    config.validate().map_err(CliError::config)?;
    Ok(config)
}

fn delimiter_byte(delimiter: Option<char>) -> Result<Option<u8>, CliError> {
    match delimiter {
        None => Ok(None),
        Some(c) if c.is_ascii() => Ok(Some(c as u8)),
        Some(c) => Err(CliError::usage(format!("delimiter must be a single ASCII character, got '{c}'"))),
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// Index of the first external record to score. On resume the report is cut
/// back to the length the checkpoint recorded.
fn resume_index(
    resume: bool,
    cp_path: &Path,
    output: &Path,
    current: &Checkpoint,
    total: usize,
) -> Result<usize, CliError> {
    if !resume {
        if cp_path.exists() {
            log::warn!(
                "discarding checkpoint {} from an earlier run (pass --resume to continue it)",
                cp_path.display()
            );
            checkpoint::remove(cp_path)?;
        }
        return Ok(0);
    }

    let Some(saved) = Checkpoint::load(cp_path)? else {
        log::warn!("no checkpoint at {}; starting from the first record", cp_path.display());
        return Ok(0);
    };
    if let Some(changed) = saved.mismatch(current) {
        return Err(CliError::new(
            EXIT_CHECKPOINT_MISMATCH,
            format!("checkpoint {} does not match this run: {changed} changed", cp_path.display()),
        )
        .with_hint("rerun without --resume to start over"));
    }
    if !output.exists() {
        return Err(CliError::new(
            EXIT_CHECKPOINT_MISMATCH,
            format!("checkpoint found but report {} is missing", output.display()),
        )
        .with_hint("rerun without --resume to start over"));
    }
    let dropped = truncate_report(output, saved.report_bytes)?;
    if dropped > 0 {
        log::warn!(
            "{}: dropped {dropped} bytes written after the last checkpoint",
            output.display()
        );
    }
    let start = saved.next_index.min(total);
    log::info!("resuming at record {} of {}", start, total);
    Ok(start)
}

// ---------------------------------------------------------------------------
// rlink match
// ---------------------------------------------------------------------------

pub fn cmd_match(args: MatchArgs) -> Result<(), CliError> {
    let config = effective_config(&args)?;
    if args.batch_size == 0 {
        return Err(CliError::usage("--batch-size must be at least 1"));
    }
    let registry_encoding = resolve_encoding(&args.registry_encoding)?;
    let external_encoding = resolve_encoding(&args.external_encoding)?;
    let output_encoding = resolve_encoding(&args.output_encoding)?;
    let delimiter = delimiter_byte(args.delimiter)?;

    let format = ReportFormat::from_path(&args.output);
    if args.resume && format == ReportFormat::Xlsx {
        return Err(CliError::usage("--resume is not supported for .xlsx reports")
            .with_hint("write a .csv report to checkpoint long runs"));
    }

    let load_options = |encoding| LoadOptions {
        encoding,
        delimiter,
        list_separator: config.list_separator.clone(),
        ignore_size_limits: args.ignore_warnings,
        ..LoadOptions::new(encoding)
    };
    let registry = load_registry(&args.registry, &load_options(registry_encoding))?;
    let external = load_external(&args.external, &load_options(external_encoding))?;
    let total = external.len();

    log::info!(
        "thresholds: first name {}, last name {}, company {}",
        config.min_first_name_match_ratio,
        config.min_last_name_match_ratio,
        config.min_company_match_ratio
    );

    let mut progress = Checkpoint::new(&registry.fingerprint, &external.fingerprint, &config_fingerprint(&config)?);
    let cp_path = checkpoint_path(&args.output);
    let start = resume_index(args.resume, &cp_path, &args.output, &progress, total)?;

    let matcher = Matcher::new(&config, &registry.records).map_err(CliError::config)?;
    let mut writer = ReportWriter::create(
        &args.output,
        report_headers(&external.headers),
        output_encoding,
        start > 0,
    )?;
    let checkpointing = writer.format() == ReportFormat::Csv;

    let mut counts = VerdictCounts::default();
    matcher.match_batches(&external.records, start, args.batch_size, |range, verdicts| {
        let rows = external.records[range.clone()]
            .iter()
            .zip(&verdicts)
            .map(|(record, verdict)| {
                counts.add(verdict);
                report_row(record, verdict)
            })
            .collect();
        writer.write_rows(rows)?;
        if checkpointing {
            progress.next_index = range.end;
            progress.report_bytes = writer.synced_len();
            progress.save(&cp_path)?;
        }
        log::debug!("batch {}..{} written", range.start, range.end);
        log::info!("{} of {} [{} matched]", range.end, total, counts.matched());
        Ok::<(), IoError>(())
    })?;

    writer.finish()?;
    checkpoint::remove(&cp_path)?;

    let summary = RunSummary::new(&config, registry.len(), total, start, counts);
    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    eprintln!("wrote {}", args.output.display());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let c = &summary.counts;
    let meta = &summary.meta;
    if meta.resumed_at > 0 {
        eprintln!(
            "resumed at record {}: {} of {} external records matched in this run",
            meta.resumed_at, c.total, meta.external_records
        );
    } else {
        eprintln!(
            "{} external records against {} registry records",
            meta.external_records, meta.registry_records
        );
    }
    eprintln!(
        "  {} unique, {} ambiguous ({} with one birth date), {} unmatched, {} partial",
        c.unique, c.ambiguous, c.ambiguous_same_birth_date, c.unmatched, c.partial
    );
}

// ---------------------------------------------------------------------------
// rlink validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = MatchConfig::from_file(&config_path).map_err(CliError::config)?;
    let effective = toml::to_string(&config)
        .map_err(|e| CliError::general(format!("cannot render config: {e}")))?;
    eprintln!(
        "valid: thresholds {}/{}/{}, {} generic company word(s)",
        config.min_first_name_match_ratio,
        config.min_last_name_match_ratio,
        config.min_company_match_ratio,
        config.company_words().count(),
    );
    print!("{effective}");
    Ok(())
}
