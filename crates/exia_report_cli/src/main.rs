use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use exia_report::{
    EnumLanguage, EnumMergeSortMode, JsonFileDirectoryLoader, ResourceDirectoryCache,
    SpecCharacterDataset, SpecLanguageLabels, SpecMergeOptions, SpecRenderOptions,
    ingest_dataset_json, merge_document_buffers, render_reports, sanitize_file_stem,
    write_document_to_path,
};
use exia_report_fs::{
    EnumCollectPatternMode, ReportCollect, SpecCollectOptions, collect_merge_sources,
    read_merge_sources,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Account report renderer and merger", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one xlsx report per dataset JSON
    Render(RenderArgs),
    /// Merge rendered reports into one sheet
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Dataset JSON files
    #[arg(long = "input", required = true, num_args = 1.., value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Output directory for `<name>.xlsx` reports
    #[arg(long, value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Label and display-name language
    #[arg(long, value_enum, default_value_t = LangOpt::En)]
    lang: LangOpt,

    /// Avatar resource directory JSON (`[{"id", "resource_id"}]`)
    #[arg(long, value_hint = ValueHint::FilePath)]
    resources: Option<PathBuf>,

    /// Label table JSON overriding the built-in one
    #[arg(long, value_hint = ValueHint::FilePath)]
    labels: Option<PathBuf>,

    /// Font family applied to every cell
    #[arg(long)]
    font: Option<String>,

    /// Hide equipment slot rows unless a dataset asks for them
    #[arg(long, action = ArgAction::SetTrue)]
    hide_equip_details: bool,

    /// Maximum render workers
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Directory holding rendered reports
    #[arg(long, value_hint = ValueHint::DirPath, conflicts_with = "inputs", required_unless_present = "inputs")]
    input_dir: Option<PathBuf>,

    /// Explicit report files
    #[arg(long, num_args = 1.., value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Merged workbook path
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Source ordering
    #[arg(long, value_enum, default_value_t = SortOpt::NameAsc)]
    sort: SortOpt,

    /// Include patterns for `--input-dir` (default `*.xlsx`)
    #[arg(long)]
    include: Vec<String>,

    /// Exclude patterns for `--input-dir` (default `~$*`)
    #[arg(long)]
    exclude: Vec<String>,

    /// Pattern interpretation for include/exclude
    #[arg(long, value_enum, default_value_t = PatternOpt::Glob)]
    pattern_mode: PatternOpt,

    /// Output sheet name
    #[arg(long, default_value = "Merged")]
    sheet_name: String,

    /// Maximum read workers
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LangOpt {
    En,
    Zh,
}

impl From<LangOpt> for EnumLanguage {
    fn from(value: LangOpt) -> Self {
        match value {
            LangOpt::En => EnumLanguage::En,
            LangOpt::Zh => EnumLanguage::Zh,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SortOpt {
    NameAsc,
    NameDesc,
    SynchroAsc,
    SynchroDesc,
}

impl From<SortOpt> for EnumMergeSortMode {
    fn from(value: SortOpt) -> Self {
        match value {
            SortOpt::NameAsc => EnumMergeSortMode::NameAsc,
            SortOpt::NameDesc => EnumMergeSortMode::NameDesc,
            SortOpt::SynchroAsc => EnumMergeSortMode::SynchroAsc,
            SortOpt::SynchroDesc => EnumMergeSortMode::SynchroDesc,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PatternOpt {
    Glob,
    Regex,
    Literal,
}

impl From<PatternOpt> for EnumCollectPatternMode {
    fn from(value: PatternOpt) -> Self {
        match value {
            PatternOpt::Glob => EnumCollectPatternMode::Glob,
            PatternOpt::Regex => EnumCollectPatternMode::Regex,
            PatternOpt::Literal => EnumCollectPatternMode::Literal,
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Merge(args) => handle_merge(args),
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region Render

fn load_labels(language: EnumLanguage, path: Option<&Path>) -> Result<SpecLanguageLabels> {
    let Some(path) = path else {
        return Ok(SpecLanguageLabels::builtin(language));
    };
    let c_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read label table {}", path.display()))?;
    let dict_labels: BTreeMap<String, String> = serde_json::from_str(&c_text)
        .with_context(|| format!("label table {} is not a string map", path.display()))?;
    Ok(SpecLanguageLabels::from_map(language, dict_labels)?)
}

fn load_dataset(path: &Path) -> Result<SpecCharacterDataset> {
    let c_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let (dataset, l_warnings) = ingest_dataset_json(&c_text)
        .with_context(|| format!("failed to decode dataset {}", path.display()))?;
    for msg in l_warnings {
        warn!("{}: {msg}", path.display());
    }
    Ok(dataset)
}

/// `<stem>.xlsx` under `dir`, with a numeric suffix when the stem is taken.
fn derive_output_path(dir: &Path, name: &str, set_used: &mut HashSet<String>) -> PathBuf {
    let c_stem = sanitize_file_stem(name);
    let mut c_candidate = c_stem.clone();
    let mut n_suffix = 2;
    while !set_used.insert(c_candidate.to_lowercase()) {
        c_candidate = format!("{c_stem}_{n_suffix}");
        n_suffix += 1;
    }
    dir.join(format!("{c_candidate}.xlsx"))
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let language = EnumLanguage::from(args.lang);
    let labels = load_labels(language, args.labels.as_deref())?;
    let avatars = match args.resources {
        Some(path) => ResourceDirectoryCache::new(JsonFileDirectoryLoader { path }),
        None => ResourceDirectoryCache::empty(),
    };

    let mut options = SpecRenderOptions {
        language,
        show_equip_details_default: !args.hide_equip_details,
        num_workers_max: args.workers,
        ..Default::default()
    };
    if let Some(font) = args.font {
        options.font_name = font;
    }

    let mut n_failed = 0usize;
    let mut l_datasets = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        match load_dataset(path) {
            Ok(dataset) => l_datasets.push(dataset),
            Err(err) => {
                warn!("{err:#}");
                n_failed += 1;
            }
        }
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let mut set_used = HashSet::new();
    let l_outcomes = render_reports(&l_datasets, &labels, &options, &avatars);
    for (dataset, outcome) in l_datasets.iter().zip(l_outcomes) {
        let (doc, report) = match outcome {
            Ok(v) => v,
            Err(err) => {
                warn!("render `{}` failed: {err}", dataset.name);
                n_failed += 1;
                continue;
            }
        };
        let path_out = derive_output_path(&args.out_dir, &dataset.name, &mut set_used);
        if let Err(err) = write_document_to_path(&doc, &path_out) {
            warn!("write {} failed: {err}", path_out.display());
            n_failed += 1;
            continue;
        }
        info!(
            "Wrote {} ({} characters, {} unowned, {} warnings)",
            path_out.display(),
            report.cnt_characters,
            report.cnt_unowned,
            report.warnings.len()
        );
    }

    if n_failed > 0 {
        bail!("{n_failed} of {} datasets failed", args.inputs.len());
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Merge

fn handle_merge(args: MergeArgs) -> Result<()> {
    let (l_sources, report_collect): (_, ReportCollect) = match &args.input_dir {
        Some(dir) => {
            let spec_collect_options = SpecCollectOptions {
                patterns_include_files: (!args.include.is_empty())
                    .then(|| args.include.clone())
                    .or(SpecCollectOptions::default().patterns_include_files),
                patterns_exclude_files: (!args.exclude.is_empty())
                    .then(|| args.exclude.clone())
                    .or(SpecCollectOptions::default().patterns_exclude_files),
                rule_pattern: args.pattern_mode.into(),
                num_workers_max: args.workers,
            };
            collect_merge_sources(dir, &spec_collect_options)
                .with_context(|| format!("failed to collect reports from {}", dir.display()))?
        }
        None => read_merge_sources(&args.inputs, args.workers),
    };
    info!("{report_collect}");
    if l_sources.is_empty() {
        return Err(anyhow!("no report files to merge"));
    }

    let options = SpecMergeOptions {
        rule_sort: args.sort.into(),
        sheet_name: args.sheet_name,
        ..Default::default()
    };
    let (doc, report) = merge_document_buffers(l_sources, &options)?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_document_to_path(&doc, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        "Merged {} reports ({} skipped, {} rows) into {}",
        report.sources_merged.len(),
        report.sources_skipped.len(),
        report.cnt_rows_written,
        args.output.display()
    );
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
