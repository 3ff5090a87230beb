//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{ColoredString, Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use package_validation_suite::core::config::Config;
use package_validation_suite::core::errors::PvsError;
use package_validation_suite::core::manifest::{
    DirectoryManifestProvider, ManifestProvider, PackageId, PackageManifestData, PackageSnapshot,
    StaticManifestProvider,
};
use package_validation_suite::core::paths::resolve_absolute_path;
use package_validation_suite::diff::engine::DiffEngine;
use package_validation_suite::diff::report::{render_delta_report, write_delta_report};
use package_validation_suite::logger::jsonl::{JsonlConfig, JsonlWriter};
use package_validation_suite::snapshot::fs::StdFs;
use package_validation_suite::snapshot::walker::{TreeWalker, find_files};
use package_validation_suite::validation::context::ValidationContext;
use package_validation_suite::validation::outcome::{CheckOutcome, CheckState, Severity};
use package_validation_suite::validation::registry::CheckRegistry;
use package_validation_suite::validation::report::{ReportStatus, ValidationReport};
use package_validation_suite::validation::store::ReportStore;
use package_validation_suite::validation::suite::ValidationSuite;

/// Package Validation Suite: run checks against a package and report what changed.
#[derive(Debug, Parser)]
#[command(
    name = "pvs",
    author,
    version,
    about = "Package Validation Suite",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Validate a package and store the report.
    Validate(ValidateArgs),
    /// Compare two package versions and print or write the delta report.
    Diff(DiffArgs),
    /// List a package tree, or the files matching a glob.
    Tree(TreeArgs),
    /// List registered checks.
    Checks(ChecksArgs),
    /// Show a stored validation report.
    Report(ReportArgs),
    /// Print the effective configuration.
    Config,
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct ValidateArgs {
    /// Package root directory.
    #[arg(value_name = "PATH")]
    path: PathBuf,
    /// Root of the previous release, enabling the diff evaluation.
    #[arg(long, value_name = "PATH")]
    previous: Option<PathBuf>,
    /// Package name (read from package.json when omitted).
    #[arg(long, requires = "package_version")]
    name: Option<String>,
    /// Package version (read from package.json when omitted).
    #[arg(long = "version", id = "package_version", value_name = "VERSION", requires = "name")]
    package_version: Option<String>,
    /// Previous release version when its root has no package.json.
    #[arg(long, requires = "previous", requires = "name")]
    previous_version: Option<String>,
    /// Validation context (defaults to `validation.default_context`).
    #[arg(long, value_enum)]
    context: Option<ValidationContext>,
    /// Directory receiving reports and delta files.
    #[arg(long, value_name = "DIR")]
    results_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct DiffArgs {
    /// Previous release root.
    #[arg(value_name = "OLD")]
    old: PathBuf,
    /// Current release root.
    #[arg(value_name = "NEW")]
    new: PathBuf,
    /// Write `<name>@<version>.delta` into DIR instead of printing it.
    #[arg(long, value_name = "DIR")]
    write: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct TreeArgs {
    /// Directory to list.
    #[arg(value_name = "PATH")]
    path: PathBuf,
    /// Only list files whose relative path matches this glob.
    #[arg(long, value_name = "GLOB")]
    pattern: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct ChecksArgs {
    /// Only list checks supporting this context.
    #[arg(long, value_enum)]
    context: Option<ValidationContext>,
}

#[derive(Debug, Clone, Args)]
struct ReportArgs {
    /// Report key, `name@version`.
    #[arg(value_name = "PACKAGE_ID")]
    package_id: String,
    /// Directory holding persisted reports (defaults to `paths.results_dir`).
    #[arg(long, value_name = "DIR")]
    results_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid input, or a validation that ended Failed.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<PvsError> for CliError {
    fn from(err: PvsError) -> Self {
        match err {
            PvsError::InvalidConfig { .. }
            | PvsError::MissingConfig { .. }
            | PvsError::ConfigParse { .. }
            | PvsError::InvalidManifest { .. }
            | PvsError::InvalidPackageId { .. }
            | PvsError::UnknownContext { .. } => Self::User(err.to_string()),
            PvsError::DuplicateCheck { .. } | PvsError::Serialization { .. } => {
                Self::Internal(err.to_string())
            }
            PvsError::PermissionDenied { .. } | PvsError::Io { .. } | PvsError::Runtime { .. } => {
                Self::Runtime(err.to_string())
            }
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Validate(args) => run_validate(cli, args),
        Command::Diff(args) => run_diff(cli, args),
        Command::Tree(args) => run_tree(cli, args),
        Command::Checks(args) => run_checks(cli, args),
        Command::Report(args) => run_report(cli, args),
        Command::Config => run_config(cli),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn run_validate(cli: &Cli, args: &ValidateArgs) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &args.results_dir {
        config.paths.results_dir = resolve_absolute_path(dir);
    }
    let context = args.context.unwrap_or(config.validation.default_context);

    let root = resolve_absolute_path(&args.path);
    let previous_root = args.previous.as_deref().map(resolve_absolute_path);
    let provider: Box<dyn ManifestProvider> = match (&args.name, &args.package_version) {
        (Some(name), Some(version)) => {
            let current = PackageManifestData::new(name.clone(), version, &root)?;
            let previous = match (&previous_root, &args.previous_version) {
                (Some(prev), Some(prev_version)) => {
                    Some(PackageManifestData::new(name.clone(), prev_version, prev)?)
                }
                (Some(prev), None) => Some(DirectoryManifestProvider::read(prev)?),
                (None, _) => None,
            };
            Box::new(StaticManifestProvider::new(PackageSnapshot::new(
                current, previous,
            )))
        }
        _ => Box::new(DirectoryManifestProvider::new(root, previous_root)),
    };

    let mut suite = ValidationSuite::from_config(&config);
    if config.logging.enabled {
        suite = suite.with_activity_log(Arc::new(JsonlWriter::open(JsonlConfig::from_config(
            &config,
        ))));
    }
    let report = suite.validate_package(provider.as_ref(), context)?;

    match output_mode(cli) {
        OutputMode::Human => {
            print_report_human(&report, suite.store().delta_report_path(&report.package_id));
        }
        OutputMode::Json => write_json_line(&report_json(&report, suite.store()))?,
    }

    if report.succeeded() {
        Ok(())
    } else {
        Err(CliError::User(format!(
            "validation failed for {} ({} failed check(s))",
            report.package_id,
            report.count(CheckState::Failed)
        )))
    }
}

fn run_diff(cli: &Cli, args: &DiffArgs) -> Result<(), CliError> {
    let previous = DirectoryManifestProvider::read(&resolve_absolute_path(&args.old))?;
    let current = DirectoryManifestProvider::read(&resolve_absolute_path(&args.new))?;
    let result = DiffEngine::new(&StdFs).compare_packages(&previous, &current)?;

    let written = match &args.write {
        Some(dir) => Some(write_delta_report(dir, &current, &previous, &result)?),
        None => None,
    };

    match output_mode(cli) {
        OutputMode::Human => match &written {
            Some(path) => println!(
                "Delta report written: {} ({} added, {} removed, {} modified)",
                path.display(),
                result.added.len(),
                result.removed.len(),
                result.modified.len()
            ),
            None => print!("{}", render_delta_report(&current, &previous, &result)),
        },
        OutputMode::Json => {
            let mut payload = serde_json::to_value(&result)?;
            payload["package"] = json!(current.id());
            payload["compared_to"] = json!(previous.version().to_string());
            payload["written"] = json!(written);
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_tree(cli: &Cli, args: &TreeArgs) -> Result<(), CliError> {
    let root = resolve_absolute_path(&args.path);
    let mode = output_mode(cli);

    if let Some(pattern) = &args.pattern {
        let matches = find_files(&StdFs, &root, pattern)?;
        let relative: Vec<String> = matches
            .iter()
            .map(|path| {
                path.strip_prefix(&root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        match mode {
            OutputMode::Human => {
                for path in &relative {
                    println!("{path}");
                }
                eprintln!("{} file(s) match {pattern}", relative.len());
            }
            OutputMode::Json => write_json_line(&json!({
                "root": root,
                "pattern": pattern,
                "matches": relative,
            }))?,
        }
        return Ok(());
    }

    let items = TreeWalker::new(&StdFs)
        .list(&root)
        .collect::<package_validation_suite::core::errors::Result<Vec<_>>>()?;
    match mode {
        OutputMode::Human => {
            for item in &items {
                let indent = "    ".repeat(item.depth.saturating_sub(1));
                let name = item
                    .path
                    .file_name()
                    .map_or_else(|| item.portable_path(), |n| n.to_string_lossy().into_owned());
                if item.is_dir() {
                    println!("{indent}<{name}> ({} files)", item.child_count);
                } else {
                    println!("{indent}{name}");
                }
            }
        }
        OutputMode::Json => write_json_line(&json!({ "root": root, "items": items }))?,
    }
    Ok(())
}

fn run_checks(cli: &Cli, args: &ChecksArgs) -> Result<(), CliError> {
    let registry = CheckRegistry::with_builtin_checks();
    let descriptors: Vec<_> = registry
        .descriptors()
        .filter(|descriptor| args.context.is_none_or(|context| descriptor.supports(context)))
        .collect();

    match output_mode(cli) {
        OutputMode::Human => {
            if descriptors.is_empty() {
                println!("No registered checks support this context.");
            }
            for descriptor in &descriptors {
                let contexts: Vec<&str> = descriptor.contexts.iter().map(|c| c.as_str()).collect();
                println!("{} ({})", descriptor.name.bold(), descriptor.id);
                println!("    category: {}", descriptor.category);
                println!("    contexts: {}", contexts.join(", "));
                println!("    {}", descriptor.description);
            }
        }
        OutputMode::Json => write_json_line(&json!({ "checks": descriptors }))?,
    }
    Ok(())
}

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), CliError> {
    let id: PackageId = args.package_id.parse()?;
    let results_dir = match &args.results_dir {
        Some(dir) => resolve_absolute_path(dir),
        None => Config::load(cli.config.as_deref())?.paths.results_dir,
    };
    let store = ReportStore::at(&results_dir, true);
    let Some(report) = store.get(&id)? else {
        return Err(CliError::User(format!(
            "no report for {id} in {}",
            results_dir.display()
        )));
    };

    match output_mode(cli) {
        OutputMode::Human => print_report_human(&report, store.delta_report_path(&id)),
        OutputMode::Json => write_json_line(&report_json(&report, &store))?,
    }
    Ok(())
}

fn run_config(cli: &Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    match output_mode(cli) {
        OutputMode::Human => {
            println!("# {}", config.paths.config_file.display());
            print!("{}", config.to_toml()?);
        }
        OutputMode::Json => write_json_line(&json!({
            "config": config,
            "hash": config.stable_hash()?,
        }))?,
    }
    Ok(())
}

fn report_json(report: &ValidationReport, store: &ReportStore) -> Value {
    let delta = store
        .delta_report_path(&report.package_id)
        .filter(|path| path.is_file());
    json!({
        "status": report.status(),
        "succeeded": report.succeeded(),
        "report": report,
        "delta_report": delta,
    })
}

fn print_report_human(report: &ValidationReport, delta: Option<PathBuf>) {
    println!(
        "Validation of {} ({}): {}",
        report.package_id,
        report.context,
        status_label(report.status())
    );
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    if report.outcomes.is_empty() {
        println!("  No checks apply to this context.");
    }
    if let Some(path) = delta.filter(|path| path.is_file()) {
        println!("Delta report: {}", path.display());
    }
}

fn print_outcome(outcome: &CheckOutcome) {
    let state = match outcome.state {
        CheckState::Succeeded if outcome.has_warnings() => "warnings".yellow(),
        CheckState::Succeeded => "succeeded".green(),
        CheckState::Failed => "failed".red(),
        CheckState::NotRun => "not run".dimmed(),
    };
    println!(
        "  [{state}] {} ({}, {} ms)",
        outcome.name, outcome.id, outcome.elapsed_ms
    );
    for message in &outcome.messages {
        let label = match message.severity {
            Severity::Information => "info".normal(),
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        println!("      {label}: {}", message.text);
    }
}

fn status_label(status: ReportStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        ReportStatus::Success => text.green().bold(),
        ReportStatus::Warnings => text.yellow().bold(),
        ReportStatus::Failed => text.red().bold(),
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("PVS_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
