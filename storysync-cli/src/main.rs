//! # storysync
//!
//! Keeps Storybook stories in sync with the prop contracts of UI components.
//!
//! ## Usage
//!
//! ```bash
//! # Watch src/components and keep src/stories in sync
//! storysync watch
//!
//! # Create missing stories and refresh existing ones, once
//! storysync sync
//!
//! # Preview what a sync would write
//! storysync sync --dry-run
//!
//! # Initialize configuration
//! storysync init
//! ```
//!
//! Log verbosity is read from `STORYSYNC_LOG` (default `info`).

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storysync::{
    story::ArgTypesChange, SkipReason, SyncOutcome, WatchEvent, WriteResult,
};
use storysync_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::{CliError, CliResult, WatchError},
    session::{EventReport, Session},
    watcher::{FileWatcher, FsSignal},
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "STORYSYNC_LOG";

#[derive(Parser)]
#[command(name = "storysync")]
#[command(author, version, about = "Keep Storybook stories in sync with component props", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the components directory and sync stories as files change
    Watch {
        #[command(flatten)]
        project: ProjectArgs,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Create missing stories and reconcile existing ones, then exit
    Sync {
        #[command(flatten)]
        project: ProjectArgs,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Initialize a new storysync configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by the commands that touch a project.
#[derive(Args)]
struct ProjectArgs {
    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root
    #[arg(long)]
    root: Option<PathBuf>,

    /// Components directory, relative to the project root
    #[arg(short = 'c', long)]
    components_dir: Option<PathBuf>,

    /// Stories directory, relative to the project root
    #[arg(short = 's', long)]
    stories_dir: Option<PathBuf>,

    /// Comma-separated component file extensions
    #[arg(short = 'e', long, value_delimiter = ',')]
    component_exts: Option<Vec<String>>,

    /// Story file extension
    #[arg(short = 'x', long)]
    story_ext: Option<String>,

    /// Name of the default story export
    #[arg(short = 'n', long)]
    default_story_name: Option<String>,

    /// Do not generate argTypes
    #[arg(long)]
    no_arg_types: bool,

    /// Wire function props to action('name')
    #[arg(long)]
    actions: bool,

    /// Maximum nesting depth of synthesized default values
    #[arg(long)]
    max_depth: Option<usize>,

    /// Do not run the formatter over rewritten stories
    #[arg(long)]
    no_format: bool,
}

impl ProjectArgs {
    fn to_cli_args(&self) -> CliArgs {
        CliArgs {
            root: self.root.clone(),
            components: self.components_dir.clone(),
            stories: self.stories_dir.clone(),
            extensions: self.component_exts.as_ref().map(|exts| {
                exts.iter().map(|ext| ext.trim().to_string()).collect()
            }),
            story_extension: self.story_ext.clone(),
            default_story: self.default_story_name.clone(),
            arg_types: self.no_arg_types.then_some(false),
            actions: self.actions.then_some(true),
            max_depth: self.max_depth,
            format: self.no_format.then_some(false),
        }
    }

    /// Load, merge, anchor and validate the configuration.
    fn resolve(&self) -> CliResult<Config> {
        let config = ConfigManager::load(self.config.as_deref())?;
        let config = ConfigManager::merge_cli_args(config, &self.to_cli_args());
        let config = config.anchored_at(&std::env::current_dir()?);
        ConfigManager::validate(&config)?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Incomplete { .. } => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Watch { project, dry_run } => cmd_watch(&project.resolve()?, dry_run),
        Commands::Sync { project, dry_run } => cmd_sync(&project.resolve()?, dry_run),
        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Sync command implementation.
fn cmd_sync(config: &Config, dry_run: bool) -> CliResult<()> {
    let session = Session::from_config(config, dry_run)?;
    print_session(&session, config);
    println!("{}", "Scanning for components...".cyan());

    let reports = session.sync_all()?;
    if reports.is_empty() {
        println!("{}", "No components found.".yellow());
        return Ok(());
    }

    let root = &config.paths.root;
    for report in &reports {
        print_report(report, root);
    }

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    println!(
        "\n  Synced {} component(s), {} failed",
        (reports.len() - failed).to_string().green(),
        failed.to_string().red()
    );

    if failed > 0 {
        return Err(CliError::Incomplete { failed });
    }
    Ok(())
}

/// Watch command implementation.
fn cmd_watch(config: &Config, dry_run: bool) -> CliResult<()> {
    let session = Session::from_config(config, dry_run)?;
    print_session(&session, config);

    let components_root = session.orchestrator().config().components_root();
    let mut classifier = session.classifier()?;
    println!(
        "  Tracking {} existing component(s)",
        classifier.len().to_string().green()
    );

    let watcher = FileWatcher::new(&components_root).with_debounce(config.watch.debounce_ms);
    let (_debouncer, rx) = watcher.watch()?;

    let root = &config.paths.root;
    println!(
        "\n{} {} {}",
        "Watching".cyan(),
        relative(watcher.root(), root).yellow(),
        "for changes... (Ctrl+C to stop)".cyan()
    );

    while let Ok(signal) = rx.recv() {
        let path = match signal {
            FsSignal::Touched(path) => path,
            FsSignal::Error(message) => {
                let error = WatchError::Notify(message);
                tracing::error!(error = %error, "Watcher error");
                println!("{} {}", "Watch error:".red(), error);
                continue;
            }
        };

        let events = match session.events_for(&mut classifier, &path) {
            Ok(events) => events,
            Err(e) => {
                println!("{} {}: {}", "Scan error:".red(), relative(&path, root), e);
                continue;
            }
        };

        for event in events {
            print_event(&event, root);
            print_report(&session.dispatch(event), root);
        }
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> CliResult<()> {
    if output.exists() && !force {
        println!("  Use --force to overwrite");
        return Err(CliError::AlreadyExists(output));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

fn print_session(session: &Session, config: &Config) {
    let sync = session.orchestrator().config();
    let root = &config.paths.root;

    println!("{}", "storysync".bold().green());
    println!(
        "  Components: {}",
        relative(&sync.components_root(), root).yellow()
    );
    println!("  Stories:    {}", relative(&sync.stories_root(), root).yellow());
    println!(
        "  Extensions: {}  Story: {}  Default export: {}",
        sync.component_extensions.join(", ").yellow(),
        sync.story_extension.yellow(),
        sync.default_story_name.yellow()
    );
    if session.orchestrator().is_dry_run() {
        println!("  {}", "Dry run: no files will be written".yellow());
    }
    if config.formatter_command().is_none() {
        println!("  {}", "Formatter disabled".dimmed());
    }
}

fn print_event(event: &WatchEvent, root: &Path) {
    println!(
        "\n{} {}",
        format!("Component {}:", event.kind).cyan(),
        relative(&event.path, root)
    );
}

fn print_report(report: &EventReport, root: &Path) {
    let outcome = match &report.result {
        Ok(outcome) => outcome,
        Err(e) => {
            println!(
                "{} {}: {}",
                "✗".red(),
                relative(&report.event.path, root),
                e
            );
            return;
        }
    };

    match outcome {
        SyncOutcome::Created { write, props } => {
            print_write(write, root, &format!("Created story ({props} prop(s))"));
        }
        SyncOutcome::Reconciled { write, report } => {
            let arg_types = match report.arg_types {
                ArgTypesChange::Replaced => "argTypes replaced",
                ArgTypesChange::Inserted => "argTypes inserted",
                ArgTypesChange::Removed => "argTypes removed",
                ArgTypesChange::Untouched => "argTypes untouched",
            };
            let args = if report.args_updated {
                "args updated"
            } else {
                "args untouched"
            };
            print_write(write, root, &format!("Updated story ({arg_types}, {args})"));
            for diagnostic in &report.diagnostics {
                println!("  {} {}", "Warning:".yellow(), diagnostic);
            }
        }
        SyncOutcome::Unchanged { artifact } => {
            println!("{} Up to date: {}", "✓".green(), relative(artifact, root));
        }
        SyncOutcome::Skipped { artifact, reason } => {
            let reason = match reason {
                SkipReason::Unrecognized | SkipReason::Unparsable { .. } => {
                    reason.to_string().yellow()
                }
                _ => reason.to_string().dimmed(),
            };
            println!("{} {}: {}", "-".dimmed(), relative(artifact, root), reason);
        }
        SyncOutcome::Deleted { write } => print_write(write, root, "Deleted story"),
        SyncOutcome::NothingToDelete { artifact } => {
            println!(
                "{} No story to delete: {}",
                "-".dimmed(),
                relative(artifact, root)
            );
        }
        SyncOutcome::Ignored => {}
    }
}

fn print_write(write: &WriteResult, root: &Path, action: &str) {
    match write {
        WriteResult::Written { path, bytes } => {
            println!(
                "{} {}: {} ({} bytes)",
                "✓".green(),
                action,
                relative(path, root),
                bytes
            );
        }
        WriteResult::Deleted { path } => {
            println!("{} {}: {}", "✓".green(), action, relative(path, root));
        }
        WriteResult::DryRun { content, path } => {
            println!(
                "{} {}: {}",
                "[dry-run]".yellow(),
                action,
                relative(path, root)
            );
            if let Some(content) = content {
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }
}

/// Display a path relative to the project root when possible.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
