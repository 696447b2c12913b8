//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use seeder_core::{ItemStatus, ProgressReporter, SeedResult, run_seed};
use seeder_remote::{CourseApi, HttpCourseApi};
use seeder_shared::{AppConfig, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Curriculum seeder: sync a tree of course folders with the content service.
#[derive(Parser)]
#[command(
    name = "seeder",
    version,
    about = "Parse a curriculum tree and seed its courses and exercises into the content service.",
    long_about = None
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to load instead of ~/.curriculum-seeder/seeder.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Arguments for `seed` when no subcommand is given.
    #[command(flatten)]
    pub seed: SeedArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse the curriculum and sync it with the content service (default).
    Seed(SeedArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct SeedArgs {
    /// Curriculum root directory (overrides `curriculum.root`).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Content service base URL (overrides `remote.base_url`).
    #[arg(long, env = "SEEDER_API_URL")]
    pub api_url: Option<String>,

    /// Parse only: make no remote calls and print the course graph as JSON.
    #[arg(long)]
    pub dry_run: bool,
}

impl SeedArgs {
    /// Values given after `seed` win; unset ones fall back to the top-level flags.
    fn or(self, fallback: &SeedArgs) -> SeedArgs {
        SeedArgs {
            root: self.root.or_else(|| fallback.root.clone()),
            api_url: self.api_url.or_else(|| fallback.api_url.clone()),
            dry_run: self.dry_run || fallback.dry_run,
        }
    }

    /// Apply flag values on top of the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(root) = &self.root {
            config.curriculum.root = root.to_string_lossy().into_owned();
        }
        if let Some(api_url) = &self.api_url {
            config.remote.base_url = api_url.clone();
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "seeder=info",
        1 => "seeder=debug",
        _ => "seeder=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        None => cmd_seed(config_path, &cli.seed).await,
        Some(Command::Seed(args)) => cmd_seed(config_path, &args.or(&cli.seed)).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_seed(config_path: Option<PathBuf>, args: &SeedArgs) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    args.apply(&mut config);
    config.validate()?;

    let api: Option<Arc<dyn CourseApi>> = if args.dry_run {
        None
    } else {
        Some(Arc::new(HttpCourseApi::new(&config.remote)?))
    };

    info!(
        root = %config.curriculum.root,
        api = %config.remote.base_url,
        dry_run = args.dry_run,
        "starting seed"
    );

    let progress = CliProgress::new()?;
    let result = run_seed(&config, api, &progress).await?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&result.curriculum)?);
    } else {
        print_summary(&result);
    }

    if result.succeeded() {
        Ok(())
    } else {
        Err(eyre!("seed finished with failures"))
    }
}

fn print_summary(result: &SeedResult) {
    let curriculum = &result.curriculum;

    println!();
    println!("  Curriculum seeded.");
    println!("  Courses:   {}", curriculum.courses.len());
    println!("  Skipped:   {} folder(s)", curriculum.skipped.len());
    println!("  Dropped:   {} exercise file(s)", curriculum.dropped.len());

    if let Some(report) = &result.report {
        println!("  Created:   {} course(s)", report.created());
        println!("  Upserted:  {} payload(s)", report.upserted());
        println!("  Unsent:    {}", report.skipped());
        println!("  Failed:    {}", report.failed());
    }
    println!("  Elapsed:   {:.1}s", result.elapsed.as_secs_f64());

    for issue in &curriculum.failed {
        println!("  ✗ {}: {}", issue.folder, issue.reason);
    }
    if let Some(report) = &result.report {
        for outcome in report.failures() {
            if let ItemStatus::Failed(reason) = &outcome.status {
                println!("  ✗ {}: {reason}", outcome.key);
            }
        }
    }
    println!();
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter (indicatif spinner)
// ---------------------------------------------------------------------------

struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn course_loaded(&self, name: &str, exercises: usize) {
        self.spinner
            .set_message(format!("Parsed {name} ({exercises} exercises)"));
    }

    fn done(&self, _result: &SeedResult) {
        self.spinner.finish_and_clear();
    }
}
