//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use npbstats_core::pipeline::{self, ProgressReporter, RunSummary, SilentProgress};
use npbstats_shared::{AppConfig, RunConfig, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// npbstats: NPB team statistics scraper.
#[derive(Parser)]
#[command(
    name = "npbstats",
    version,
    about = "Scrape NPB team batting and pitching tables into per-team, per-league and combined CSV files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.npbstats/npbstats.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output root directory (overrides `output.root`).
    #[arg(short, long, global = true)]
    pub out: Option<PathBuf>,

    /// Season to scrape (overrides `source.year`).
    #[arg(short, long, global = true)]
    pub year: Option<u32>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `run`.
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
    /// Scrape every team of every configured league, then aggregate.
    Run,

    /// Resolve leagues and list the season's teams without scraping them.
    Discover,

    /// Rebuild league and combined files from per-team files on disk.
    Aggregate,

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "npbstats=info",
        1 => "npbstats=debug",
        _ => "npbstats=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

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
    match &cli.command {
        None | Some(Command::Run) => cmd_run(&cli).await,
        Some(Command::Discover) => cmd_discover(&cli).await,
        Some(Command::Aggregate) => cmd_aggregate(&cli),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(out) = &cli.out {
        config.output.root = out.to_string_lossy().into_owned();
    }
    if let Some(year) = cli.year {
        config.source.year = year;
    }

    Ok(config)
}

fn run_config(cli: &Cli) -> Result<RunConfig> {
    let config = resolve_config(cli)?;
    Ok(RunConfig::try_from(&config)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(cli: &Cli) -> Result<()> {
    let config = run_config(cli)?;

    info!(
        year = config.year,
        leagues = ?config.league_slugs(),
        out = %config.output_root.display(),
        "scraping season"
    );

    let reporter = CliProgress::new();
    let summary = pipeline::run(&config, &reporter).await?;

    print_summary("Scrape", &summary);
    fail_on_partial(&summary)
}

async fn cmd_discover(cli: &Cli) -> Result<()> {
    let config = run_config(cli)?;
    let directories = pipeline::discover(&config).await?;

    println!();
    for entry in &directories {
        println!(
            "  {} ({}): {} teams in {}",
            entry.league.league.name,
            entry.league.league.slug,
            entry.teams.len(),
            config.year
        );
        for team in entry.teams.iter() {
            println!("    {:<28} {}", team.name, team.url);
        }
        println!();
    }

    Ok(())
}

fn cmd_aggregate(cli: &Cli) -> Result<()> {
    let config = run_config(cli)?;
    let summary = pipeline::rebuild_aggregates(&config, &SilentProgress);

    print_summary("Aggregate", &summary);
    fail_on_partial(&summary)
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_summary(title: &str, summary: &RunSummary) {
    println!();
    println!(
        "  {title} started {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if summary.teams_attempted > 0 {
        println!("  Teams:      {}", summary.teams_attempted);
        println!("  Tables:     {}", summary.tables_written);
        println!("  Rows:       {}", summary.rows_written);
    }
    for agg in &summary.aggregates {
        println!(
            "  Aggregate:  {} ({} rows from {} files)",
            agg.path.display(),
            agg.rows,
            agg.inputs.len()
        );
    }
    println!("  Time:       {:.1}s", summary.elapsed.as_secs_f64());

    if !summary.failures.is_empty() {
        println!();
        println!("  Failures:");
        for failure in &summary.failures {
            println!("    {failure}");
        }
    }
    println!();
}

/// Files already written are kept; the exit status still reports the gap.
fn fail_on_partial(summary: &RunSummary) -> Result<()> {
    if summary.is_complete() {
        Ok(())
    } else {
        Err(eyre!(
            "{} unit(s) failed; see the failure list above",
            summary.failures.len()
        ))
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn team_started(&self, league: &str, team: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Scraping {league} [{current}/{total}] {team}"));
    }

    fn table_written(&self, path: &Path, rows: usize) {
        self.spinner
            .println(format!("  wrote {} ({rows} rows)", path.display()));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
