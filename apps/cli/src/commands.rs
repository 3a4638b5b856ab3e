//! CLI command definitions, routing, and tracing setup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use scout_core::{ProgressReporter, RunOutcome, RunRequest, Scout};
use scout_report::RenderOptions;
use scout_shared::{AppConfig, SearchMode, Settings, TimeRange, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Scout: DCGA market-intelligence reports.
#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Gather DCGA market news, synthesize a strategy report, and render it to PDF.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
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
    /// Start the HTTP API.
    Serve {
        /// Bind address (defaults to `[server].host`).
        #[arg(long)]
        host: Option<String>,

        /// Port (defaults to `[server].port`).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Gather, synthesize, and render one report.
    Run {
        /// Reporting window: 24h, 7d, 14d, or 30d.
        #[arg(short, long, default_value = "7d")]
        time_range: String,

        /// Search provider (defaults to `[search].default_provider`).
        #[arg(short, long, default_value = "")]
        provider: String,

        /// Use canned search results instead of calling a provider.
        #[arg(long)]
        mock: bool,

        /// Search depth: fast or deep.
        #[arg(short, long, default_value = "deep")]
        mode: String,

        /// PDF destination (defaults to `[output].report_pdf`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render an existing Markdown report to PDF.
    Render {
        /// Markdown file to render.
        file: PathBuf,

        /// PDF destination (defaults to `[output].report_pdf`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Sections to keep (comma-separated). Defaults to all.
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,

        /// Cover timestamp (defaults to now).
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
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
        0 => "scout=info,tower_http=info",
        1 => "scout=debug,tower_http=debug",
        _ => "scout=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { host, port } => cmd_serve(host, port).await,
        Command::Run {
            time_range,
            provider,
            mock,
            mode,
            out,
        } => cmd_run(&time_range, provider, mock, &mode, out).await,
        Command::Render {
            file,
            out,
            sections,
            timestamp,
        } => cmd_render(&file, out, &sections, timestamp).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

fn scout() -> Result<Scout> {
    let settings = Settings::resolve(load_config()?);
    Ok(Scout::from_settings(settings)?)
}

async fn cmd_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let scout = scout()?;
    let server = &scout.settings().config.server;
    let host = host.unwrap_or_else(|| server.host.clone());
    let port = port.unwrap_or(server.port);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| eyre!("invalid bind address '{host}:{port}': {e}"))?;

    println!("Scout API on http://{addr}");
    scout_api::serve(scout, addr).await?;
    Ok(())
}

async fn cmd_run(
    time_range: &str,
    provider: String,
    mock: bool,
    mode: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let scout = scout()?;
    let request = RunRequest {
        time_range: TimeRange::parse_lossy(time_range),
        provider,
        mock,
        mode: SearchMode::parse_lossy(mode),
        output: out,
    };

    info!(
        time_range = %request.time_range,
        provider = %request.provider,
        mock,
        "generating report"
    );

    let reporter = CliProgress::new();
    let outcome = scout.run(&request, &reporter).await;

    println!("{}", outcome.report);
    println!();
    println!("  Run:      {}", outcome.run_id);
    match &outcome.pdf_path {
        Some(path) => println!("  PDF:      {}", path.display()),
        None => println!("  PDF:      not rendered (see log)"),
    }
    println!("  Failures: {}", outcome.failures.len());
    for failure in &outcome.failures {
        println!("    - {} [{}]: {}", failure.label, failure.provider, failure.error);
    }
    println!("  Time:     {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_render(
    file: &Path,
    out: Option<PathBuf>,
    sections: &[String],
    timestamp: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let document = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;

    let opts = RenderOptions::from_config(&config.report)
        .sections(scout_report::resolve_names(sections))
        .timestamp(timestamp);
    let out = out.unwrap_or(config.output.report_pdf);

    let path = scout_report::render_report(&document, &out, &opts)?;
    println!("Report rendered to: {}", path.display());
    Ok(())
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn query_done(&self, label: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Searching [{current}/{total}] {label}"));
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
