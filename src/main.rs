use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use demoqa_e2e::browser::ChromeSessionFactory;
use demoqa_e2e::suite::{self, Runner, Scenario, ScenarioFilter};
use demoqa_e2e::{ChromeDriver, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_REPORT: &str = "e2e-report.json";

#[derive(Parser)]
#[command(name = "demoqa-e2e")]
#[command(about = "End-to-end scenarios for demoqa.com")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the scenarios a filter selects
    List(FilterArgs),
    /// Run the selected scenarios against a real browser
    Run(RunArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// Tier or section to select (repeatable, all must match)
    #[arg(short, long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Regex over scenario names
    #[arg(short, long)]
    grep: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// JSON config file; defaults apply when omitted
    #[arg(short, long, env = "DEMOQA_CONFIG")]
    config: Option<PathBuf>,

    /// Scenarios run in parallel (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Extra attempts per failing scenario (overrides config)
    #[arg(short, long)]
    retries: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Where to write the JSON report
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let registry = suite::default_registry::<ChromeDriver>();

    match cli.command {
        Command::List(args) => {
            let filter = ScenarioFilter::new(&args.tags, args.grep.as_deref())?;
            for scenario in registry.select(&filter) {
                println!(
                    "[{}] {} > {}",
                    scenario.tier(),
                    scenario.section(),
                    scenario.name()
                );
            }
            Ok(())
        }
        Command::Run(args) => {
            let filter = ScenarioFilter::new(&args.filter.tags, args.filter.grep.as_deref())?;

            let mut config = Config::load(args.config.as_deref())
                .context("failed to load configuration")?;
            if let Some(workers) = args.workers {
                config.runner.workers = workers.max(1);
            }
            if let Some(retries) = args.retries {
                config.runner.retries = retries;
            }
            if args.headed {
                config.browser.headless = false;
            }
            let report_path = args
                .report
                .or_else(|| config.runner.report_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT));

            let selected = registry.select(&filter);
            if selected.is_empty() {
                warn!("no scenario matches the given filter");
                return Ok(());
            }
            info!(
                scenarios = selected.len(),
                workers = config.runner.workers,
                retries = config.runner.retries,
                base_url = %config.base_url,
                "starting run"
            );

            let runner = Runner::new(Arc::new(ChromeSessionFactory), config);
            let report = runner.run(selected).await;

            println!();
            for line in report.lines() {
                println!("{}", line);
            }
            println!();
            println!(
                "{} passed, {} flaky, {} failed in {}ms",
                report.passed, report.flaky, report.failed, report.duration_ms
            );

            report
                .write_json(&report_path)
                .with_context(|| format!("failed to write {}", report_path.display()))?;
            info!(path = %report_path.display(), "report written");

            if !report.success() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
