//! link-dispatch
//!
//! Picks the browser a clicked URL should open in.
//!
//! # Architecture Overview
//!
//! ```text
//!   URL ──▶ routing::parse ──▶ routing::router ──▶ Target ──▶ stdout
//!                                   │
//!                                   ├── matcher (domains / hostnames / contains)
//!                                   └── observability (logs, counters)
//!
//!   config file ──▶ config::loader ──▶ validation ──▶ Router
//!        └── config::watcher (watch) ──▶ SharedRouter swap
//! ```

use std::error::Error;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use link_dispatch::config::{load_config, ConfigWatcher, DispatchConfig};
use link_dispatch::observability::logging::{self, LogHandle};
use link_dispatch::observability::metrics;
use link_dispatch::routing::{ParsedUrl, Router, SharedRouter};

#[derive(Parser)]
#[command(name = "link-dispatch", version)]
#[command(about = "Route URLs to browsers by ordered match rules", long_about = None)]
struct Cli {
    /// Path to the TOML configuration.
    #[arg(short, long, global = true, default_value = "link-dispatch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the target for each URL
    Route {
        /// Print JSON including the rule that decided
        #[arg(long)]
        explain: bool,

        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Validate the configuration and list its rules
    Check,
    /// Route URLs read from stdin, reloading the config when it changes
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let logging = logging::init_logging();

    match run(cli, &logging).await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, logging: &LogHandle) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(&cli.config)?;
    logging.apply(&config.observability);

    let router = Router::from_config(&config)?;

    match cli.command {
        Commands::Route { explain, urls } => {
            let all_routed = route_urls(
                &router,
                &urls,
                explain,
                &mut io::stdout().lock(),
                &mut io::stderr().lock(),
            )?;
            Ok(if all_routed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Check => {
            write_summary(&router, &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Watch => watch(&cli.config, &config, router).await,
    }
}

/// Write one line per URL to `out`. Invalid URLs are reported on `err`;
/// returns false if there were any.
fn route_urls(
    router: &Router,
    urls: &[String],
    explain: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<bool, Box<dyn Error>> {
    let mut all_routed = true;

    for raw in urls {
        let url = match ParsedUrl::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                writeln!(err, "error: {e}")?;
                all_routed = false;
                continue;
            }
        };

        if explain {
            let decision = router.decide(&url);
            let report = serde_json::json!({
                "url": raw,
                "host": url.host(),
                "target": decision.target,
                "rule": decision.rule,
            });
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            writeln!(out, "{}", router.route(&url))?;
        }
    }

    Ok(all_routed)
}

fn write_summary(router: &Router, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "default: {}", router.default_target())?;
    for (index, rule) in router.rules().iter().enumerate() {
        writeln!(
            out,
            "{index:>3}  {:<10} {:<20} -> {}",
            rule.matcher().kind(),
            rule.name().unwrap_or("-"),
            rule.target()
        )?;
    }
    Ok(())
}

async fn watch(
    path: &Path,
    config: &DispatchConfig,
    router: Router,
) -> Result<ExitCode, Box<dyn Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shared = Arc::new(SharedRouter::new(router));
    let (watcher, updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;
    let follower = tokio::spawn(shared.clone().follow(updates));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let raw = line.trim();
                if raw.is_empty() {
                    continue;
                }
                match shared.route_str(raw) {
                    Ok(target) => println!("{target}"),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping invalid URL");
                        eprintln!("error: {e}");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    follower.abort();
    Ok(ExitCode::SUCCESS)
}
