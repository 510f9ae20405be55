//! `cem-resolver`: resolve and probe the CEM API backend from the command line.
//!
//! ```text
//! config file + env vars + flags
//!     → ResolverConfig
//!     → candidates | probe <origin> | resolve [--watch] | get <path>
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use cem_resolver::config::watcher::ConfigWatcher;
use cem_resolver::config::{load_with_env, Platform, ResolverConfig};
use cem_resolver::observability::logging::init_logging;
use cem_resolver::{ApiBaseResolver, ApiClient, Origin};

#[derive(Parser)]
#[command(name = "cem-resolver")]
#[command(about = "Resolve and probe the CEM API backend", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the detected platform (native or browser)
    #[arg(long)]
    platform: Option<Platform>,

    /// Override the page hostname
    #[arg(long)]
    hostname: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate origins in priority order
    Candidates,
    /// Probe every health path of one origin
    Probe { origin: String },
    /// Resolve the reachable API origin
    Resolve {
        /// Re-resolve whenever the config file changes
        #[arg(long)]
        watch: bool,
    },
    /// GET a JSON endpoint under the resolved API base
    Get {
        path: String,
        /// Bearer token
        #[arg(long)]
        token: Option<String>,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut ResolverConfig) {
        if let Some(platform) = self.platform {
            config.environment.platform = platform;
        }
        if let Some(hostname) = &self.hostname {
            config.environment.hostname = Some(hostname.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let base = load_with_env(cli.config.as_deref())?;
    let mut config = base.clone();
    cli.apply_overrides(&mut config);
    init_logging(&config.observability);

    tracing::info!(
        platform = %config.environment.platform,
        hostname = ?config.environment.hostname,
        timeout_ms = config.probe.timeout_ms,
        "Configuration loaded"
    );

    let resolver = ApiBaseResolver::new(config)?;

    match &cli.command {
        Commands::Candidates => {
            let candidates = resolver.candidates();
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        }
        Commands::Probe { origin } => {
            let origin = Origin::parse(origin)?;
            let report = resolver.prober().probe_origin(&origin).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.reachable() {
                std::process::exit(1);
            }
        }
        Commands::Resolve { watch: false } => {
            let origin = resolver.resolve().await?;
            println!("{}", origin);
        }
        Commands::Resolve { watch: true } => {
            run_watch(&cli, &resolver, base).await?;
        }
        Commands::Get { path, token } => {
            let mut client = ApiClient::new(resolver.clone())?;
            client.set_token(token.clone());
            let value: Value = client.get_json(path).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

async fn run_watch(
    cli: &Cli,
    resolver: &ApiBaseResolver,
    base: ResolverConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = cli
        .config
        .as_deref()
        .ok_or("--watch requires --config")?;

    let (watcher, mut updates) = ConfigWatcher::new(path, base);
    let _watch = watcher.run()?;

    report(resolver).await;
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(mut config) = update else { break };
                cli.apply_overrides(&mut config);
                resolver.reload(config);
                report(resolver).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, exiting");
                break;
            }
        }
    }
    Ok(())
}

async fn report(resolver: &ApiBaseResolver) {
    match resolver.resolve().await {
        Ok(origin) => println!("{}", origin),
        Err(e) => eprintln!("{}", e),
    }
}
