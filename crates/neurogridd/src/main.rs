//! neurogridd — the NeuroGrid daemon.
//!
//! Single binary that assembles the NeuroGrid subsystems:
//! - Telemetry simulator + autoscaler (control loop)
//! - Narrator (remote text generation, offline fallback)
//! - REST API + Prometheus exposition
//!
//! # Usage
//!
//! ```text
//! neurogridd run --config neurogridd.toml --port 8080
//! neurogridd init-config --output neurogridd.toml
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use neurogrid_control::Engine;
use neurogrid_metrics::SeededNoise;
use neurogrid_narrator::{HttpGenerator, Narrator};

use crate::config::DaemonConfig;

const DEFAULT_LOG_FILTER: &str = "info,neurogridd=debug,neurogrid=debug";

#[derive(Parser)]
#[command(name = "neurogridd", about = "NeuroGrid daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control loop and serve the dashboard API.
    Run(RunArgs),

    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file. Printed to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Configuration file (defaults to ./neurogridd.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on. Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,

    /// RNG seed for reproducible telemetry. Overrides `engine.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut DaemonConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(seed) = self.seed {
            config.engine.seed = Some(seed);
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            init_tracing(args.log_json);
            let mut config = DaemonConfig::load(args.config.as_deref())?;
            args.apply(&mut config);
            run(config).await
        }
        Command::InitConfig { output, force } => init_config(output, force),
    }
}

fn init_config(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let text = DaemonConfig::default().to_toml_string()?;
    match output {
        Some(path) => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn build_narrator(config: &DaemonConfig) -> anyhow::Result<Narrator> {
    let settings = config.narrator_settings();
    match &config.narrator.endpoint {
        Some(endpoint) => {
            let generator = HttpGenerator::new(endpoint)
                .with_context(|| format!("narrator endpoint {endpoint}"))?;
            info!(address = generator.address(), model = %settings.model, "narrator online");
            Ok(Narrator::new(Arc::new(generator), settings))
        }
        None => {
            info!("no narrator endpoint configured, running offline");
            Ok(Narrator::offline())
        }
    }
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    info!("NeuroGrid daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let narrator = Arc::new(build_narrator(&config)?);

    let noise = match config.engine.seed {
        Some(seed) => {
            info!(seed, "telemetry seeded");
            SeededNoise::from_seed(seed)
        }
        None => SeededNoise::from_entropy(),
    };

    let (engine, handle) = Engine::new(config.engine_settings(), noise, narrator.clone());
    info!(
        autoscale = config.engine.autoscale_enabled,
        probability = config.narrator.probability,
        "control loop initialized"
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    let engine_handle = tokio::spawn(engine.run(shutdown_rx));

    // ── Start API server ───────────────────────────────────────

    let router = neurogrid_api::build_router(handle, narrator);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for the control loop to drain.
    if let Err(e) = engine_handle.await {
        warn!(error = %e, "control loop task failed");
    }

    info!("NeuroGrid daemon stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "neurogridd",
            "run",
            "--port",
            "9000",
            "--seed",
            "42",
            "--log-json",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.seed, Some(42));
                assert!(args.log_json);
                assert!(args.config.is_none());
            }
            Command::InitConfig { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = DaemonConfig::default();
        config.engine.seed = Some(1);

        let args = RunArgs {
            port: Some(9100),
            seed: Some(5),
            ..RunArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.engine.seed, Some(5));

        RunArgs::default().apply(&mut config);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.engine.seed, Some(5));
    }

    #[test]
    fn narrator_requires_valid_endpoint() {
        let mut config = DaemonConfig::default();
        assert!(build_narrator(&config).is_ok());

        config.narrator.endpoint = Some("https://example.invalid/generate".to_string());
        assert!(build_narrator(&config).is_err());

        config.narrator.endpoint = Some("http://127.0.0.1:11434/api/generate".to_string());
        let narrator = build_narrator(&config).unwrap();
        assert_eq!(narrator.settings().model, config.narrator.model);
    }

    #[test]
    fn init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neurogridd.toml");

        init_config(Some(path.clone()), false).unwrap();
        let written = DaemonConfig::from_file(&path).unwrap();
        assert_eq!(written, DaemonConfig::default());

        assert!(init_config(Some(path.clone()), false).is_err());
        assert!(init_config(Some(path), true).is_ok());
    }
}
