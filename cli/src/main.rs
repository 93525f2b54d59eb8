//! Timeless Hotel CLI server
//!
//! Headless hotel management backend suitable for deployment as a systemd
//! service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/timeless-hotel/config.toml)
//! timeless-service
//!
//! # Custom config path
//! timeless-service --config /etc/timeless-hotel/config.toml
//!
//! # Validate config without starting
//! timeless-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use timeless_hotel::config::AppConfig;
use timeless_hotel::server::{init_tracing, ServerHandle, ServerOptions};

/// Timeless Hotel: booking, room and staff management service.
#[derive(Parser, Debug)]
#[command(
    name = "timeless-service",
    version,
    about = "Hotel management REST API",
    long_about = "Timeless Hotel REST API server for rooms, customers, staff \
                  and bookings with double-booking protection.\n\n\
                  Default config: ~/.config/timeless-hotel/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TIMELESS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default administrator.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(timeless_hotel::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        return match loaded {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!("   Config file : {}", config_path.display());
                println!("{}", config);
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ Invalid configuration in {}: {}", config_path.display(), e);
                std::process::exit(1);
            }
        };
    }

    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // No-op when the fallback above already initialized tracing.
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
