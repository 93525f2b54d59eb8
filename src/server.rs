//! Reusable hotel service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database init, migrations,
//! admin bootstrap, the receipt worker, the REST API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{
    BookingService, CommandPrinter, EmployeeService, OutboxMailer, ReceiptMailer, ReceiptPrinter,
    ReceiptWorker, RoomLocks, SummaryService,
};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::init_database;
use crate::interfaces::http::modules::metrics::describe_metrics;
use crate::interfaces::{create_api_router, ApiContext};
use crate::notifications::{create_event_bus, SharedEventBus};
use crate::shared::{SharedClock, ShutdownCoordinator, ShutdownSignal, SystemClock};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Seed the default administrator when no staff exist (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running hotel service.
///
/// ```rust,no_run
/// use timeless_hotel::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub bookings: Arc<BookingService>,
    pub config: AppConfig,
    /// Address the REST API is bound to
    pub api_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    receipt_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service.
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Seed the default administrator (if enabled)
    /// 4. Start the receipt worker
    /// 5. Start the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;
        let started_at = Arc::new(Instant::now());

        info!("Starting Timeless Hotel service...");

        let metrics_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&app_cfg.database_config()).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Repositories & Services ────────────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let clock: SharedClock = Arc::new(SystemClock);

        let event_bus = create_event_bus();
        info!("🔔 Event bus initialized for booking notifications");

        let jwt_config = app_cfg.jwt_config();
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        let bookings = Arc::new(BookingService::new(
            repos.clone(),
            event_bus.clone(),
            clock.clone(),
            Arc::new(RoomLocks::new()),
        ));
        let employees = Arc::new(EmployeeService::new(repos.clone(), jwt_config.clone()));
        let summary = Arc::new(SummaryService::new(repos.clone(), clock.clone()));

        if opts.create_default_admin {
            match employees.ensure_default_admin(app_cfg.admin_seed()).await {
                Ok(Some(admin)) => info!("Default administrator created: {}", admin.email),
                Ok(None) => {}
                Err(e) => error!("Failed to create default administrator: {}", e),
            }
        }

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        let notifications = &app_cfg.notifications;
        let mailer: Arc<dyn ReceiptMailer> = Arc::new(OutboxMailer::new(
            notifications.outbox_dir.clone(),
            notifications.hotel_name.clone(),
        ));
        let printer: Option<Arc<dyn ReceiptPrinter>> = if notifications.printer.enabled {
            Some(Arc::new(CommandPrinter::new(
                notifications.printer.program.clone(),
                notifications.printer.script.clone(),
                notifications.printer.printer_name.clone(),
            )))
        } else {
            None
        };
        let receipt_task = ReceiptWorker::new(repos.clone(), mailer, printer, clock)
            .start(event_bus.clone(), shutdown_signal.clone());

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiContext {
            db: db.clone(),
            repos: repos.clone(),
            bookings: bookings.clone(),
            employees,
            summary,
            event_bus: event_bus.clone(),
            jwt_config,
            metrics_handle,
            started_at,
        });

        let listener = tokio::net::TcpListener::bind(app_cfg.api_address()).await?;
        let api_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Timeless Hotel service started.");

        Ok(Self {
            event_bus,
            repos,
            bookings,
            config: app_cfg,
            api_addr,
            db,
            shutdown,
            api_task,
            receipt_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for shutdown to be triggered, then for the API and worker to stop
    /// within the configured grace period.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            receipt_task,
            ..
        } = self;

        info!("⏳ Waiting for server tasks to complete...");

        let api_abort = api_task.abort_handle();
        let receipt_abort = receipt_task.abort_handle();

        let finished = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                match receipt_task.await {
                    Ok(()) => info!("Receipt worker stopped"),
                    Err(e) => error!("Receipt worker task panicked: {}", e),
                }
            })
            .await;

        if !finished {
            api_abort.abort();
            receipt_abort.abort();
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Timeless Hotel shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down Timeless Hotel service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can be installed once per process; later starts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_metrics();
            info!("📊 Prometheus metrics recorder installed");
            Some(PROM_HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    }
}

/// Initialize tracing from the logging section.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 1;
        config.server.shutdown_timeout = 5;
        config.database.url = "sqlite::memory:".into();
        config.database.max_connections = 1;
        config
    }

    #[tokio::test]
    async fn starts_serves_health_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = memory_config();
        config.notifications.outbox_dir = Some(dir.path().to_path_buf());

        // Bind to an ephemeral port to avoid clashes between test runs.
        let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        config.server.api_port = free.local_addr().unwrap().port();
        drop(free);

        let handle = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
            create_default_admin: true,
        })
        .await
        .unwrap();
        assert!(handle.is_running());
        assert_eq!(handle.repos.employees().count().await.unwrap(), 1);

        let mut stream = tokio::net::TcpStream::connect(handle.api_addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");

        tokio::time::timeout(std::time::Duration::from_secs(10), handle.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_start() {
        let mut config = memory_config();
        config.security.jwt_secret = String::new();

        let result = ServerHandle::start(ServerOptions {
            config,
            ..Default::default()
        })
        .await;
        assert!(result.is_err());
    }
}
