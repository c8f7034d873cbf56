//! Bookbank application library
//!
//! Wires the record store, the clock, and the domain modules together and
//! runs them behind the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookbank_kernel::{settings::Settings, Clock, InitCtx, ModuleRegistry, SystemClock};

pub mod modules;

/// Re-export commonly used types
pub use modules::*;

use modules::books::{AvailabilityTracker, Book};

/// Everything a front end needs to serve the catalog
pub struct App {
    pub registry: ModuleRegistry,
    pub tracker: Arc<AvailabilityTracker>,
}

/// Open the configured store and register every module.
pub async fn build(settings: &Settings, clock: Arc<dyn Clock>) -> anyhow::Result<App> {
    let store = bookbank_db::open::<Book>(&settings.database)
        .await
        .with_context(|| "failed to open the book store")?;
    let tracker = Arc::new(AvailabilityTracker::new(store, clock));

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::clone(&tracker));

    Ok(App { registry, tracker })
}

/// Run the service until Ctrl-C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let app = build(&settings, Arc::new(SystemClock)).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    app.registry.init_all(&ctx).await?;
    app.registry.start_all(&ctx).await?;

    let served = bookbank_http::start_server(&app.registry, &settings, shutdown_signal()).await;
    let stopped = app.registry.stop_all().await;

    served?;
    stopped
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
