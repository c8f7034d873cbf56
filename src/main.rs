use anyhow::Context;
use bookbank_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookbank settings")?;
    bookbank_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookbank-app bootstrap starting"
    );

    bookbank_app::run(settings).await
}
