use anyhow::Result;
use chrono::Local;
use dotenvy::dotenv;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use passport_tracker::core::{Config, DocumentCipher};
use passport_tracker::database::Database;
use passport_tracker::features::{
    get_app_version, get_features, load_demo_data, AppSettings, IntegrationStatus, LogSink,
    NotificationScheduler,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting passport tracker v{}...", get_app_version());
    for feature in get_features() {
        info!("  {} v{}", feature.name, feature.version);
    }

    let cipher = DocumentCipher::from_hex_key(&config.encryption_key)?;
    let database = Database::new(&config.database_path, cipher).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--load-demo") {
        let loaded = load_demo_data(&database).await?;
        println!(
            "Loaded demo family: {} people, {} documents",
            loaded.people, loaded.documents
        );
        return Ok(());
    }

    let settings = AppSettings::load(&database).await?;
    let integrations = IntegrationStatus::from_settings(&settings, &config);
    info!(
        "Integrations: pushover={} caldav={} smtp={} tunnel={}",
        integrations.pushover, integrations.caldav, integrations.smtp, integrations.tunnel
    );
    if settings.notification_schedule.is_empty() {
        warn!("Notification schedule is empty; expiry alerts are disabled");
    } else {
        info!("Notification schedule: {} days", settings.notification_schedule);
    }

    let scheduler = NotificationScheduler::new(
        database.clone(),
        Duration::from_secs(config.check_interval_secs),
    )
    .with_sink(Arc::new(LogSink))
    .with_app_url(config.app_url());

    if args.iter().any(|a| a == "--check-now") {
        let report = scheduler.check_now(Local::now().date_naive()).await?;
        println!(
            "Checked {} documents: {} notifications sent, {} urgent, {} need attention",
            report.documents_checked,
            report.notifications_sent,
            report.urgent_count,
            report.warning_count
        );
        return Ok(());
    }

    let scheduler = Arc::new(scheduler);
    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run().await }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
        result = handle => {
            if let Err(e) = result {
                warn!("Scheduler task ended unexpectedly: {}", e);
            }
        }
    }

    Ok(())
}
