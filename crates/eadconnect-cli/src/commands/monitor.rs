// SPDX-License-Identifier: Apache-2.0

//! Long-running grade monitor.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::style;
use eadconnect_core::{
    AppConfig, GradeMonitor, LogNotifier, MonitorSettings, Notifier, NotifyError, SnapshotCache,
    TelegramNotifier,
};
use tracing::{info, warn};

use crate::session;

/// Telegram when configured, otherwise log-only delivery.
fn notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    let timeout = Duration::from_secs(config.http.timeout_seconds);
    match TelegramNotifier::from_config(&config.monitor.telegram, timeout) {
        Ok(telegram) => {
            info!("📨 Notifying via Telegram");
            Arc::new(telegram)
        }
        Err(NotifyError::NotConfigured(key)) => {
            warn!("{key} not set, notifications will only be logged");
            Arc::new(LogNotifier::default())
        }
        Err(e) => {
            warn!(error = %e, "Telegram unavailable, notifications will only be logged");
            Arc::new(LogNotifier::default())
        }
    }
}

/// Runs until Ctrl+C.
pub async fn run(config: &AppConfig, interval_minutes: Option<u64>) -> Result<()> {
    let mut settings = MonitorSettings::from_config(config);
    if let Some(minutes) = interval_minutes {
        settings.interval = MonitorSettings::interval_for(minutes);
    }

    let client = session::academic_client(config).await?;
    let cache = SnapshotCache::new(config.monitor.cache_path());

    println!(
        "{} Watching grades every {} min (Ctrl+C to stop)",
        style("*").cyan().bold(),
        settings.interval.as_secs() / 60
    );

    let monitor = Arc::new(GradeMonitor::new(client, notifier(config), cache, settings));
    monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
