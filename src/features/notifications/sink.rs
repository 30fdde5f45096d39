//! Delivery seam for notifications
//!
//! Push, calendar and mail integrations plug in here. The tracker ships a
//! logging sink; remote services live outside this crate.

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use super::alerts::{ExpiryAlert, FamilySummary, RenewalReminder};

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn send_expiry_alert(&self, alert: &ExpiryAlert) -> Result<()>;

    async fn send_renewal_reminder(&self, reminder: &RenewalReminder) -> Result<()>;

    async fn send_family_summary(&self, summary: &FamilySummary) -> Result<()>;
}

/// Writes every notification to the application log
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_expiry_alert(&self, alert: &ExpiryAlert) -> Result<()> {
        info!(
            "[priority {}] {} - {}",
            alert.priority, alert.title, alert.message
        );
        Ok(())
    }

    async fn send_renewal_reminder(&self, reminder: &RenewalReminder) -> Result<()> {
        info!("{} - {}", reminder.title, reminder.message);
        Ok(())
    }

    async fn send_family_summary(&self, summary: &FamilySummary) -> Result<()> {
        info!(
            "[priority {}] {} - {}",
            summary.priority,
            summary.title,
            summary.message.replace('\n', " | ")
        );
        Ok(())
    }
}
