//! Periodic expiry check
//!
//! Each pass loads settings fresh, classifies every document and hands due
//! alerts to the configured sinks. The offset is only recorded once a sink
//! actually delivered, so a failed delivery is retried on the next pass.

use anyhow::Result;
use chrono::{Local, NaiveDate, Timelike, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::alerts::{ExpiryAlert, FamilySummary, RenewalReminder};
use super::schedule::NotificationRecord;
use super::sink::NotificationSink;
use crate::core::WorkflowStatus;
use crate::database::{Database, TrackedDocument};
use crate::features::expiry::UrgencyTier;
use crate::features::settings::{load_key, AppSettings};

/// Local hour from which the daily summary may go out
pub const DAILY_SUMMARY_HOUR: u32 = 8;

/// Manual checks resend alerts for documents this close to expiry
pub const MANUAL_ALERT_DAYS: i64 = 30;

/// Settings key holding the date of the last daily summary
pub const LAST_SUMMARY_KEY: &str = "last_daily_summary";

/// Outcome of one check pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub documents_checked: usize,
    pub notifications_sent: usize,
    pub reminders_sent: usize,
    pub urgent_count: usize,
    pub warning_count: usize,
    pub summary_sent: bool,
}

impl CheckReport {
    fn count_tier(&mut self, tracked: &TrackedDocument) {
        match tracked.status.tier() {
            Some(UrgencyTier::Critical) => self.urgent_count += 1,
            Some(UrgencyTier::ActNow) | Some(UrgencyTier::PlanRenewal) => self.warning_count += 1,
            _ => {}
        }
    }
}

/// Scheduler state as shown on a status page
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub check_interval_minutes: u64,
    pub last_daily_summary: Option<NaiveDate>,
    pub sinks: Vec<String>,
}

#[derive(Clone, Copy)]
enum Outgoing<'a> {
    Alert(&'a ExpiryAlert),
    Reminder(&'a RenewalReminder),
    Summary(&'a FamilySummary),
}

pub struct NotificationScheduler {
    db: Database,
    sinks: Vec<Arc<dyn NotificationSink>>,
    app_url: Option<String>,
    interval: Duration,
}

impl NotificationScheduler {
    pub fn new(db: Database, interval: Duration) -> Self {
        Self {
            db,
            sinks: Vec::new(),
            app_url: None,
            interval,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = Some(url.into());
        self
    }

    /// Run checks forever on the configured interval
    ///
    /// The first tick fires immediately. A failed pass is logged and the loop
    /// carries on.
    pub async fn run(&self) {
        info!(
            "Notification scheduler started (every {}s, {} sink(s))",
            self.interval.as_secs(),
            self.sinks.len()
        );
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            let now = Local::now().naive_local();
            match self.check(now.date(), now.hour()).await {
                Ok(report) => debug!("Scheduled check finished: {:?}", report),
                Err(e) => error!("Scheduled notification check failed: {}", e),
            }
        }
    }

    /// One scheduled pass for `today`, with `hour` as the local hour of day
    pub async fn check(&self, today: NaiveDate, hour: u32) -> Result<CheckReport> {
        let settings = AppSettings::load(&self.db).await?;
        let schedule = &settings.notification_schedule;
        let mut report = CheckReport::default();

        for tracked in self.db.get_tracked_documents(today).await? {
            report.documents_checked += 1;
            report.count_tier(&tracked);

            let (Some(document_id), Some(expiry), Some(days_left)) = (
                tracked.document.id,
                tracked.document.expiry_date,
                tracked.status.days_left(),
            ) else {
                continue;
            };

            let record = self.db.get_notification_record(document_id).await?;
            let last_notified = NotificationRecord::offset_for(record.as_ref(), expiry);
            let Some(offset) = schedule.due_offset(days_left, last_notified) else {
                continue;
            };

            let alert = ExpiryAlert::build(
                &tracked.document,
                &tracked.holder,
                expiry,
                days_left,
                Some(offset),
                self.app_url.as_deref(),
            );
            if self.deliver(Outgoing::Alert(&alert)).await == 0 {
                warn!(
                    "No sink delivered the {}-day alert for document {}; will retry",
                    offset, document_id
                );
                continue;
            }

            self.db
                .record_notification(&NotificationRecord {
                    document_id,
                    last_offset: offset,
                    expiry_date: expiry,
                    notified_at: Utc::now(),
                })
                .await?;
            report.notifications_sent += 1;
            info!(
                "Sent {}-day expiry alert for {}'s {}",
                offset, tracked.holder.name, alert.document_name
            );

            if wants_renewal_reminder(&tracked, days_left) {
                let reminder = RenewalReminder::build(&tracked.document, &tracked.holder, today);
                if self.deliver(Outgoing::Reminder(&reminder)).await > 0 {
                    report.reminders_sent += 1;
                }
            }
        }

        let last_summary = self.last_daily_summary().await?;
        if should_send_daily_summary(settings.daily_summary_enabled, last_summary, today, hour) {
            let summary = FamilySummary::build(report.urgent_count, report.warning_count);
            report.summary_sent = self.deliver(Outgoing::Summary(&summary)).await > 0;
            self.db.set_setting_json(LAST_SUMMARY_KEY, &today).await?;
            if report.summary_sent {
                info!("Sent daily family summary");
            }
        }

        if report.notifications_sent > 0 {
            info!("Sent {} notification(s)", report.notifications_sent);
        }
        Ok(report)
    }

    /// Manual trigger
    ///
    /// Alerts go out for every document within [`MANUAL_ALERT_DAYS`] of
    /// expiry regardless of history, and the family summary is always sent.
    /// Nothing is recorded, so the scheduled thresholds are unaffected.
    pub async fn check_now(&self, today: NaiveDate) -> Result<CheckReport> {
        info!("Manual notification check triggered");
        let mut report = CheckReport::default();

        for tracked in self.db.get_tracked_documents(today).await? {
            report.documents_checked += 1;
            report.count_tier(&tracked);

            let (Some(expiry), Some(days_left)) =
                (tracked.document.expiry_date, tracked.status.days_left())
            else {
                continue;
            };
            if days_left > MANUAL_ALERT_DAYS {
                continue;
            }

            let alert = ExpiryAlert::build(
                &tracked.document,
                &tracked.holder,
                expiry,
                days_left,
                None,
                self.app_url.as_deref(),
            );
            if self.deliver(Outgoing::Alert(&alert)).await > 0 {
                report.notifications_sent += 1;
            }

            if wants_renewal_reminder(&tracked, days_left) {
                let reminder = RenewalReminder::build(&tracked.document, &tracked.holder, today);
                if self.deliver(Outgoing::Reminder(&reminder)).await > 0 {
                    report.reminders_sent += 1;
                }
            }
        }

        let summary = FamilySummary::build(report.urgent_count, report.warning_count);
        report.summary_sent = self.deliver(Outgoing::Summary(&summary)).await > 0;
        if report.summary_sent {
            report.notifications_sent += 1;
        }

        info!(
            "Manual check complete: {} sent, {} urgent, {} warning",
            report.notifications_sent, report.urgent_count, report.warning_count
        );
        Ok(report)
    }

    pub async fn status(&self) -> Result<SchedulerStatus> {
        Ok(SchedulerStatus {
            check_interval_minutes: self.interval.as_secs() / 60,
            last_daily_summary: self.last_daily_summary().await?,
            sinks: self.sinks.iter().map(|s| s.name().to_string()).collect(),
        })
    }

    async fn last_daily_summary(&self) -> Result<Option<NaiveDate>> {
        load_key::<Option<NaiveDate>>(&self.db, LAST_SUMMARY_KEY, None).await
    }

    /// Hand one notification to every sink; returns how many delivered
    async fn deliver(&self, outgoing: Outgoing<'_>) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            let result = match outgoing {
                Outgoing::Alert(alert) => sink.send_expiry_alert(alert).await,
                Outgoing::Reminder(reminder) => sink.send_renewal_reminder(reminder).await,
                Outgoing::Summary(summary) => sink.send_family_summary(summary).await,
            };
            match result {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Sink '{}' failed: {}", sink.name(), e),
            }
        }
        delivered
    }
}

/// Calendar-style renewal reminder accompanies alerts outside the last month,
/// and every alert for a document whose renewal is already underway
fn wants_renewal_reminder(tracked: &TrackedDocument, days_left: i64) -> bool {
    days_left > MANUAL_ALERT_DAYS || tracked.document.status == WorkflowStatus::ApplicationSubmitted
}

/// Once per calendar day, from [`DAILY_SUMMARY_HOUR`] local time, when enabled
pub fn should_send_daily_summary(
    enabled: bool,
    last_sent: Option<NaiveDate>,
    today: NaiveDate,
    hour: u32,
) -> bool {
    enabled && hour >= DAILY_SUMMARY_HOUR && last_sent != Some(today)
}
