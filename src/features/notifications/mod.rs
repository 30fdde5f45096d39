//! # Notifications Feature
//!
//! Threshold-based expiry alerts, renewal reminders and the daily family
//! summary, delivered through pluggable sinks.
//!
//! - **Version**: 1.4.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.4.0: Manual check and scheduler status
//! - 1.3.0: Per-document history keyed by expiry date; renewals start fresh
//! - 1.2.0: Only the most urgent crossed threshold fires per check
//! - 1.1.0: Daily family summary
//! - 1.0.0: Initial threshold alerts

pub mod alerts;
pub mod schedule;
pub mod scheduler;
pub mod sink;

pub use alerts::{ExpiryAlert, FamilySummary, RenewalReminder};
pub use schedule::{NotificationRecord, NotificationSchedule, DEFAULT_OFFSETS};
pub use scheduler::{should_send_daily_summary, CheckReport, NotificationScheduler, SchedulerStatus};
pub use sink::{LogSink, NotificationSink};
