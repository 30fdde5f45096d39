//! # Expiry Feature
//!
//! Color-coded urgency tiers for documents, following the six-month rule.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Documents without an expiry date are reported as in progress
//! - 1.0.0: Initial tier table

pub mod classifier;

pub use classifier::{
    classify, days_until, format_date_friendly, reminder_dates, tier_for_days, ExpiryStatus,
    UrgencyTier,
};
