//! Expiry urgency classification
//!
//! Maps days-until-expiry onto four tiers following the six-month
//! international travel rule. Everything here is a pure function of its
//! arguments; callers pass `today` explicitly.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// At or beyond this many days a document is safe for international travel
pub const SAFE_DAYS: i64 = 180;

/// At or beyond this many days renewal only needs planning
pub const PLAN_RENEWAL_DAYS: i64 = 90;

/// At or beyond this many days renewal should start now; below it is critical
pub const ACT_NOW_DAYS: i64 = 30;

/// Within this many days a critical document is labelled "Critical (7 days)"
const LAST_WEEK_DAYS: i64 = 7;

/// Urgency tier derived from remaining validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Critical,
    ActNow,
    PlanRenewal,
    Safe,
}

impl UrgencyTier {
    pub fn color(&self) -> &'static str {
        match self {
            UrgencyTier::Safe => "green",
            UrgencyTier::PlanRenewal => "yellow",
            UrgencyTier::ActNow => "orange",
            UrgencyTier::Critical => "red",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UrgencyTier::Safe => "Safe",
            UrgencyTier::PlanRenewal => "Plan Renewal",
            UrgencyTier::ActNow => "Act Now",
            UrgencyTier::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Computed status of one document on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// No expiry date yet, e.g. waiting on a renewed document
    InProgress,
    Tiered { tier: UrgencyTier, days_left: i64 },
}

impl ExpiryStatus {
    pub fn tier(&self) -> Option<UrgencyTier> {
        match self {
            ExpiryStatus::InProgress => None,
            ExpiryStatus::Tiered { tier, .. } => Some(*tier),
        }
    }

    pub fn days_left(&self) -> Option<i64> {
        match self {
            ExpiryStatus::InProgress => None,
            ExpiryStatus::Tiered { days_left, .. } => Some(*days_left),
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ExpiryStatus::InProgress => "gray",
            ExpiryStatus::Tiered { tier, .. } => tier.color(),
        }
    }

    /// Badge text shown next to a document
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::InProgress => "No expiry date",
            ExpiryStatus::Tiered { tier, days_left } => match tier {
                UrgencyTier::Critical if *days_left < 0 => "Expired",
                UrgencyTier::Critical if *days_left <= LAST_WEEK_DAYS => "Critical (7 days)",
                UrgencyTier::Critical => "Urgent (1 month)",
                UrgencyTier::ActNow => "Act Now (3 months)",
                UrgencyTier::PlanRenewal => "Plan Renewal (6 months)",
                UrgencyTier::Safe => "Safe",
            },
        }
    }
}

/// Signed whole days from `today` to `expiry`; negative once expired
pub fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Tier for a number of remaining days
pub fn tier_for_days(days_left: i64) -> UrgencyTier {
    if days_left >= SAFE_DAYS {
        UrgencyTier::Safe
    } else if days_left >= PLAN_RENEWAL_DAYS {
        UrgencyTier::PlanRenewal
    } else if days_left >= ACT_NOW_DAYS {
        UrgencyTier::ActNow
    } else {
        UrgencyTier::Critical
    }
}

pub fn classify(expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    match expiry {
        None => ExpiryStatus::InProgress,
        Some(expiry) => {
            let days_left = days_until(expiry, today);
            ExpiryStatus::Tiered {
                tier: tier_for_days(days_left),
                days_left,
            }
        }
    }
}

/// "March 15, 2029", or "Not set"
pub fn format_date_friendly(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%B %d, %Y").to_string(),
        None => "Not set".to_string(),
    }
}

/// Calendar dates on which each offset falls, skipping dates already past
pub fn reminder_dates(expiry: NaiveDate, offsets: &[u32], today: NaiveDate) -> Vec<NaiveDate> {
    offsets
        .iter()
        .map(|&days| expiry - Duration::days(i64::from(days)))
        .filter(|date| *date >= today)
        .collect()
}
