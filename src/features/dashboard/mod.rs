//! # Dashboard Feature
//!
//! Groups tracked documents by urgency for the overview screen.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

use anyhow::Result;
use chrono::NaiveDate;

use crate::database::{Database, TrackedDocument};
use crate::features::expiry::UrgencyTier;

#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    pub people_count: usize,
    pub document_count: usize,
    /// Critical tier, including expired
    pub urgent: Vec<TrackedDocument>,
    /// Act Now and Plan Renewal
    pub needs_attention: Vec<TrackedDocument>,
    /// Safe, or no expiry date yet
    pub current: Vec<TrackedDocument>,
}

impl DashboardSummary {
    pub fn build(people_count: usize, tracked: Vec<TrackedDocument>) -> Self {
        let mut summary = DashboardSummary {
            people_count,
            document_count: tracked.len(),
            ..Default::default()
        };

        for doc in tracked {
            match doc.status.tier() {
                Some(UrgencyTier::Critical) => summary.urgent.push(doc),
                Some(UrgencyTier::ActNow) | Some(UrgencyTier::PlanRenewal) => {
                    summary.needs_attention.push(doc)
                }
                Some(UrgencyTier::Safe) | None => summary.current.push(doc),
            }
        }
        summary
    }

    pub async fn load(db: &Database, today: NaiveDate) -> Result<Self> {
        let people_count = db.get_people().await?.len();
        let tracked = db.get_tracked_documents(today).await?;
        Ok(Self::build(people_count, tracked))
    }

    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}
