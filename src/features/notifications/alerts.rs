//! Notification payloads handed to sinks
//!
//! Priorities follow the push convention: -1 low, 0 normal, 1 high,
//! 2 emergency.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Document, Person, WorkflowStatus};
use crate::features::expiry::format_date_friendly;

/// An alert that a document is approaching (or past) expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub document_id: Option<i64>,
    pub holder_name: String,
    pub document_name: String,
    pub country: String,
    pub days_left: i64,
    pub expiry_date: NaiveDate,
    /// Schedule offset that triggered this alert, `None` for manual checks
    pub offset: Option<u32>,
    pub priority: i8,
    pub title: String,
    pub message: String,
    pub url: Option<String>,
}

impl ExpiryAlert {
    pub fn build(
        document: &Document,
        holder: &Person,
        expiry_date: NaiveDate,
        days_left: i64,
        offset: Option<u32>,
        app_url: Option<&str>,
    ) -> Self {
        let (priority, urgency, action) = if days_left <= 7 {
            (2, "CRITICAL", "Immediate action required")
        } else if days_left <= 30 {
            (1, "URGENT", "Consider expedited processing")
        } else if days_left <= 90 {
            (0, "ACTION NEEDED", "Start renewal process now")
        } else {
            (-1, "PLAN AHEAD", "Plan for renewal")
        };

        let document_name = document.doc_type.display_name();
        let message = if days_left > 0 {
            format!(
                "{}: {}'s {} ({}) expires in {} days ({}). {}.",
                urgency,
                holder.name,
                document_name,
                document.country,
                days_left,
                format_date_friendly(Some(expiry_date)),
                action
            )
        } else if days_left == 0 {
            format!(
                "{}: {}'s {} ({}) expires today. Immediate renewal required.",
                urgency, holder.name, document_name, document.country
            )
        } else {
            format!(
                "{}: {}'s {} ({}) expired {} days ago. Immediate renewal required.",
                urgency,
                holder.name,
                document_name,
                document.country,
                days_left.abs()
            )
        };

        ExpiryAlert {
            document_id: document.id,
            holder_name: holder.name.clone(),
            document_name,
            country: document.country.clone(),
            days_left,
            expiry_date,
            offset,
            priority,
            title: format!("Document Expiry Alert - {}", holder.name),
            message,
            url: app_url.map(str::to_string),
        }
    }
}

/// Progress reminder for a document whose renewal is underway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalReminder {
    pub document_id: Option<i64>,
    pub title: String,
    pub message: String,
}

impl RenewalReminder {
    pub fn build(document: &Document, holder: &Person, today: NaiveDate) -> Self {
        let document_name = document.doc_type.display_name();

        let message = if document.status == WorkflowStatus::ApplicationSubmitted {
            let mut message = format!(
                "Reminder: {}'s {} renewal application is in progress.",
                holder.name, document_name
            );
            if let Some(estimate) = document.processing_estimate.as_deref().filter(|e| !e.is_empty()) {
                message.push_str(&format!(" Estimated processing time: {}.", estimate));
            }
            if let Some(submitted) = document.submission_date {
                let days_since = (today - submitted).num_days();
                message.push_str(&format!(" Application submitted {} days ago.", days_since));
            }
            message
        } else {
            format!(
                "Reminder: Time to start the renewal process for {}'s {} ({}).",
                holder.name, document_name, document.country
            )
        };

        RenewalReminder {
            document_id: document.id,
            title: format!("Renewal Reminder - {}", holder.name),
            message,
        }
    }
}

/// Daily roll-up across the whole family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub urgent_count: usize,
    pub warning_count: usize,
    pub priority: i8,
    pub title: String,
    pub message: String,
}

impl FamilySummary {
    pub fn build(urgent_count: usize, warning_count: usize) -> Self {
        if urgent_count == 0 && warning_count == 0 {
            return FamilySummary {
                urgent_count,
                warning_count,
                priority: -1,
                title: "Daily Document Summary".to_string(),
                message: "All family documents are current. No action needed.".to_string(),
            };
        }

        let mut message = String::from("Family Document Summary:\n");
        if urgent_count > 0 {
            message.push_str(&format!(
                "{} urgent document(s) need immediate attention\n",
                urgent_count
            ));
        }
        if warning_count > 0 {
            message.push_str(&format!(
                "{} document(s) need renewal planning\n",
                warning_count
            ));
        }
        message.push_str("Check the app for details.");

        FamilySummary {
            urgent_count,
            warning_count,
            priority: if urgent_count > 0 { 1 } else { 0 },
            title: "Family Document Alert".to_string(),
            message,
        }
    }
}
