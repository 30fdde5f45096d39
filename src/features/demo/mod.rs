//! # Demo Feature
//!
//! Replaces all stored data with a sample family so the dashboard and
//! scheduler have something to show.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use serde::Deserialize;

use crate::core::{Document, DocumentType, Person, Role, WorkflowStatus};
use crate::database::Database;

const DEMO_FAMILY: &str = include_str!("../../../fixtures/demo_family.yaml");

#[derive(Debug, Deserialize)]
struct DemoFamily {
    people: Vec<DemoPerson>,
}

#[derive(Debug, Deserialize)]
struct DemoPerson {
    name: String,
    role: Role,
    birth_date: NaiveDate,
    #[serde(default)]
    documents: Vec<DemoDocument>,
}

#[derive(Debug, Deserialize)]
struct DemoDocument {
    #[serde(rename = "type")]
    doc_type: DocumentType,
    country: String,
    number: String,
    issue_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    status: WorkflowStatus,
    submission_date: Option<NaiveDate>,
    processing_estimate: Option<String>,
}

fn default_status() -> WorkflowStatus {
    WorkflowStatus::Current
}

/// Counts of what was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoLoad {
    pub people: usize,
    pub documents: usize,
}

/// Clear the store and insert the demo family
pub async fn load_demo_data(db: &Database) -> Result<DemoLoad> {
    let family: DemoFamily = serde_yaml::from_str(DEMO_FAMILY)?;

    db.clear_all_data().await?;

    let mut loaded = DemoLoad {
        people: 0,
        documents: 0,
    };
    for demo in family.people {
        let holder_id = db
            .add_person(&Person::new(demo.name, demo.role, demo.birth_date))
            .await?;
        loaded.people += 1;

        for doc in demo.documents {
            let mut document = Document::new(
                holder_id,
                doc.doc_type,
                doc.country,
                doc.number,
                doc.expiry_date,
            );
            document.issue_date = doc.issue_date;
            document.status = doc.status;
            document.submission_date = doc.submission_date;
            document.processing_estimate = doc.processing_estimate;
            db.add_document(&document).await?;
            loaded.documents += 1;
        }
    }

    info!(
        "Loaded demo family: {} people, {} documents",
        loaded.people, loaded.documents
    );
    Ok(loaded)
}
