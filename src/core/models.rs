//! Family and document records
//!
//! Plain data types shared by the store, the classifier and the scheduler.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Expiry date became optional for documents mid-renewal
//! - 1.0.0: Initial Person / Document records

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role of a family member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent,
    Child,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Parent => write!(f, "parent"),
            Role::Child => write!(f, "child"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "parent" => Ok(Role::Parent),
            "child" => Ok(Role::Child),
            _ => Err(anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Kind of government document
///
/// Anything outside the known kinds is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    Passport,
    DriversLicense,
    Nexus,
    BirthCertificate,
    Custom(String),
}

impl DocumentType {
    /// Stored identifier, e.g. `drivers_license`
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::Nexus => "nexus",
            DocumentType::BirthCertificate => "birth_certificate",
            DocumentType::Custom(name) => name.as_str(),
        }
    }

    /// Human readable name, e.g. `Drivers License`
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "passport" => DocumentType::Passport,
            "drivers_license" => DocumentType::DriversLicense,
            "nexus" => DocumentType::Nexus,
            "birth_certificate" => DocumentType::BirthCertificate,
            _ => DocumentType::Custom(value.trim().to_string()),
        }
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-tracked renewal state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Document in hand and valid
    Current,
    /// Renewal application sent, waiting on the agency
    ApplicationSubmitted,
    /// Replacement document received
    ReceivedNew,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Current => write!(f, "current"),
            WorkflowStatus::ApplicationSubmitted => write!(f, "application_submitted"),
            WorkflowStatus::ReceivedNew => write!(f, "received_new"),
        }
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(WorkflowStatus::Current),
            "application_submitted" => Ok(WorkflowStatus::ApplicationSubmitted),
            "received_new" => Ok(WorkflowStatus::ReceivedNew),
            _ => Err(anyhow!("Invalid workflow status: {}", s)),
        }
    }
}

/// A family member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Row id, `None` until stored
    pub id: Option<i64>,
    pub name: String,
    pub role: Role,
    pub birth_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Person {
    pub fn new(name: impl Into<String>, role: Role, birth_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            role,
            birth_date,
            created_at: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Person name cannot be empty");
        }
        Ok(())
    }
}

/// A government document held by one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Row id, `None` until stored
    pub id: Option<i64>,

    /// Owning person
    pub holder_id: i64,

    pub doc_type: DocumentType,

    /// Issuing country or region
    pub country: String,

    /// Plaintext number; encrypted only inside the store
    pub document_number: String,

    pub issue_date: Option<NaiveDate>,

    /// `None` while a renewal is in progress and no new document exists yet
    pub expiry_date: Option<NaiveDate>,

    pub status: WorkflowStatus,

    /// When the renewal application was sent
    pub submission_date: Option<NaiveDate>,

    /// Free text, e.g. "6-8 weeks"
    pub processing_estimate: Option<String>,

    /// File name inside the photo directory
    pub photo_filename: Option<String>,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(
        holder_id: i64,
        doc_type: DocumentType,
        country: impl Into<String>,
        document_number: impl Into<String>,
        expiry_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            holder_id,
            doc_type,
            country: country.into(),
            document_number: document_number.into(),
            issue_date: None,
            expiry_date,
            status: WorkflowStatus::Current,
            submission_date: None,
            processing_estimate: None,
            photo_filename: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Check the record-level invariants before it is written
    pub fn validate(&self) -> Result<()> {
        if self.country.trim().is_empty() {
            bail!("Issuing country cannot be empty");
        }
        if self.doc_type.as_str().is_empty() {
            bail!("Document type cannot be empty");
        }
        if let (Some(issued), Some(expires)) = (self.issue_date, self.expiry_date) {
            if expires < issued {
                bail!(
                    "Expiry date {} is before issue date {}",
                    expires,
                    issued
                );
            }
        }
        Ok(())
    }
}
