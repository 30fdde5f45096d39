//! # Document Store
//!
//! SQLite persistence for people, documents, settings and notification
//! bookkeeping. One connection is shared behind an async mutex, so every call
//! is a short serialized transaction-free operation.
//!
//! Document numbers are encrypted before they reach SQL and decrypted on read.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.3.0: notification_log side table for per-document alert history
//! - 1.2.0: Optional expiry dates for documents mid-renewal
//! - 1.1.0: Cascade person deletes through foreign keys
//! - 1.0.0: Initial schema

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlite::{Connection, State, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::{Document, DocumentCipher, DocumentType, Person, Role, WorkflowStatus};
use crate::features::expiry::{classify, ExpiryStatus};
use crate::features::notifications::NotificationRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS people (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('parent', 'child')),
        birth_date TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS documents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        holder_id INTEGER NOT NULL REFERENCES people (id) ON DELETE CASCADE,
        type TEXT NOT NULL,
        country TEXT NOT NULL,
        document_number TEXT NOT NULL,
        issue_date TEXT,
        expiry_date TEXT,
        status TEXT NOT NULL DEFAULT 'current'
            CHECK (status IN ('current', 'application_submitted', 'received_new')),
        submission_date TEXT,
        processing_estimate TEXT,
        photo_filename TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_holder ON documents (holder_id);

    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS notification_log (
        document_id INTEGER PRIMARY KEY REFERENCES documents (id) ON DELETE CASCADE,
        last_offset INTEGER NOT NULL,
        expiry_date TEXT NOT NULL,
        notified_at TEXT NOT NULL
    );
";

/// A document with its holder and current expiry status
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDocument {
    pub document: Document,
    pub holder: Person,
    pub status: ExpiryStatus,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    cipher: DocumentCipher,
}

impl Database {
    /// Open (or create) the database at `path`; `:memory:` is accepted
    pub async fn new(path: &str, cipher: DocumentCipher) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = sqlite::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON;")?;
        conn.execute(SCHEMA)?;
        info!("Database ready at {}", path);

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
            cipher,
        })
    }

    // ------------------------------------------------------------------
    // People
    // ------------------------------------------------------------------

    pub async fn add_person(&self, person: &Person) -> Result<i64> {
        person.validate()?;
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "INSERT INTO people (name, role, birth_date, created_at) VALUES (?, ?, ?, ?)",
        )?;
        stmt.bind((1, person.name.trim()))?;
        stmt.bind((2, person.role.to_string().as_str()))?;
        stmt.bind((3, format_date(person.birth_date).as_str()))?;
        stmt.bind((4, now_timestamp().as_str()))?;
        stmt.next()?;

        let id = last_insert_rowid(&conn)?;
        debug!("Added person {} ({})", id, person.name);
        Ok(id)
    }

    /// Parents first, then by name
    pub async fn get_people(&self) -> Result<Vec<Person>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT * FROM people ORDER BY role DESC, name")?;

        let mut people = Vec::new();
        while let State::Row = stmt.next()? {
            people.push(read_person(&stmt)?);
        }
        Ok(people)
    }

    pub async fn get_person(&self, person_id: i64) -> Result<Option<Person>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT * FROM people WHERE id = ?")?;
        stmt.bind((1, person_id))?;

        match stmt.next()? {
            State::Row => Ok(Some(read_person(&stmt)?)),
            State::Done => Ok(None),
        }
    }

    pub async fn update_person(&self, person: &Person) -> Result<()> {
        person.validate()?;
        let id = person.id.ok_or_else(|| anyhow!("Cannot update a person without an id"))?;
        let conn = self.conn.lock().await;

        let mut stmt =
            conn.prepare("UPDATE people SET name = ?, role = ?, birth_date = ? WHERE id = ?")?;
        stmt.bind((1, person.name.trim()))?;
        stmt.bind((2, person.role.to_string().as_str()))?;
        stmt.bind((3, format_date(person.birth_date).as_str()))?;
        stmt.bind((4, id))?;
        stmt.next()?;

        if changes(&conn)? == 0 {
            bail!("Person {} does not exist", id);
        }
        Ok(())
    }

    /// Delete a person together with their documents
    ///
    /// Returns the photo filenames that belonged to the removed documents.
    pub async fn delete_person(&self, person_id: i64) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;

        let mut photos = Vec::new();
        {
            let mut stmt = conn.prepare(
                "SELECT photo_filename FROM documents WHERE holder_id = ? AND photo_filename IS NOT NULL",
            )?;
            stmt.bind((1, person_id))?;
            while let State::Row = stmt.next()? {
                photos.push(stmt.read::<String, _>(0)?);
            }
        }

        let mut stmt = conn.prepare("DELETE FROM people WHERE id = ?")?;
        stmt.bind((1, person_id))?;
        stmt.next()?;

        if changes(&conn)? > 0 {
            info!("Deleted person {} and their documents", person_id);
        }
        Ok(photos)
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub async fn add_document(&self, document: &Document) -> Result<i64> {
        document.validate()?;
        let encrypted_number = self.cipher.encrypt(&document.document_number)?;
        let conn = self.conn.lock().await;

        ensure_person_exists(&conn, document.holder_id)?;

        let now = now_timestamp();
        let mut stmt = conn.prepare(
            "INSERT INTO documents
             (holder_id, type, country, document_number, issue_date, expiry_date, status,
              submission_date, processing_estimate, photo_filename, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        bind_document(&mut stmt, document, &encrypted_number)?;
        stmt.bind((12, now.as_str()))?;
        stmt.bind((13, now.as_str()))?;
        stmt.next()?;

        let id = last_insert_rowid(&conn)?;
        debug!(
            "Added {} document {} for person {}",
            document.doc_type, id, document.holder_id
        );
        Ok(id)
    }

    /// Documents ordered by expiry (in-progress last), optionally for one holder
    pub async fn get_documents(&self, holder_id: Option<i64>) -> Result<Vec<Document>> {
        let conn = self.conn.lock().await;

        let mut stmt = match holder_id {
            Some(holder) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM documents WHERE holder_id = ?
                     ORDER BY expiry_date IS NULL, expiry_date, id",
                )?;
                stmt.bind((1, holder))?;
                stmt
            }
            None => conn.prepare(
                "SELECT * FROM documents ORDER BY expiry_date IS NULL, expiry_date, id",
            )?,
        };

        let mut documents = Vec::new();
        while let State::Row = stmt.next()? {
            documents.push(self.read_document(&stmt)?);
        }
        Ok(documents)
    }

    pub async fn get_document(&self, document_id: i64) -> Result<Option<Document>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?")?;
        stmt.bind((1, document_id))?;

        match stmt.next()? {
            State::Row => Ok(Some(self.read_document(&stmt)?)),
            State::Done => Ok(None),
        }
    }

    pub async fn update_document(&self, document: &Document) -> Result<()> {
        document.validate()?;
        let id = document
            .id
            .ok_or_else(|| anyhow!("Cannot update a document without an id"))?;
        let encrypted_number = self.cipher.encrypt(&document.document_number)?;
        let conn = self.conn.lock().await;

        ensure_person_exists(&conn, document.holder_id)?;

        let mut stmt = conn.prepare(
            "UPDATE documents
             SET holder_id = ?, type = ?, country = ?, document_number = ?, issue_date = ?,
                 expiry_date = ?, status = ?, submission_date = ?, processing_estimate = ?,
                 photo_filename = ?, notes = ?, updated_at = ?
             WHERE id = ?",
        )?;
        bind_document(&mut stmt, document, &encrypted_number)?;
        stmt.bind((12, now_timestamp().as_str()))?;
        stmt.bind((13, id))?;
        stmt.next()?;

        if changes(&conn)? == 0 {
            bail!("Document {} does not exist", id);
        }
        Ok(())
    }

    /// Returns the removed document's photo filename, if it had one
    pub async fn delete_document(&self, document_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().await;

        let photo = {
            let mut stmt = conn.prepare("SELECT photo_filename FROM documents WHERE id = ?")?;
            stmt.bind((1, document_id))?;
            match stmt.next()? {
                State::Row => stmt.read::<Option<String>, _>(0)?,
                State::Done => None,
            }
        };

        let mut stmt = conn.prepare("DELETE FROM documents WHERE id = ?")?;
        stmt.bind((1, document_id))?;
        stmt.next()?;
        Ok(photo)
    }

    /// Every document joined with its holder and classified against `today`
    pub async fn get_tracked_documents(&self, today: NaiveDate) -> Result<Vec<TrackedDocument>> {
        let people: HashMap<i64, Person> = self
            .get_people()
            .await?
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id, p)))
            .collect();

        let tracked = self
            .get_documents(None)
            .await?
            .into_iter()
            .filter_map(|document| {
                let holder = people.get(&document.holder_id)?.clone();
                let status = classify(document.expiry_date, today);
                Some(TrackedDocument {
                    document,
                    holder,
                    status,
                })
            })
            .collect();
        Ok(tracked)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?")?;
        stmt.bind((1, key))?;

        match stmt.next()? {
            State::Row => Ok(Some(stmt.read::<String, _>(0)?)),
            State::Done => Ok(None),
        }
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, ?)",
        )?;
        stmt.bind((1, key))?;
        stmt.bind((2, value))?;
        stmt.bind((3, now_timestamp().as_str()))?;
        stmt.next()?;
        Ok(())
    }

    /// Typed read of a JSON setting
    pub async fn get_setting_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_setting(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .map_err(|e| anyhow!("Setting '{}' is not valid: {}", key, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set_setting_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_setting(key, &raw).await
    }

    // ------------------------------------------------------------------
    // Notification history
    // ------------------------------------------------------------------

    pub async fn get_notification_record(
        &self,
        document_id: i64,
    ) -> Result<Option<NotificationRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT * FROM notification_log WHERE document_id = ?")?;
        stmt.bind((1, document_id))?;

        match stmt.next()? {
            State::Row => {
                let last_offset = stmt.read::<i64, _>("last_offset")?;
                Ok(Some(NotificationRecord {
                    document_id: stmt.read::<i64, _>("document_id")?,
                    last_offset: u32::try_from(last_offset)
                        .map_err(|_| anyhow!("Invalid stored offset {}", last_offset))?,
                    expiry_date: parse_date(&stmt.read::<String, _>("expiry_date")?)?,
                    notified_at: parse_timestamp(&stmt.read::<String, _>("notified_at")?)?,
                }))
            }
            State::Done => Ok(None),
        }
    }

    pub async fn record_notification(&self, record: &NotificationRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "INSERT OR REPLACE INTO notification_log
             (document_id, last_offset, expiry_date, notified_at) VALUES (?, ?, ?, ?)",
        )?;
        stmt.bind((1, record.document_id))?;
        stmt.bind((2, i64::from(record.last_offset)))?;
        stmt.bind((3, format_date(record.expiry_date).as_str()))?;
        stmt.bind((4, format_timestamp(record.notified_at).as_str()))?;
        stmt.next()?;
        Ok(())
    }

    /// Number of documents with alert history
    pub async fn notification_record_count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM notification_log")?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)? as usize)
    }

    /// Remove every person, document, setting and alert record
    pub async fn clear_all_data(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM notification_log;
             DELETE FROM documents;
             DELETE FROM people;
             DELETE FROM settings;",
        )?;
        info!("Cleared all data");
        Ok(())
    }

    fn read_document(&self, stmt: &Statement) -> Result<Document> {
        let stored_number = stmt.read::<String, _>("document_number")?;
        Ok(Document {
            id: Some(stmt.read::<i64, _>("id")?),
            holder_id: stmt.read::<i64, _>("holder_id")?,
            doc_type: DocumentType::from(stmt.read::<String, _>("type")?),
            country: stmt.read::<String, _>("country")?,
            document_number: self.cipher.decrypt(&stored_number)?,
            issue_date: read_optional_date(stmt, "issue_date")?,
            expiry_date: read_optional_date(stmt, "expiry_date")?,
            status: stmt.read::<String, _>("status")?.parse::<WorkflowStatus>()?,
            submission_date: read_optional_date(stmt, "submission_date")?,
            processing_estimate: stmt.read::<Option<String>, _>("processing_estimate")?,
            photo_filename: stmt.read::<Option<String>, _>("photo_filename")?,
            notes: stmt.read::<Option<String>, _>("notes")?,
            created_at: Some(parse_timestamp(&stmt.read::<String, _>("created_at")?)?),
            updated_at: Some(parse_timestamp(&stmt.read::<String, _>("updated_at")?)?),
        })
    }
}

fn read_person(stmt: &Statement) -> Result<Person> {
    Ok(Person {
        id: Some(stmt.read::<i64, _>("id")?),
        name: stmt.read::<String, _>("name")?,
        role: stmt.read::<String, _>("role")?.parse::<Role>()?,
        birth_date: parse_date(&stmt.read::<String, _>("birth_date")?)?,
        created_at: Some(parse_timestamp(&stmt.read::<String, _>("created_at")?)?),
    })
}

/// Binds parameters 1..=11 shared by INSERT and UPDATE
fn bind_document(stmt: &mut Statement, document: &Document, encrypted_number: &str) -> Result<()> {
    let issue_date = document.issue_date.map(format_date);
    let expiry_date = document.expiry_date.map(format_date);
    let submission_date = document.submission_date.map(format_date);

    stmt.bind((1, document.holder_id))?;
    stmt.bind((2, document.doc_type.as_str()))?;
    stmt.bind((3, document.country.trim()))?;
    stmt.bind((4, encrypted_number))?;
    stmt.bind((5, issue_date.as_deref()))?;
    stmt.bind((6, expiry_date.as_deref()))?;
    stmt.bind((7, document.status.to_string().as_str()))?;
    stmt.bind((8, submission_date.as_deref()))?;
    stmt.bind((9, document.processing_estimate.as_deref()))?;
    stmt.bind((10, document.photo_filename.as_deref()))?;
    stmt.bind((11, document.notes.as_deref()))?;
    Ok(())
}

fn ensure_person_exists(conn: &Connection, person_id: i64) -> Result<()> {
    let mut stmt = conn.prepare("SELECT 1 FROM people WHERE id = ?")?;
    stmt.bind((1, person_id))?;
    match stmt.next()? {
        State::Row => Ok(()),
        State::Done => bail!("Person {} does not exist", person_id),
    }
}

fn last_insert_rowid(conn: &Connection) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT last_insert_rowid()")?;
    stmt.next()?;
    Ok(stmt.read::<i64, _>(0)?)
}

fn changes(conn: &Connection) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT changes()")?;
    stmt.next()?;
    Ok(stmt.read::<i64, _>(0)?)
}

fn read_optional_date(stmt: &Statement, column: &str) -> Result<Option<NaiveDate>> {
    match stmt.read::<Option<String>, _>(column)? {
        Some(raw) if !raw.is_empty() => Ok(Some(parse_date(&raw)?)),
        _ => Ok(None),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| anyhow!("Invalid date '{}': {}", raw, e))
}

fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| anyhow!("Invalid timestamp '{}': {}", raw, e))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub const TEST_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    pub async fn memory_db() -> Database {
        let cipher = DocumentCipher::from_hex_key(TEST_KEY).unwrap();
        Database::new(":memory:", cipher).await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::memory_db;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_person_crud() {
        let db = memory_db().await;
        let id = db
            .add_person(&Person::new("Sarah Doe", Role::Child, date(2010, 11, 8)))
            .await
            .unwrap();

        let mut person = db.get_person(id).await.unwrap().unwrap();
        assert_eq!(person.name, "Sarah Doe");
        assert_eq!(person.role, Role::Child);
        assert_eq!(person.birth_date, date(2010, 11, 8));
        assert!(person.created_at.is_some());

        person.name = "Sarah J. Doe".to_string();
        db.update_person(&person).await.unwrap();
        assert_eq!(db.get_person(id).await.unwrap().unwrap().name, "Sarah J. Doe");

        db.delete_person(id).await.unwrap();
        assert!(db.get_person(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_person_fails() {
        let db = memory_db().await;
        let mut ghost = Person::new("Ghost", Role::Parent, date(1980, 1, 1));
        ghost.id = Some(42);
        assert!(db.update_person(&ghost).await.is_err());
    }

    #[tokio::test]
    async fn test_people_parents_first() {
        let db = memory_db().await;
        db.add_person(&Person::new("Tommy", Role::Child, date(2015, 9, 12))).await.unwrap();
        db.add_person(&Person::new("Jane", Role::Parent, date(1987, 7, 22))).await.unwrap();
        db.add_person(&Person::new("Ann", Role::Child, date(2012, 1, 2))).await.unwrap();

        let names: Vec<String> = db.get_people().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Jane", "Ann", "Tommy"]);
    }

    #[tokio::test]
    async fn test_document_crud_and_encryption() {
        let db = memory_db().await;
        let holder = db
            .add_person(&Person::new("John Doe", Role::Parent, date(1985, 3, 15)))
            .await
            .unwrap();

        let mut doc = Document::new(
            holder,
            DocumentType::Passport,
            "USA",
            "123456789",
            Some(date(2029, 5, 15)),
        );
        doc.issue_date = Some(date(2024, 5, 15));
        doc.notes = Some("Blue cover".to_string());
        let id = db.add_document(&doc).await.unwrap();

        // Number is not stored in plaintext
        {
            let conn = db.conn.lock().await;
            let mut stmt = conn.prepare("SELECT document_number FROM documents WHERE id = ?").unwrap();
            stmt.bind((1, id)).unwrap();
            stmt.next().unwrap();
            let raw = stmt.read::<String, _>(0).unwrap();
            assert!(!raw.contains("123456789"));
        }

        let mut stored = db.get_document(id).await.unwrap().unwrap();
        assert_eq!(stored.document_number, "123456789");
        assert_eq!(stored.issue_date, Some(date(2024, 5, 15)));
        assert_eq!(stored.expiry_date, Some(date(2029, 5, 15)));
        assert_eq!(stored.status, WorkflowStatus::Current);
        assert_eq!(stored.notes.as_deref(), Some("Blue cover"));

        stored.status = WorkflowStatus::ApplicationSubmitted;
        stored.submission_date = Some(date(2026, 10, 1));
        stored.processing_estimate = Some("6-8 weeks".to_string());
        db.update_document(&stored).await.unwrap();

        let updated = db.get_document(id).await.unwrap().unwrap();
        assert_eq!(updated.status, WorkflowStatus::ApplicationSubmitted);
        assert_eq!(updated.submission_date, Some(date(2026, 10, 1)));
        assert_eq!(updated.processing_estimate.as_deref(), Some("6-8 weeks"));

        assert_eq!(db.delete_document(id).await.unwrap(), None);
        assert!(db.get_document(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_requires_existing_person() {
        let db = memory_db().await;
        let doc = Document::new(99, DocumentType::Nexus, "USA/Canada", "50123456", None);
        assert!(db.add_document(&doc).await.is_err());
    }

    #[tokio::test]
    async fn test_document_rejects_expiry_before_issue() {
        let db = memory_db().await;
        let holder = db
            .add_person(&Person::new("John", Role::Parent, date(1985, 3, 15)))
            .await
            .unwrap();
        let mut doc = Document::new(holder, DocumentType::Passport, "USA", "1", Some(date(2020, 1, 1)));
        doc.issue_date = Some(date(2021, 1, 1));
        assert!(db.add_document(&doc).await.is_err());
    }

    #[tokio::test]
    async fn test_update_rejects_expiry_before_issue() {
        let db = memory_db().await;
        let holder = db
            .add_person(&Person::new("John", Role::Parent, date(1985, 3, 15)))
            .await
            .unwrap();
        let mut doc = Document::new(holder, DocumentType::Passport, "USA", "1", Some(date(2029, 5, 15)));
        doc.issue_date = Some(date(2024, 5, 15));
        let id = db.add_document(&doc).await.unwrap();

        let mut stored = db.get_document(id).await.unwrap().unwrap();
        stored.expiry_date = Some(date(2023, 1, 1));
        assert!(db.update_document(&stored).await.is_err());
        assert_eq!(
            db.get_document(id).await.unwrap().unwrap().expiry_date,
            Some(date(2029, 5, 15))
        );
    }

    #[tokio::test]
    async fn test_custom_document_type_roundtrip() {
        let db = memory_db().await;
        let holder = db
            .add_person(&Person::new("Jane", Role::Parent, date(1987, 7, 22)))
            .await
            .unwrap();
        let doc = Document::new(
            holder,
            DocumentType::Custom("health_card".to_string()),
            "Ontario",
            "1234-567-890",
            Some(date(2028, 7, 22)),
        );
        let id = db.add_document(&doc).await.unwrap();

        let stored = db.get_document(id).await.unwrap().unwrap();
        assert_eq!(stored.doc_type, DocumentType::Custom("health_card".to_string()));
        assert_eq!(stored.doc_type.display_name(), "Health Card");
        assert_eq!(stored.document_number, "1234-567-890");
    }

    #[tokio::test]
    async fn test_documents_by_holder_ordered_by_expiry() {
        let db = memory_db().await;
        let jane = db.add_person(&Person::new("Jane", Role::Parent, date(1987, 7, 22))).await.unwrap();
        let john = db.add_person(&Person::new("John", Role::Parent, date(1985, 3, 15))).await.unwrap();

        db.add_document(&Document::new(jane, DocumentType::Passport, "Canada", "AB1", Some(date(2030, 8, 22))))
            .await
            .unwrap();
        db.add_document(&Document::new(jane, DocumentType::Nexus, "USA/Canada", "501", Some(date(2026, 1, 15))))
            .await
            .unwrap();
        db.add_document(&Document::new(jane, DocumentType::DriversLicense, "Ontario", "", None))
            .await
            .unwrap();
        db.add_document(&Document::new(john, DocumentType::Passport, "USA", "123", Some(date(2029, 5, 15))))
            .await
            .unwrap();

        let janes = db.get_documents(Some(jane)).await.unwrap();
        let types: Vec<DocumentType> = janes.iter().map(|d| d.doc_type.clone()).collect();
        assert_eq!(
            types,
            vec![DocumentType::Nexus, DocumentType::Passport, DocumentType::DriversLicense]
        );
        assert_eq!(janes[2].document_number, "");

        assert_eq!(db.get_documents(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_person_cascades() {
        let db = memory_db().await;
        let holder = db.add_person(&Person::new("Tommy", Role::Child, date(2015, 9, 12))).await.unwrap();
        let mut doc = Document::new(holder, DocumentType::Passport, "USA", "456", Some(date(2025, 9, 12)));
        doc.photo_filename = Some("abc.jpg".to_string());
        let doc_id = db.add_document(&doc).await.unwrap();
        db.record_notification(&NotificationRecord {
            document_id: doc_id,
            last_offset: 30,
            expiry_date: date(2025, 9, 12),
            notified_at: Utc::now(),
        })
        .await
        .unwrap();

        let photos = db.delete_person(holder).await.unwrap();
        assert_eq!(photos, vec!["abc.jpg".to_string()]);
        assert!(db.get_documents(None).await.unwrap().is_empty());
        assert_eq!(db.notification_record_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let db = memory_db().await;
        assert!(db.get_setting("theme").await.unwrap().is_none());

        db.set_setting("theme", "dark").await.unwrap();
        db.set_setting("theme", "light").await.unwrap();
        assert_eq!(db.get_setting("theme").await.unwrap().as_deref(), Some("light"));

        db.set_setting_json("notification_schedule", &vec![30u32, 7]).await.unwrap();
        let schedule: Option<Vec<u32>> = db.get_setting_json("notification_schedule").await.unwrap();
        assert_eq!(schedule, Some(vec![30, 7]));
    }

    #[tokio::test]
    async fn test_notification_record_replaces() {
        let db = memory_db().await;
        let holder = db.add_person(&Person::new("Sarah", Role::Child, date(2010, 11, 8))).await.unwrap();
        let doc_id = db
            .add_document(&Document::new(holder, DocumentType::Passport, "USA", "9", Some(date(2026, 11, 4))))
            .await
            .unwrap();

        assert!(db.get_notification_record(doc_id).await.unwrap().is_none());

        for offset in [90u32, 30] {
            db.record_notification(&NotificationRecord {
                document_id: doc_id,
                last_offset: offset,
                expiry_date: date(2026, 11, 4),
                notified_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let record = db.get_notification_record(doc_id).await.unwrap().unwrap();
        assert_eq!(record.last_offset, 30);
        assert_eq!(record.expiry_date, date(2026, 11, 4));
        assert_eq!(db.notification_record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_data() {
        let db = memory_db().await;
        let holder = db.add_person(&Person::new("Sarah", Role::Child, date(2010, 11, 8))).await.unwrap();
        db.add_document(&Document::new(holder, DocumentType::Passport, "USA", "9", None))
            .await
            .unwrap();
        db.set_setting("theme", "dark").await.unwrap();

        db.clear_all_data().await.unwrap();
        assert!(db.get_people().await.unwrap().is_empty());
        assert!(db.get_documents(None).await.unwrap().is_empty());
        assert!(db.get_setting("theme").await.unwrap().is_none());
    }
}
