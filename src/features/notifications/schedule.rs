//! Notification schedule and the per-document firing rule
//!
//! A schedule is a set of day offsets before expiry. An offset is *crossed*
//! once `days_left <= offset`. On each check at most one alert fires per
//! document: the smallest crossed offset, and only if it is smaller than the
//! last offset already notified for that document.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OFFSETS: [u32; 6] = [180, 90, 30, 14, 7, 1];

/// Day offsets before expiry, kept sorted descending without duplicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct NotificationSchedule {
    offsets: Vec<u32>,
}

impl Default for NotificationSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSETS.to_vec())
    }
}

impl From<Vec<u32>> for NotificationSchedule {
    fn from(offsets: Vec<u32>) -> Self {
        Self::new(offsets)
    }
}

impl From<NotificationSchedule> for Vec<u32> {
    fn from(schedule: NotificationSchedule) -> Self {
        schedule.offsets
    }
}

impl NotificationSchedule {
    pub fn new(mut offsets: Vec<u32>) -> Self {
        offsets.sort_unstable_by(|a, b| b.cmp(a));
        offsets.dedup();
        Self { offsets }
    }

    /// No offsets at all; such a schedule never fires
    pub fn disabled() -> Self {
        Self { offsets: vec![] }
    }

    /// Parse the settings text form, e.g. `"180, 90, 30"`
    ///
    /// Blank input yields a disabled schedule.
    pub fn parse_list(text: &str) -> Result<Self> {
        let mut offsets = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let days = part
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid notification day '{}': expected a whole number of days", part))?;
            offsets.push(days);
        }
        Ok(Self::new(offsets))
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Most urgent offset already reached, if any
    pub fn smallest_crossed(&self, days_left: i64) -> Option<u32> {
        self.offsets
            .iter()
            .rev()
            .copied()
            .find(|&offset| days_left <= i64::from(offset))
    }

    /// Offset to notify for now, or `None`
    ///
    /// `last_notified` is the smallest offset already fired for the document's
    /// current expiry date.
    pub fn due_offset(&self, days_left: i64, last_notified: Option<u32>) -> Option<u32> {
        let candidate = self.smallest_crossed(days_left)?;
        match last_notified {
            Some(last) if candidate >= last => None,
            _ => Some(candidate),
        }
    }
}

impl std::fmt::Display for NotificationSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.offsets.iter().map(|o| o.to_string()).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Persisted bookkeeping of the last alert sent for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub document_id: i64,
    pub last_offset: u32,
    /// Expiry the alert was about; a renewed document starts fresh
    pub expiry_date: NaiveDate,
    pub notified_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationRecord {
    /// Last notified offset if the record still applies to `expiry`
    pub fn offset_for(record: Option<&NotificationRecord>, expiry: NaiveDate) -> Option<u32> {
        record
            .filter(|r| r.expiry_date == expiry)
            .map(|r| r.last_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let schedule = NotificationSchedule::default();
        assert_eq!(schedule.offsets(), &[180, 90, 30, 14, 7, 1]);
        assert_eq!(schedule.to_string(), "180, 90, 30, 14, 7, 1");
    }

    #[test]
    fn test_normalizes_order_and_duplicates() {
        let schedule = NotificationSchedule::new(vec![7, 30, 180, 30, 1]);
        assert_eq!(schedule.offsets(), &[180, 30, 7, 1]);
    }

    #[test]
    fn test_parse_list() {
        let schedule = NotificationSchedule::parse_list("1, 7,14 ,30").unwrap();
        assert_eq!(schedule.offsets(), &[30, 14, 7, 1]);
        assert!(NotificationSchedule::parse_list("").unwrap().is_empty());
        assert!(NotificationSchedule::parse_list("30, soon").is_err());
        assert!(NotificationSchedule::parse_list("-5").is_err());
    }

    #[test]
    fn test_empty_schedule_never_fires() {
        let schedule = NotificationSchedule::disabled();
        assert_eq!(schedule.due_offset(0, None), None);
        assert_eq!(schedule.due_offset(-10, None), None);
    }

    #[test]
    fn test_nothing_crossed_far_from_expiry() {
        let schedule = NotificationSchedule::default();
        assert_eq!(schedule.due_offset(181, None), None);
        assert_eq!(schedule.due_offset(180, None), Some(180));
    }

    #[test]
    fn test_no_fire_between_thresholds_once_notified() {
        let schedule = NotificationSchedule::default();
        // 180 already sent; 95 days has not reached 90 yet
        assert_eq!(schedule.due_offset(95, Some(180)), None);
        assert_eq!(schedule.due_offset(90, Some(180)), Some(90));
    }

    #[test]
    fn test_skipped_checks_fire_only_most_urgent() {
        let schedule = NotificationSchedule::default();
        // Last alert was at 90; by 25 days the 30 offset is the most urgent crossed
        assert_eq!(schedule.due_offset(25, Some(90)), Some(30));
        // Jumped from 90 straight past 30 and 14
        assert_eq!(schedule.due_offset(10, Some(90)), Some(14));
    }

    #[test]
    fn test_never_twice_for_same_offset() {
        let schedule = NotificationSchedule::default();
        let mut last = None;
        let mut fired = Vec::new();
        for days in (-5..=200).rev() {
            if let Some(offset) = schedule.due_offset(days, last) {
                fired.push(offset);
                last = Some(offset);
            }
        }
        assert_eq!(fired, vec![180, 90, 30, 14, 7, 1]);
    }

    #[test]
    fn test_expired_fires_smallest_once() {
        let schedule = NotificationSchedule::default();
        assert_eq!(schedule.due_offset(-3, None), Some(1));
        assert_eq!(schedule.due_offset(-3, Some(1)), None);
    }

    #[test]
    fn test_schedule_shrink_does_not_refire() {
        // 14 was sent under the old schedule; new schedule only has 30 and 7
        let schedule = NotificationSchedule::new(vec![30, 7]);
        assert_eq!(schedule.due_offset(12, Some(14)), None);
        assert_eq!(schedule.due_offset(7, Some(14)), Some(7));
    }

    #[test]
    fn test_record_applies_to_same_expiry_only() {
        let expiry = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        let record = NotificationRecord {
            document_id: 1,
            last_offset: 30,
            expiry_date: expiry,
            notified_at: chrono::Utc::now(),
        };
        assert_eq!(NotificationRecord::offset_for(Some(&record), expiry), Some(30));
        let renewed = NaiveDate::from_ymd_opt(2037, 1, 1).unwrap();
        assert_eq!(NotificationRecord::offset_for(Some(&record), renewed), None);
        assert_eq!(NotificationRecord::offset_for(None, expiry), None);
    }

    #[test]
    fn test_serde_as_plain_list() {
        let schedule: NotificationSchedule = serde_json::from_str("[1, 30, 7]").unwrap();
        assert_eq!(schedule.offsets(), &[30, 7, 1]);
        assert_eq!(serde_json::to_string(&schedule).unwrap(), "[30,7,1]");
    }
}
