//! # Features
//!
//! Each feature lives in its own module with a versioned header. The registry
//! below is what the binary prints at startup.

pub mod dashboard;
pub mod demo;
pub mod expiry;
pub mod notifications;
pub mod photos;
pub mod settings;

pub use dashboard::DashboardSummary;
pub use demo::{load_demo_data, DemoLoad};
pub use expiry::{classify, ExpiryStatus, UrgencyTier};
pub use notifications::{CheckReport, LogSink, NotificationScheduler, NotificationSink};
pub use photos::PhotoStore;
pub use settings::{AppSettings, IntegrationStatus, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub since: &'static str,
    pub toggleable: bool,
}

const FEATURES: &[Feature] = &[
    Feature {
        id: "expiry",
        name: "Expiry",
        version: "1.1.0",
        since: "0.1.0",
        toggleable: false,
    },
    Feature {
        id: "notifications",
        name: "Notifications",
        version: "1.4.0",
        since: "0.1.0",
        toggleable: true,
    },
    Feature {
        id: "settings",
        name: "Settings",
        version: "1.1.0",
        since: "0.2.0",
        toggleable: false,
    },
    Feature {
        id: "dashboard",
        name: "Dashboard",
        version: "1.0.0",
        since: "0.2.0",
        toggleable: false,
    },
    Feature {
        id: "photos",
        name: "Photos",
        version: "1.0.0",
        since: "0.3.0",
        toggleable: false,
    },
    Feature {
        id: "demo",
        name: "Demo Data",
        version: "1.0.0",
        since: "0.3.0",
        toggleable: true,
    },
];

pub fn get_features() -> &'static [Feature] {
    FEATURES
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_ids_unique() {
        let ids: HashSet<_> = get_features().iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), get_features().len());
    }

    #[test]
    fn test_app_version() {
        assert!(!get_app_version().is_empty());
    }
}
