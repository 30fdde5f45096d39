// Core layer - shared types and configuration
pub mod core;

// Features layer - expiry, notifications, settings and friends
pub mod features;

// Persistence
pub mod database;

pub use core::Config;
pub use database::{Database, TrackedDocument};

pub use features::{
    // Dashboard
    DashboardSummary,
    // Demo
    load_demo_data,
    // Expiry
    classify, ExpiryStatus, UrgencyTier,
    // Notifications
    CheckReport, LogSink, NotificationScheduler, NotificationSink,
    // Photos
    PhotoStore,
    // Settings
    AppSettings, IntegrationStatus,
};
