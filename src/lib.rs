// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;

// Cross-provider outcome model
pub mod delivery;

// Provider taxonomies
pub mod adm;
pub mod apns;
pub mod fcm;
pub mod webpush;

// Supporting modules
pub mod report;
pub mod telemetry;
