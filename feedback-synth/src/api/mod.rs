//! HTTP API handlers for feedback-synth

pub mod health;
pub mod inbox;
pub mod review;
pub mod subjects;
pub mod summary;

pub use health::health_routes;
pub use inbox::inbox_routes;
pub use review::review_routes;
pub use subjects::subject_routes;
pub use summary::summary_routes;
