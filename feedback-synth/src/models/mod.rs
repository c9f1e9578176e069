//! Data models for feedback-synth
//!
//! - Feedback entries and the reviewer categories used for weighting
//! - Summary record and its lifecycle state
//! - Subjects and reviewers for the collection workflow

pub mod feedback;
pub mod subject;
pub mod summary;

pub use feedback::{FeedbackEntry, Frequency, Relationship};
pub use subject::{ReviewRequest, Reviewer, ReviewerStatus, Subject};
pub use summary::{Summary, SummaryState};
