//! Credibility weighting for feedback entries
//!
//! weight = round(relationship_factor × frequency_factor, 2). Unknown
//! categories contribute [`FALLBACK_FACTOR`] instead of failing. Weights are
//! derived on every aggregation pass and never stored.

use crate::models::{FeedbackEntry, Frequency, Relationship};

/// Factor used for any category outside the tables
pub const FALLBACK_FACTOR: f64 = 0.5;

pub fn relationship_factor(relationship: &Relationship) -> f64 {
    match relationship {
        Relationship::Manager => 1.0,
        Relationship::Peer => 0.8,
        Relationship::DirectReport => 0.7,
        Relationship::CrossFunctional => 0.6,
        Relationship::Unrecognised(_) => FALLBACK_FACTOR,
    }
}

pub fn frequency_factor(frequency: &Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => 1.0,
        Frequency::Monthly => 0.7,
        Frequency::Rarely => 0.4,
        Frequency::Unrecognised(_) => FALLBACK_FACTOR,
    }
}

/// Combined weight in [0, 1], rounded to two decimals
pub fn weight(relationship: &Relationship, frequency: &Frequency) -> f64 {
    round2(relationship_factor(relationship) * frequency_factor(frequency))
}

/// Weight computed straight from stored category strings
pub fn weight_for(relationship: &str, frequency: &str) -> f64 {
    weight(&Relationship::parse(relationship), &Frequency::parse(frequency))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A feedback entry paired with its derived weight and display labels
#[derive(Debug, Clone, Copy)]
pub struct WeightedFeedback<'a> {
    pub entry: &'a FeedbackEntry,
    pub weight: f64,
    pub relationship_label: &'a str,
    pub frequency_label: &'a str,
}

/// Weigh entries, preserving input order
pub fn weigh_all(entries: &[FeedbackEntry]) -> Vec<WeightedFeedback<'_>> {
    entries
        .iter()
        .map(|entry| WeightedFeedback {
            entry,
            weight: weight(&entry.relationship, &entry.frequency),
            relationship_label: entry.relationship.label(),
            frequency_label: entry.frequency.label(),
        })
        .collect()
}
