//! Summary generation pipeline
//!
//! weigh → compose prompt → external completion → deterministic rationale.
//! The rationale is computed locally, never generated.

use std::sync::Arc;

use crate::config::GenerationSettings;
use crate::error::SummaryError;
use crate::models::FeedbackEntry;

use super::prompt_composer::compose_prompt;
use super::text_generator::{GenerationRequest, TextGenerator};
use super::weighting::{weigh_all, WeightedFeedback};

/// Fewer independent sources than this cannot be weighted meaningfully
pub const MIN_FEEDBACK_ENTRIES: usize = 2;

/// Narrative plus the explanation of how it was weighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSummary {
    pub content: String,
    pub weighting_explanation: String,
}

#[derive(Clone)]
pub struct SummaryGenerator {
    text_generator: Arc<dyn TextGenerator>,
    settings: GenerationSettings,
}

impl SummaryGenerator {
    pub fn new(text_generator: Arc<dyn TextGenerator>, settings: GenerationSettings) -> Self {
        Self {
            text_generator,
            settings,
        }
    }

    /// Synthesize a summary for `subject_name` from `entries` (caller order).
    ///
    /// Fails with [`SummaryError::InsufficientInput`] before any external call
    /// when fewer than [`MIN_FEEDBACK_ENTRIES`] are supplied. Service errors
    /// are returned as-is.
    pub async fn generate(
        &self,
        subject_name: &str,
        entries: &[FeedbackEntry],
    ) -> Result<GeneratedSummary, SummaryError> {
        if entries.len() < MIN_FEEDBACK_ENTRIES {
            return Err(SummaryError::InsufficientInput {
                found: entries.len(),
            });
        }

        let weighted = weigh_all(entries);
        let request = GenerationRequest {
            prompt: compose_prompt(subject_name, &weighted),
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
        };

        let content = self.text_generator.generate(&request).await?;

        // Non-empty by the length check above
        let weighting_explanation = weighting_rationale(&weighted).unwrap_or_default();

        tracing::info!(
            subject = %subject_name,
            entries = entries.len(),
            content_chars = content.len(),
            "Generated summary"
        );

        Ok(GeneratedSummary {
            content,
            weighting_explanation,
        })
    }
}

/// Highest-weight entry; the first one encountered wins a tie
pub fn dominant_entry<'a, 'b>(
    weighted: &'b [WeightedFeedback<'a>],
) -> Option<&'b WeightedFeedback<'a>> {
    weighted.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.weight <= current.weight => Some(current),
        _ => Some(candidate),
    })
}

/// Sentence naming the entry that influenced the summary most
pub fn weighting_rationale(weighted: &[WeightedFeedback<'_>]) -> Option<String> {
    let dominant = dominant_entry(weighted)?;
    Some(format!(
        "This summary weights feedback based on reviewer relationship \
         (manager feedback weighted highest) and collaboration frequency \
         (weekly interactions weighted highest). {}'s feedback as a {} with \
         {} interaction carried the most weight.",
        dominant.entry.reviewer_name,
        dominant.relationship_label.to_lowercase(),
        dominant.frequency_label,
    ))
}
