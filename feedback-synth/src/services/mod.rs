//! Service modules for summary synthesis
//!
//! Weighting and prompt composition are pure; [`SummaryGenerator`] adds the
//! external completion call; [`SummaryLifecycle`] owns the stored summary
//! state machine; [`RegenerationTrigger`] runs it in the background after
//! new feedback arrives.

pub mod anthropic_client;
pub mod prompt_composer;
pub mod regeneration_trigger;
pub mod summary_generator;
pub mod summary_lifecycle;
pub mod text_generator;
pub mod weighting;

pub use anthropic_client::AnthropicClient;
pub use regeneration_trigger::{RegenerationTrigger, TriggerOutcome};
pub use summary_generator::{GeneratedSummary, SummaryGenerator, MIN_FEEDBACK_ENTRIES};
pub use summary_lifecycle::{SubjectGuard, SubjectLocks, SummaryLifecycle};
pub use text_generator::{GenerationError, GenerationRequest, TextGenerator};
pub use weighting::{weigh_all, weight, WeightedFeedback};
