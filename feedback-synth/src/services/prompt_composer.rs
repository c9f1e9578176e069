//! Prompt composition for feedback synthesis
//!
//! Entries are rendered in caller order with their weight and labels so the
//! model can reason about relative credibility. No resorting by weight.

use super::weighting::WeightedFeedback;

/// Marker rendered for an absent optional field
pub const NOT_PROVIDED: &str = "Not provided";

const ENTRY_SEPARATOR: &str = "\n---\n";

const INSTRUCTIONS: &str = "\
## Instructions
Synthesise this feedback into a summary with these sections:
1. **Strengths** - What this person does well (weight higher-confidence feedback more heavily)
2. **Growth Areas** - Where they can improve
3. **Key Examples** - Specific behaviours observed (quote or paraphrase from feedback)
4. **Suggested Focus** - 1-2 priority areas for development

Weight feedback from managers and frequent collaborators more heavily in tone and emphasis \
than occasional cross-functional contacts, but do not discard lower-weight feedback.

Keep the tone constructive and actionable. Be concise. Use markdown formatting.
";

/// Build the synthesis prompt for one subject
pub fn compose_prompt(subject_name: &str, entries: &[WeightedFeedback<'_>]) -> String {
    let feedback_text = entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR);

    format!(
        "You are summarising 360-degree feedback for an employee performance review.\n\n\
         ## Employee\n{subject_name}\n\n\
         ## Feedback Submissions\n\n{feedback_text}\n\
         {INSTRUCTIONS}"
    )
}

fn render_entry(weighted: &WeightedFeedback<'_>) -> String {
    let entry = weighted.entry;
    let additional = entry
        .additional
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NOT_PROVIDED);

    format!(
        "### Reviewer: {name} ({relationship}, works together {frequency})\n\
         **Weight**: {weight:.2} (based on relationship and collaboration frequency)\n\n\
         **Start doing**: {start}\n\n\
         **Stop doing**: {stop}\n\n\
         **Continue doing**: {cont}\n\n\
         **Example**: {example}\n\n\
         **Additional**: {additional}\n",
        name = entry.reviewer_name,
        relationship = weighted.relationship_label,
        frequency = weighted.frequency_label,
        weight = weighted.weight,
        start = entry.start_doing,
        stop = entry.stop_doing,
        cont = entry.continue_doing,
        example = entry.example,
    )
}
