//! Regeneration trigger integration tests
//!
//! The trigger runs the regenerate pipeline only with enough feedback and
//! an unlocked summary, and swallows every failure.

mod helpers;

use feedback_synth::db::summaries::insert_summary;
use feedback_synth::models::SummaryState;
use feedback_synth::services::{GenerationError, TriggerOutcome};
use helpers::{add_feedback, add_subject, setup, summary_fingerprint};

#[tokio::test]
async fn test_single_entry_is_a_no_op() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;

    let outcome = ctx.trigger.run(subject).await;

    assert_eq!(outcome, TriggerOutcome::SkippedInsufficientFeedback { count: 1 });
    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Absent);
    assert_eq!(ctx.generator.calls(), 0);
}

#[tokio::test]
async fn test_single_entry_leaves_existing_draft_alone() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    insert_summary(&ctx.pool, subject, "Hand-written draft", "Seeded directly")
        .await
        .unwrap();
    let before = summary_fingerprint(&ctx.pool, subject).await;
    assert!(before.is_some());

    let outcome = ctx.trigger.run(subject).await;

    assert_eq!(outcome, TriggerOutcome::SkippedInsufficientFeedback { count: 1 });
    assert_eq!(summary_fingerprint(&ctx.pool, subject).await, before);
    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Draft);
    assert_eq!(ctx.generator.calls(), 0);
}

#[tokio::test]
async fn test_finalised_summary_untouched() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    ctx.lifecycle.create(subject).await.unwrap();
    ctx.lifecycle.finalise(subject).await.unwrap();
    let before = summary_fingerprint(&ctx.pool, subject).await;

    add_feedback(&ctx.pool, subject, "Casey", "direct_report", "monthly").await;
    let outcome = ctx.trigger.run(subject).await;

    assert_eq!(outcome, TriggerOutcome::SkippedFinalised);
    assert_eq!(summary_fingerprint(&ctx.pool, subject).await, before);
    assert_eq!(ctx.generator.calls(), 1);
}

#[tokio::test]
async fn test_second_entry_creates_draft_weighted_toward_manager() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;

    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    assert_eq!(
        ctx.trigger.run(subject).await,
        TriggerOutcome::SkippedInsufficientFeedback { count: 1 }
    );

    add_feedback(&ctx.pool, subject, "Jordan", "peer", "monthly").await;
    assert_eq!(ctx.trigger.run(subject).await, TriggerOutcome::Regenerated);

    let summary = ctx.lifecycle.get(subject).await.unwrap().unwrap();
    assert_eq!(summary.state(), SummaryState::Draft);
    assert!(summary
        .weighting_explanation
        .contains("Sam's feedback as a manager with weekly interaction carried the most weight."));

    let prompt = &ctx.generator.prompts()[0];
    assert!(prompt.contains("**Weight**: 1.00"));
    assert!(prompt.contains("**Weight**: 0.56"));
}

#[tokio::test]
async fn test_trigger_replaces_existing_draft() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    ctx.lifecycle.create(subject).await.unwrap();

    add_feedback(&ctx.pool, subject, "Casey", "direct_report", "monthly").await;
    let outcome = ctx.trigger.fire(subject).await.unwrap();

    assert_eq!(outcome, TriggerOutcome::Regenerated);
    let summary = ctx.lifecycle.get(subject).await.unwrap().unwrap();
    assert_eq!(summary.content, "Generated summary 2");
    assert!(ctx.generator.prompts()[1].contains("Casey"));
}

#[tokio::test]
async fn test_generator_failure_is_swallowed() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    ctx.generator
        .push_reply(Err(GenerationError::Transport("connection reset".to_string())));

    let outcome = ctx.trigger.fire(subject).await.unwrap();

    assert!(matches!(outcome, TriggerOutcome::Failed(ref msg) if msg.contains("connection reset")));
    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Absent);
}

#[tokio::test]
async fn test_storage_failure_is_swallowed() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    ctx.pool.close().await;

    let outcome = ctx.trigger.run(subject).await;

    assert!(matches!(outcome, TriggerOutcome::Failed(_)));
    assert_eq!(ctx.generator.calls(), 0);
}
