//! Summary lifecycle integration tests
//!
//! Absent → Draft → Finalised transitions against an in-memory database
//! with a scripted generator.

mod helpers;

use std::time::Duration;

use feedback_synth::models::SummaryState;
use feedback_synth::services::GenerationError;
use feedback_synth::SummaryError;
use helpers::{add_feedback, add_subject, setup, setup_with, summary_fingerprint, ScriptedGenerator};

#[tokio::test]
async fn test_create_requires_two_entries() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;

    let err = ctx.lifecycle.create(subject).await.unwrap_err();

    assert!(matches!(err, SummaryError::InsufficientInput { found: 1 }));
    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Absent);
    assert_eq!(ctx.generator.calls(), 0, "No external call below the threshold");
}

#[tokio::test]
async fn test_create_persists_draft_with_rationale() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "monthly").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;

    let summary = ctx.lifecycle.create(subject).await.unwrap();

    assert_eq!(summary.content, "Generated summary 1");
    assert!(!summary.finalised);
    assert!(summary.finalised_at.is_none());
    assert!(summary
        .weighting_explanation
        .contains("Sam's feedback as a manager with weekly interaction carried the most weight."));
    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Draft);

    let prompt = &ctx.generator.prompts()[0];
    assert!(prompt.contains("## Employee\nAlex Chen"));
    assert!(prompt.find("Jordan").unwrap() < prompt.find("Sam").unwrap());
}

#[tokio::test]
async fn test_create_on_unknown_subject() {
    let ctx = setup().await;

    let err = ctx.lifecycle.create(404).await.unwrap_err();

    assert!(matches!(err, SummaryError::SubjectNotFound(404)));
}

#[tokio::test]
async fn test_create_twice_rejected_but_regenerate_replaces() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;

    ctx.lifecycle.create(subject).await.unwrap();
    let err = ctx.lifecycle.create(subject).await.unwrap_err();
    assert!(matches!(err, SummaryError::AlreadyExists(_)));

    let regenerated = ctx.lifecycle.regenerate(subject).await.unwrap();
    assert_eq!(regenerated.content, "Generated summary 2");
    assert_eq!(
        ctx.lifecycle.get(subject).await.unwrap().unwrap().content,
        "Generated summary 2"
    );
}

#[tokio::test]
async fn test_generation_failure_leaves_no_record() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    ctx.generator.push_reply(Err(GenerationError::Timeout));

    let err = ctx.lifecycle.create(subject).await.unwrap_err();

    assert!(matches!(err, SummaryError::Generation(GenerationError::Timeout)));
    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Absent);
}

#[tokio::test]
async fn test_failed_regenerate_keeps_previous_draft() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    ctx.lifecycle.create(subject).await.unwrap();
    let before = summary_fingerprint(&ctx.pool, subject).await;

    ctx.generator.push_reply(Err(GenerationError::RateLimited {
        message: "slow down".to_string(),
        retry_after_secs: Some(10),
    }));
    let err = ctx.lifecycle.regenerate(subject).await.unwrap_err();

    assert!(matches!(
        err,
        SummaryError::Generation(GenerationError::RateLimited { .. })
    ));
    assert_eq!(summary_fingerprint(&ctx.pool, subject).await, before);
}

#[tokio::test]
async fn test_regenerate_on_absent_creates() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;

    ctx.lifecycle.regenerate(subject).await.unwrap();

    assert_eq!(ctx.lifecycle.state(subject).await.unwrap(), SummaryState::Draft);
}

#[tokio::test]
async fn test_edit_replaces_content_only() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    let created = ctx.lifecycle.create(subject).await.unwrap();

    let edited = ctx
        .lifecycle
        .edit(subject, "manually adjusted text")
        .await
        .unwrap();

    assert_eq!(edited.content, "manually adjusted text");
    assert_eq!(edited.weighting_explanation, created.weighting_explanation);
    assert!(!edited.finalised);
    assert!(edited.updated_at >= created.updated_at);
    assert_eq!(ctx.generator.calls(), 1, "Edit bypasses the generator");
}

#[tokio::test]
async fn test_edit_and_finalise_on_absent() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;

    assert!(matches!(
        ctx.lifecycle.edit(subject, "text").await.unwrap_err(),
        SummaryError::NotFound(_)
    ));
    assert!(matches!(
        ctx.lifecycle.finalise(subject).await.unwrap_err(),
        SummaryError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_finalised_summary_is_locked() {
    let ctx = setup().await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;
    ctx.lifecycle.create(subject).await.unwrap();

    let finalised = ctx.lifecycle.finalise(subject).await.unwrap();
    assert!(finalised.finalised);
    assert!(finalised.finalised_at.is_some());
    let locked = summary_fingerprint(&ctx.pool, subject).await;

    assert!(matches!(
        ctx.lifecycle.edit(subject, "late change").await.unwrap_err(),
        SummaryError::Finalised(_)
    ));
    assert!(matches!(
        ctx.lifecycle.regenerate(subject).await.unwrap_err(),
        SummaryError::Finalised(_)
    ));
    assert!(matches!(
        ctx.lifecycle.finalise(subject).await.unwrap_err(),
        SummaryError::AlreadyFinalised(_)
    ));

    assert_eq!(summary_fingerprint(&ctx.pool, subject).await, locked);
    assert_eq!(ctx.generator.calls(), 1, "Regenerate on a locked summary never generates");
}

#[tokio::test]
async fn test_finalise_waits_for_in_flight_regeneration() {
    let generator = ScriptedGenerator::gated();
    let ctx = setup_with(generator.clone()).await;
    let subject = add_subject(&ctx.pool, "Alex Chen").await;
    add_feedback(&ctx.pool, subject, "Sam", "manager", "weekly").await;
    add_feedback(&ctx.pool, subject, "Jordan", "peer", "weekly").await;

    let regenerate = {
        let lifecycle = ctx.lifecycle.clone();
        tokio::spawn(async move { lifecycle.regenerate(subject).await })
    };
    generator.entered().await;

    let finalise = {
        let lifecycle = ctx.lifecycle.clone();
        tokio::spawn(async move { lifecycle.finalise(subject).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!finalise.is_finished(), "Finalise must queue behind regeneration");

    generator.release();
    regenerate.await.unwrap().unwrap();
    let finalised = finalise.await.unwrap().unwrap();

    assert!(finalised.finalised);
    assert_eq!(finalised.content, "Generated summary 1");
}
