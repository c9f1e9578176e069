//! Demo data for a fresh database

use feedback_common::Result;
use sqlx::SqlitePool;

use crate::models::{Frequency, Relationship};

use super::reviews::{insert_review, NewReview};
use super::subjects::{create_reviewer_with_token, create_subject, subject_count};

struct DemoReviewer {
    name: &'static str,
    email: &'static str,
    relationship: Relationship,
    frequency: Frequency,
    token: &'static str,
    review: Option<[&'static str; 5]>,
}

fn demo_reviewers() -> Vec<DemoReviewer> {
    vec![
        DemoReviewer {
            name: "Sam Taylor",
            email: "sam@demo.360feedback",
            relationship: Relationship::Manager,
            frequency: Frequency::Weekly,
            token: "demo-sam-token-abc123",
            review: Some([
                "Delegate more complex technical decisions to senior engineers",
                "Stop micromanaging code review comments on minor style issues",
                "Continue providing clear context on business requirements during sprint planning",
                "During last quarter's API redesign, Alex spent significant time reviewing every PR line-by-line. While thorough, this created bottlenecks.",
                "Alex has grown significantly in communication skills this year.",
            ]),
        },
        DemoReviewer {
            name: "Jordan Lee",
            email: "jordan@demo.360feedback",
            relationship: Relationship::Peer,
            frequency: Frequency::Weekly,
            token: "demo-jordan-token-def456",
            review: Some([
                "Start facilitating more cross-team knowledge sharing sessions",
                "Stop taking on too many parallel workstreams - focus improves quality",
                "Continue being the go-to person for debugging complex production issues",
                "When we had the database outage in October, Alex was instrumental in identifying the root cause within 30 minutes.",
                "",
            ]),
        },
        DemoReviewer {
            name: "Casey Morgan",
            email: "casey@demo.360feedback",
            relationship: Relationship::DirectReport,
            frequency: Frequency::Monthly,
            token: "demo-casey-token-ghi789",
            review: Some([
                "Start providing more regular 1:1 feedback rather than saving it for reviews",
                "Stop context-switching between projects mid-sprint",
                "Continue the mentorship approach - the pairing sessions have been invaluable",
                "Alex paired with me for two weeks on the authentication refactor. I learned more in those sessions than in months of solo work.",
                "Really appreciate the psychological safety Alex creates in our team.",
            ]),
        },
        DemoReviewer {
            name: "Riley Kumar",
            email: "riley@demo.360feedback",
            relationship: Relationship::CrossFunctional,
            frequency: Frequency::Rarely,
            token: "demo-riley-token-jkl012",
            review: None,
        },
    ]
}

/// Seed one subject with four reviewers, three of whom have submitted.
///
/// Skipped when any subject already exists. Returns the new subject id.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<Option<i64>> {
    if subject_count(pool).await? > 0 {
        tracing::info!("Database already has subjects, skipping demo seed");
        return Ok(None);
    }

    let subject = create_subject(pool, "Alex Chen", "alex@demo.360feedback").await?;

    for demo in demo_reviewers() {
        let reviewer = create_reviewer_with_token(
            pool,
            subject.id,
            demo.name,
            demo.email,
            &demo.relationship,
            &demo.frequency,
            demo.token,
        )
        .await?;

        if let Some([start, stop, cont, example, additional]) = demo.review {
            let review = NewReview {
                start_doing: start.to_string(),
                stop_doing: stop.to_string(),
                continue_doing: cont.to_string(),
                example: example.to_string(),
                additional: Some(additional.to_string()),
            };
            insert_review(pool, reviewer.id, &review).await?;
        }
    }

    tracing::info!(subject_id = subject.id, "Seeded demo data");
    Ok(Some(subject.id))
}
