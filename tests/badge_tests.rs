mod common;

use common::{seed_catalog, seed_learner, seed_topics, test_state};
use ml_roadmap::{
    badges::{award_eligible_badges, badges_to_award, default_badges, ensure_default_badges},
    models::{Badge, ProgressStatus},
};
use std::collections::HashSet;
use uuid::Uuid;

fn badge(slug: &str, required_count: i32) -> Badge {
    Badge {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        required_count,
        ..Badge::default()
    }
}

#[test]
fn test_badges_to_award_respects_threshold_and_holdings() {
    let badges = vec![badge("one", 1), badge("five", 5), badge("ten", 10)];
    let held: HashSet<Uuid> = [badges[0].id].into_iter().collect();

    let awarded: Vec<&str> = badges_to_award(&badges, &held, 5)
        .into_iter()
        .map(|b| b.slug.as_str())
        .collect();

    assert_eq!(awarded, vec!["five"]);
    assert!(badges_to_award(&badges, &HashSet::new(), 0).is_empty());
}

#[test]
fn test_default_badge_thresholds() {
    let defaults = default_badges();
    let thresholds: Vec<(String, Option<i32>)> = defaults
        .iter()
        .map(|b| (b.slug.clone(), b.required_count))
        .collect();

    assert_eq!(
        thresholds,
        vec![
            ("first-step".to_string(), Some(1)),
            ("getting-started".to_string(), Some(5)),
            ("dedicated-learner".to_string(), Some(10)),
            ("topic-master".to_string(), Some(25)),
            ("roadmap-champion".to_string(), Some(50)),
        ]
    );
    assert!(defaults.iter().all(|b| b.validate().is_ok()));
}

#[tokio::test]
async fn test_default_badges_are_seeded_once() {
    let state = test_state();
    let repo = state.repo.as_ref();

    assert_eq!(ensure_default_badges(repo).await.unwrap(), 5);
    assert_eq!(ensure_default_badges(repo).await.unwrap(), 0);
    assert_eq!(repo.list_badges().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_awarding_is_idempotent() {
    let state = test_state();
    let repo = state.repo.as_ref();
    ensure_default_badges(repo).await.unwrap();
    let catalog = seed_catalog(repo).await;
    let learner = seed_learner(repo, "learner@test.com").await;

    assert!(award_eligible_badges(repo, learner.id).await.unwrap().is_empty());

    repo.upsert_progress(learner.id, catalog.topic.id, ProgressStatus::Completed)
        .await
        .unwrap();

    let first = award_eligible_badges(repo, learner.id).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].slug, "first-step");

    let second = award_eligible_badges(repo, learner.id).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(repo.user_badges(learner.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_multiple_thresholds_unlock_together() {
    let state = test_state();
    let repo = state.repo.as_ref();
    ensure_default_badges(repo).await.unwrap();
    let catalog = seed_catalog(repo).await;
    let learner = seed_learner(repo, "learner@test.com").await;

    for topic in seed_topics(repo, catalog.phase.id, 5).await {
        repo.upsert_progress(learner.id, topic.id, ProgressStatus::Completed)
            .await
            .unwrap();
    }

    let mut slugs: Vec<String> = award_eligible_badges(repo, learner.id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.slug)
        .collect();
    slugs.sort();

    assert_eq!(slugs, vec!["first-step", "getting-started"]);
}

#[tokio::test]
async fn test_in_progress_topics_do_not_count() {
    let state = test_state();
    let repo = state.repo.as_ref();
    ensure_default_badges(repo).await.unwrap();
    let catalog = seed_catalog(repo).await;
    let learner = seed_learner(repo, "learner@test.com").await;

    repo.upsert_progress(learner.id, catalog.topic.id, ProgressStatus::InProgress)
        .await
        .unwrap();

    assert!(award_eligible_badges(repo, learner.id).await.unwrap().is_empty());
}
