//! Badge awarding.

use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Badge, CreateBadgeRequest},
    repository::Repository,
};

/// Badges whose threshold `completed` meets and which are not in `held` yet.
pub fn badges_to_award<'a>(
    badges: &'a [Badge],
    held: &HashSet<Uuid>,
    completed: i64,
) -> Vec<&'a Badge> {
    badges
        .iter()
        .filter(|badge| !held.contains(&badge.id) && completed >= i64::from(badge.required_count))
        .collect()
}

/// award_eligible_badges
///
/// Awards every badge the user qualifies for by completed-topic count and
/// returns the ones inserted by this call. Running it twice in a row awards
/// nothing the second time.
pub async fn award_eligible_badges(
    repo: &dyn Repository,
    user_id: Uuid,
) -> Result<Vec<Badge>, AppError> {
    let completed = repo.progress_stats(Some(user_id)).await?.completed;
    let held: HashSet<Uuid> = repo
        .user_badges(user_id)
        .await?
        .into_iter()
        .map(|earned| earned.badge.id)
        .collect();
    let badges = repo.list_badges().await?;

    let mut awarded = Vec::new();
    for badge in badges_to_award(&badges, &held, completed) {
        // The unique (user, badge) constraint makes a concurrent award a no-op.
        if repo.award_badge(user_id, badge.id).await? {
            tracing::info!(user_id = %user_id, badge = %badge.slug, "Badge awarded");
            awarded.push(badge.clone());
        }
    }
    Ok(awarded)
}

/// The badge catalog a fresh installation starts with.
pub fn default_badges() -> Vec<CreateBadgeRequest> {
    [
        ("first-step", "First Step", "İlk Adım", "Complete your first topic", "İlk konunu tamamla", "🌱", 1),
        ("getting-started", "Getting Started", "Başlangıç", "Complete 5 topics", "5 konu tamamla", "🚀", 5),
        ("dedicated-learner", "Dedicated Learner", "Azimli Öğrenci", "Complete 10 topics", "10 konu tamamla", "📚", 10),
        ("topic-master", "Topic Master", "Konu Ustası", "Complete 25 topics", "25 konu tamamla", "🏆", 25),
        ("roadmap-champion", "Roadmap Champion", "Yol Haritası Şampiyonu", "Complete 50 topics", "50 konu tamamla", "👑", 50),
    ]
    .into_iter()
    .map(|(slug, name_en, name_tr, description_en, description_tr, icon, required_count)| {
        CreateBadgeRequest {
            slug: slug.to_string(),
            name_en: name_en.to_string(),
            name_tr: name_tr.to_string(),
            description_en: Some(description_en.to_string()),
            description_tr: Some(description_tr.to_string()),
            icon: Some(icon.to_string()),
            required_count: Some(required_count),
        }
    })
    .collect()
}

/// Seeds the default badges when the catalog is empty. Returns how many were created.
pub async fn ensure_default_badges(repo: &dyn Repository) -> Result<usize, AppError> {
    if !repo.list_badges().await?.is_empty() {
        return Ok(0);
    }
    let defaults = default_badges();
    let count = defaults.len();
    for badge in defaults {
        repo.create_badge(badge).await?;
    }
    tracing::info!("Seeded {} default badges", count);
    Ok(count)
}
