//! Quiz generation and scoring, gamification checks.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use vorbabuna_core::gamification::{
    self, Achievement, Challenge, UnlockedAchievements, UserStats,
};
use vorbabuna_core::quiz::{self, QuizQuestion, QuizScore};
use vorbabuna_core::store::ProverbStore;

use super::{catalog, recommend};
use crate::error::ServiceError;

pub const DEFAULT_QUIZ_SIZE: i64 = 5;
pub const MAX_QUIZ_SIZE: i64 = 10;

/// Multiple-choice questions over randomly drawn validated proverbs.
pub async fn quiz(store: &dyn ProverbStore, count: Option<i64>) -> Vec<QuizQuestion> {
    let count = count.unwrap_or(DEFAULT_QUIZ_SIZE).clamp(1, MAX_QUIZ_SIZE);
    let proverbs = recommend::random(store, count).await;
    quiz::build_quiz(&proverbs, &mut rand::thread_rng())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub proverb_id: String,
    /// The option the user picked.
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizSubmission {
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
}

/// Grade each answer against the stored meaning of its proverb. Every
/// referenced proverb must be published.
pub async fn score_quiz(
    store: &dyn ProverbStore,
    submission: QuizSubmission,
) -> Result<QuizScore, ServiceError> {
    if submission.answers.is_empty() {
        return Err(ServiceError::validation("answers are required"));
    }
    if submission.answers.len() > MAX_QUIZ_SIZE as usize {
        return Err(ServiceError::validation(format!(
            "At most {} answers per quiz",
            MAX_QUIZ_SIZE
        )));
    }

    let mut questions = Vec::with_capacity(submission.answers.len());
    let mut answers = Vec::with_capacity(submission.answers.len());
    for entry in submission.answers {
        let proverb = catalog::get_proverb(store, &entry.proverb_id).await?;
        questions.push(QuizQuestion {
            proverb_id: proverb.id,
            text: proverb.text,
            correct_meaning: proverb.meaning,
            options: Vec::new(),
        });
        answers.push(entry.answer);
    }

    let score = quiz::score(&questions, &answers);
    tracing::debug!("Quiz scored {}/{}", score.correct, score.total);
    Ok(score)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationCheck {
    #[serde(default)]
    pub stats: UserStats,
    /// Ids of achievements the user already holds.
    #[serde(default)]
    pub unlocked: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationReport {
    pub newly_unlocked: Vec<&'static Achievement>,
    pub unlocked: Vec<String>,
    pub total_points: u32,
    pub level: u32,
    pub xp_for_next_level: u64,
    /// Streak after accounting for `lastVisit`; the client stores it back.
    pub streak_days: u32,
    pub challenge: Challenge,
}

/// Streak as of `today`: a last visit today or yesterday keeps the reported
/// streak (at least 1), an older one resets it. Without a last visit the
/// reported value stands.
pub fn current_streak(stats: &UserStats, today: NaiveDate) -> u32 {
    match stats.last_visit {
        Some(last) if gamification::calculate_streak(last, today) == 0 => 0,
        Some(_) => stats.streak_days.max(1),
        None => stats.streak_days,
    }
}

/// Evaluate achievements for a user snapshot at local time `now`.
pub fn check(req: GamificationCheck, now: NaiveDateTime) -> GamificationReport {
    let mut stats = req.stats;
    stats.streak_days = current_streak(&stats, now.date());

    let mut unlocked = UnlockedAchievements::from_ids(req.unlocked.iter().map(String::as_str), now);
    let newly_unlocked = gamification::check_achievements(&stats, &mut unlocked, now);
    let level = gamification::calculate_level(stats.xp);

    let mut challenge = daily_challenge(now);
    gamification::update_challenge(&mut challenge, &stats);

    if !newly_unlocked.is_empty() {
        tracing::debug!("Unlocked {} achievements", newly_unlocked.len());
    }

    GamificationReport {
        newly_unlocked,
        unlocked: unlocked.ids().map(str::to_string).collect(),
        total_points: unlocked.points(),
        level,
        xp_for_next_level: gamification::xp_for_next_level(level),
        streak_days: stats.streak_days,
        challenge,
    }
}

pub fn daily_challenge(now: NaiveDateTime) -> Challenge {
    gamification::generate_daily_challenge(&mut rand::thread_rng(), now)
}
