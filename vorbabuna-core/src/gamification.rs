//! Achievements, levels, daily challenges and learning paths.
//!
//! Everything here is a pure function of its inputs. The achievement catalog
//! is immutable; which achievements a user already holds travels with the
//! caller as an [`UnlockedAchievements`] set.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_views: u64,
    pub total_shares: u64,
    pub total_favorites: u64,
    pub streak_days: u32,
    pub last_visit: Option<NaiveDate>,
    pub categories_explored: BTreeSet<String>,
    pub regions_explored: BTreeSet<String>,
    pub quiz_score: u32,
    pub quiz_attempts: u32,
    pub level: u32,
    pub xp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// `now` is the user's local wall-clock time.
pub type Condition = fn(&UserStats, NaiveDateTime) -> bool;

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points: u32,
    pub tier: Tier,
    #[serde(skip)]
    pub condition: Condition,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement")
            .field("id", &self.id)
            .field("points", &self.points)
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

pub static ACHIEVEMENTS: [Achievement; 16] = [
    Achievement {
        id: "first_view",
        name: "Prima Descoperire",
        description: "Vezi primul proverb",
        icon: "👀",
        points: 10,
        tier: Tier::Bronze,
        condition: |s, _| s.total_views >= 1,
    },
    Achievement {
        id: "explorer",
        name: "Explorator",
        description: "Vezi 50 de proverbe",
        icon: "🧭",
        points: 50,
        tier: Tier::Bronze,
        condition: |s, _| s.total_views >= 50,
    },
    Achievement {
        id: "scholar",
        name: "Înțelept",
        description: "Vezi 200 de proverbe",
        icon: "📚",
        points: 100,
        tier: Tier::Silver,
        condition: |s, _| s.total_views >= 200,
    },
    Achievement {
        id: "master",
        name: "Maestru",
        description: "Vezi 500 de proverbe",
        icon: "🏆",
        points: 250,
        tier: Tier::Gold,
        condition: |s, _| s.total_views >= 500,
    },
    Achievement {
        id: "legend",
        name: "Legendă",
        description: "Vezi 1000 de proverbe",
        icon: "⭐",
        points: 500,
        tier: Tier::Platinum,
        condition: |s, _| s.total_views >= 1000,
    },
    Achievement {
        id: "social_butterfly",
        name: "Fluture Social",
        description: "Distribuie 10 proverbe",
        icon: "🦋",
        points: 30,
        tier: Tier::Bronze,
        condition: |s, _| s.total_shares >= 10,
    },
    Achievement {
        id: "influencer",
        name: "Influențator",
        description: "Distribuie 50 de proverbe",
        icon: "📱",
        points: 100,
        tier: Tier::Gold,
        condition: |s, _| s.total_shares >= 50,
    },
    Achievement {
        id: "collector",
        name: "Colecționar",
        description: "Adaugă 20 de proverbe la favorite",
        icon: "❤️",
        points: 40,
        tier: Tier::Bronze,
        condition: |s, _| s.total_favorites >= 20,
    },
    Achievement {
        id: "curator",
        name: "Curator",
        description: "Adaugă 50 de proverbe la favorite",
        icon: "💫",
        points: 100,
        tier: Tier::Silver,
        condition: |s, _| s.total_favorites >= 50,
    },
    Achievement {
        id: "week_streak",
        name: "Săptămâna Dedicată",
        description: "Vizitează 7 zile la rând",
        icon: "🔥",
        points: 70,
        tier: Tier::Silver,
        condition: |s, _| s.streak_days >= 7,
    },
    Achievement {
        id: "month_streak",
        name: "Luna Perfecției",
        description: "Vizitează 30 de zile la rând",
        icon: "🌟",
        points: 300,
        tier: Tier::Gold,
        condition: |s, _| s.streak_days >= 30,
    },
    Achievement {
        id: "category_master",
        name: "Maestru al Categoriilor",
        description: "Explorează toate cele 12 categorii",
        icon: "🎯",
        points: 120,
        tier: Tier::Gold,
        condition: |s, _| s.categories_explored.len() >= 12,
    },
    Achievement {
        id: "region_explorer",
        name: "Călător Regional",
        description: "Vizitează proverbe din toate cele 8 regiuni",
        icon: "🗺️",
        points: 150,
        tier: Tier::Gold,
        condition: |s, _| s.regions_explored.len() >= 8,
    },
    Achievement {
        id: "quiz_champion",
        name: "Campion Quiz",
        description: "Obține scor perfect la quiz",
        icon: "🧠",
        points: 100,
        tier: Tier::Silver,
        condition: |s, _| s.quiz_score >= 100,
    },
    Achievement {
        id: "early_bird",
        name: "Ciocârlie de Dimineață",
        description: "Vizitează înainte de ora 7:00",
        icon: "🌅",
        points: 25,
        tier: Tier::Bronze,
        condition: |_, now| now.hour() < 7,
    },
    Achievement {
        id: "night_owl",
        name: "Bufniță de Noapte",
        description: "Vizitează după miezul nopții",
        icon: "🌙",
        points: 25,
        tier: Tier::Bronze,
        condition: |_, now| now.hour() < 5,
    },
];

pub fn achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievement ids a single user holds, with the time each was earned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnlockedAchievements(BTreeMap<String, NaiveDateTime>);

impl UnlockedAchievements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `ids` as earned at `at`. Unknown ids are ignored.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>, at: NaiveDateTime) -> Self {
        let mut unlocked = Self::new();
        for id in ids {
            if achievement(id).is_some() {
                unlocked.0.entry(id.to_string()).or_insert(at);
            }
        }
        unlocked
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Sum of points over every held achievement.
    pub fn points(&self) -> u32 {
        self.ids().filter_map(achievement).map(|a| a.points).sum()
    }
}

/// Evaluate every achievement the user does not hold yet. Newly satisfied ones
/// are recorded in `unlocked` with `now` and returned in catalog order.
pub fn check_achievements(
    stats: &UserStats,
    unlocked: &mut UnlockedAchievements,
    now: NaiveDateTime,
) -> Vec<&'static Achievement> {
    let mut fresh = Vec::new();
    for achievement in ACHIEVEMENTS.iter() {
        if unlocked.contains(achievement.id) {
            continue;
        }
        if (achievement.condition)(stats, now) {
            unlocked.0.insert(achievement.id.to_string(), now);
            fresh.push(achievement);
        }
    }
    fresh
}

/// `floor(sqrt(xp / 100)) + 1`
pub fn calculate_level(xp: u64) -> u32 {
    ((xp as f64 / 100.0).sqrt().floor() as u32).saturating_add(1)
}

pub fn xp_for_next_level(level: u32) -> u64 {
    u64::from(level) * u64::from(level) * 100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Views,
    Favorites,
    Shares,
    QuizScore,
    Categories,
}

impl ChallengeKind {
    fn metric(self, stats: &UserStats) -> u64 {
        match self {
            Self::Views => stats.total_views,
            Self::Favorites => stats.total_favorites,
            Self::Shares => stats.total_shares,
            Self::QuizScore => u64::from(stats.quiz_score),
            Self::Categories => stats.categories_explored.len() as u64,
        }
    }
}

struct ChallengeTemplate {
    kind: ChallengeKind,
    title: &'static str,
    description: &'static str,
    target: u64,
    reward: u32,
}

const DAILY_CHALLENGES: [ChallengeTemplate; 5] = [
    ChallengeTemplate {
        kind: ChallengeKind::Views,
        title: "Explorator Zilnic",
        description: "Vezi 10 proverbe noi astăzi",
        target: 10,
        reward: 50,
    },
    ChallengeTemplate {
        kind: ChallengeKind::Favorites,
        title: "Culegător de Înțelepciune",
        description: "Adaugă 5 proverbe la favorite",
        target: 5,
        reward: 40,
    },
    ChallengeTemplate {
        kind: ChallengeKind::Shares,
        title: "Ambasador",
        description: "Distribuie 3 proverbe",
        target: 3,
        reward: 35,
    },
    ChallengeTemplate {
        kind: ChallengeKind::QuizScore,
        title: "Maestru Quiz",
        description: "Încearcă quiz-ul și obține peste 80%",
        target: 80,
        reward: 60,
    },
    ChallengeTemplate {
        kind: ChallengeKind::Categories,
        title: "Cercetător",
        description: "Explorează 3 categorii diferite",
        target: 3,
        reward: 45,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub kind: ChallengeKind,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub challenge_type: String,
    pub target: u64,
    pub current: u64,
    pub reward: u32,
    pub expires_at: NaiveDateTime,
    pub completed: bool,
}

/// One of the daily templates, expiring at the next local midnight after `now`.
pub fn generate_daily_challenge<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> Challenge {
    let template = &DAILY_CHALLENGES[rng.gen_range(0..DAILY_CHALLENGES.len())];
    let expires_at = (now.date() + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap_or(now);

    Challenge {
        id: format!(
            "daily_{:04}{:02}{:02}_{:?}",
            now.year(),
            now.month(),
            now.day(),
            template.kind
        )
        .to_lowercase(),
        kind: template.kind,
        title: template.title.to_string(),
        description: template.description.to_string(),
        challenge_type: "daily".to_string(),
        target: template.target,
        current: 0,
        reward: template.reward,
        expires_at,
        completed: false,
    }
}

/// Copy the tracked metric into `current`; a challenge stays completed once reached.
pub fn update_challenge(challenge: &mut Challenge, stats: &UserStats) {
    challenge.current = challenge.kind.metric(stats);
    if challenge.current >= challenge.target {
        challenge.completed = true;
    }
}

/// Streak contribution of the last visit: 1 when it was today or yesterday,
/// otherwise 0. Known limitation: this never yields a multi-day count.
pub fn calculate_streak(last_visit: NaiveDate, today: NaiveDate) -> u32 {
    if (today - last_visit).num_days() <= 1 {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    pub name: String,
    pub level: PathLevel,
    pub proverbs: Vec<uuid::Uuid>,
    pub completed: u32,
    pub total: u32,
    pub xp_reward: u32,
}

pub fn learning_paths() -> Vec<LearningPath> {
    [
        ("beginner", "Începător - Proverbe Simple", PathLevel::Beginner, 20, 100),
        ("intermediate", "Intermediar - Înțelepciune Clasică", PathLevel::Intermediate, 30, 200),
        ("advanced", "Avansat - Filosofie Profundă", PathLevel::Advanced, 50, 500),
    ]
    .into_iter()
    .map(|(id, name, level, total, xp_reward)| LearningPath {
        id: id.to_string(),
        name: name.to_string(),
        level,
        proverbs: Vec::new(),
        completed: 0,
        total,
        xp_reward,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: BTreeSet<_> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
        assert_eq!(ACHIEVEMENTS.len(), 16);
    }

    #[test]
    fn test_first_view_unlocks_once() {
        let stats = UserStats {
            total_views: 1,
            ..UserStats::default()
        };
        let mut unlocked = UnlockedAchievements::new();

        let fresh = check_achievements(&stats, &mut unlocked, at(12));
        assert_eq!(fresh.iter().map(|a| a.id).collect::<Vec<_>>(), vec!["first_view"]);
        assert!(unlocked.contains("first_view"));

        let again = check_achievements(&stats, &mut unlocked, at(13));
        assert!(again.is_empty());
        assert_eq!(unlocked.len(), 1);
    }

    #[test]
    fn test_unlocked_sets_are_per_user() {
        let stats = UserStats {
            total_views: 60,
            ..UserStats::default()
        };
        let mut alice = UnlockedAchievements::new();
        let mut bob = UnlockedAchievements::from_ids(["first_view", "not_real"], at(9));
        assert_eq!(bob.len(), 1);

        let for_alice = check_achievements(&stats, &mut alice, at(12));
        let for_bob = check_achievements(&stats, &mut bob, at(12));
        assert_eq!(for_alice.len(), 2);
        assert_eq!(for_bob.iter().map(|a| a.id).collect::<Vec<_>>(), vec!["explorer"]);
        assert_eq!(alice.points(), 60);
    }

    #[test]
    fn test_time_of_day_achievements() {
        let stats = UserStats::default();
        let mut unlocked = UnlockedAchievements::new();
        let fresh = check_achievements(&stats, &mut unlocked, at(3));
        let ids: Vec<_> = fresh.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["early_bird", "night_owl"]);

        let mut unlocked = UnlockedAchievements::new();
        let fresh = check_achievements(&stats, &mut unlocked, at(6));
        assert_eq!(fresh.iter().map(|a| a.id).collect::<Vec<_>>(), vec!["early_bird"]);

        let mut unlocked = UnlockedAchievements::new();
        assert!(check_achievements(&stats, &mut unlocked, at(15)).is_empty());
    }

    #[test]
    fn test_level_curve() {
        assert_eq!(calculate_level(0), 1);
        assert_eq!(calculate_level(99), 1);
        assert_eq!(calculate_level(100), 2);
        assert_eq!(calculate_level(399), 2);
        assert_eq!(calculate_level(400), 3);
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(3), 900);
    }

    #[test]
    fn test_daily_challenge_expires_at_next_midnight() {
        let mut rng = StdRng::seed_from_u64(7);
        let challenge = generate_daily_challenge(&mut rng, at(22));
        assert_eq!(
            challenge.expires_at,
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(challenge.current, 0);
        assert!(!challenge.completed);
        assert!(challenge.id.starts_with("daily_20250615_"));
    }

    #[test]
    fn test_update_challenge_tracks_metric() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut challenge = generate_daily_challenge(&mut rng, at(10));
        challenge.kind = ChallengeKind::Categories;
        challenge.target = 3;

        let mut stats = UserStats::default();
        stats.categories_explored.insert("muncă".to_string());
        update_challenge(&mut challenge, &stats);
        assert_eq!(challenge.current, 1);
        assert!(!challenge.completed);

        stats.categories_explored.insert("familie".to_string());
        stats.categories_explored.insert("prietenie".to_string());
        update_challenge(&mut challenge, &stats);
        assert!(challenge.completed);
    }

    #[test]
    fn test_streak_is_zero_or_one() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(calculate_streak(today, today), 1);
        assert_eq!(calculate_streak(today - Duration::days(1), today), 1);
        assert_eq!(calculate_streak(today - Duration::days(2), today), 0);
        for days in 0..60 {
            assert!(calculate_streak(today - Duration::days(days), today) <= 1);
        }
    }

    #[test]
    fn test_learning_paths() {
        let paths = learning_paths();
        let totals: Vec<_> = paths.iter().map(|p| (p.total, p.xp_reward)).collect();
        assert_eq!(totals, vec![(20, 100), (30, 200), (50, 500)]);
        assert_eq!(paths[0].level, PathLevel::Beginner);
    }
}
