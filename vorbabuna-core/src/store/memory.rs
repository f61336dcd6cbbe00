use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{compare, ProverbFilter, ProverbStore, StoreResult};
use crate::models::stats::rounded_average;
use crate::models::{
    CategoryStat, DailyActivity, NewProverb, OverallStats, Proverb, RegionStat,
};

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Proverb>,
    last_created: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Creation timestamps are strictly increasing so "newest" ordering
    /// always follows insertion order, even within one clock tick.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_created {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_created = Some(now);
        now
    }
}

/// Process-local proverb store.
#[derive(Debug, Default)]
pub struct MemoryProverbStore {
    state: RwLock<MemoryState>,
}

impl MemoryProverbStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProverbStore for MemoryProverbStore {
    async fn health(&self) -> StoreResult<String> {
        Ok(format!("memory ({} proverbs)", self.len().await))
    }

    async fn insert(&self, new: NewProverb) -> StoreResult<Proverb> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        let proverb = Proverb {
            id: Uuid::new_v4(),
            text: new.text,
            meaning: new.meaning,
            category: new.category,
            region: new.region,
            keywords: new.keywords,
            image_prompt: new.image_prompt,
            image_url: new.image_url,
            validated: new.validated,
            popularity: 0,
            created_at: now,
            updated_at: now,
        };
        state.rows.push(proverb.clone());
        Ok(proverb)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Proverb>> {
        let state = self.state.read().await;
        Ok(state.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Proverb>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_by_text(&self, text: &str) -> StoreResult<Option<Proverb>> {
        let wanted = text.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .find(|p| p.text.to_lowercase() == wanted)
            .cloned())
    }

    async fn list(&self, filter: &ProverbFilter) -> StoreResult<Vec<Proverb>> {
        let needle = filter.needle();
        let state = self.state.read().await;
        let mut rows: Vec<Proverb> = state
            .rows
            .iter()
            .filter(|p| filter.matches(p, needle.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare(filter.order, a, b));

        let offset = filter.offset.max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &ProverbFilter) -> StoreResult<i64> {
        let needle = filter.needle();
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .filter(|p| filter.matches(p, needle.as_deref()))
            .count() as i64)
    }

    async fn increment_popularity(&self, id: Uuid) -> StoreResult<Option<i64>> {
        let mut state = self.state.write().await;
        Ok(state.rows.iter_mut().find(|p| p.id == id).map(|p| {
            p.popularity += 1;
            p.updated_at = Utc::now();
            p.popularity
        }))
    }

    async fn approve(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut matched = 0;
        for p in state.rows.iter_mut().filter(|p| ids.contains(&p.id)) {
            p.validated = true;
            p.updated_at = now;
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.rows.len();
        state.rows.retain(|p| !ids.contains(&p.id));
        Ok((before - state.rows.len()) as u64)
    }

    async fn purge(&self) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let removed = state.rows.len() as u64;
        state.rows.clear();
        Ok(removed)
    }

    async fn set_image(&self, id: Uuid, prompt: &str, url: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.rows.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.image_prompt = Some(prompt.to_string());
                p.image_url = Some(url.to_string());
                p.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn category_stats(&self) -> StoreResult<Vec<CategoryStat>> {
        let state = self.state.read().await;
        let mut groups: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for p in state.rows.iter().filter(|p| p.validated) {
            let key = p.category.clone().unwrap_or_else(|| "Unknown".to_string());
            let entry = groups.entry(key).or_default();
            entry.0 += 1;
            entry.1 += p.popularity;
        }
        let mut stats: Vec<CategoryStat> = groups
            .into_iter()
            .map(|(category, (count, total))| CategoryStat {
                category,
                count,
                total_views: total,
                average_views: rounded_average(total, count),
            })
            .collect();
        stats.sort_by(|a, b| {
            b.total_views
                .cmp(&a.total_views)
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(stats)
    }

    async fn region_stats(&self) -> StoreResult<Vec<RegionStat>> {
        let state = self.state.read().await;
        let mut groups: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for p in state.rows.iter().filter(|p| p.validated) {
            if let Some(region) = &p.region {
                let entry = groups.entry(region.clone()).or_default();
                entry.0 += 1;
                entry.1 += p.popularity;
            }
        }
        let mut stats: Vec<RegionStat> = groups
            .into_iter()
            .map(|(region, (count, total))| RegionStat {
                region,
                count,
                total_views: total,
            })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.region.cmp(&b.region)));
        Ok(stats)
    }

    async fn overall_stats(&self) -> StoreResult<OverallStats> {
        let state = self.state.read().await;
        let total = state.rows.len() as i64;
        let validated = state.rows.iter().filter(|p| p.validated).count() as i64;
        let views: i64 = state.rows.iter().map(|p| p.popularity).sum();
        Ok(OverallStats {
            total_proverbs: total,
            validated_proverbs: validated,
            pending_proverbs: total - validated,
            total_views: views,
            average_views_per_proverb: rounded_average(views, total),
        })
    }

    async fn daily_activity(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<DailyActivity>> {
        let state = self.state.read().await;
        let mut days: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
        for p in state
            .rows
            .iter()
            .filter(|p| p.created_at >= start && p.created_at <= end)
        {
            let entry = days.entry(p.created_at.date_naive()).or_default();
            entry.0 += 1;
            entry.1 += p.popularity;
        }
        Ok(days
            .into_iter()
            .map(|(day, (created, popularity))| DailyActivity {
                day,
                created,
                popularity,
            })
            .collect())
    }
}
