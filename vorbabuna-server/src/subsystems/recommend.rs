//! Recommendation composer
//!
//! Every strategy reads validated proverbs only. A store failure inside a
//! strategy is logged and the strategy yields an empty list, so one broken
//! bucket never takes a whole feed down.

use std::collections::BTreeSet;

use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;
use vorbabuna_core::models::Proverb;
use vorbabuna_core::store::{Affinity, ProverbFilter, ProverbStore, SortOrder};

use super::parse_ids;

/// Labelled buckets of the personalized feed. Buckets may overlap.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Feed {
    pub recommended: Vec<Proverb>,
    pub popular: Vec<Proverb>,
    #[serde(rename = "new")]
    pub newest: Vec<Proverb>,
    pub random: Vec<Proverb>,
}

impl Feed {
    pub fn total(&self) -> usize {
        self.recommended.len() + self.popular.len() + self.newest.len() + self.random.len()
    }
}

async fn fetch(store: &dyn ProverbStore, filter: ProverbFilter, strategy: &str) -> Vec<Proverb> {
    match store.list(&filter).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("{} recommendations unavailable: {}", strategy, e);
            Vec::new()
        }
    }
}

pub async fn popular(store: &dyn ProverbStore, n: i64) -> Vec<Proverb> {
    let filter = ProverbFilter::validated()
        .order(SortOrder::Popularity)
        .limit(n);
    fetch(store, filter, "popular").await
}

pub async fn newest(store: &dyn ProverbStore, n: i64) -> Vec<Proverb> {
    let filter = ProverbFilter::validated().order(SortOrder::Newest).limit(n);
    fetch(store, filter, "new").await
}

/// `min(n, count)` independent uniform picks; the same proverb may come back twice.
pub async fn random(store: &dyn ProverbStore, n: i64) -> Vec<Proverb> {
    let count = match store.count(&ProverbFilter::validated()).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("random recommendations unavailable: {}", e);
            return Vec::new();
        }
    };
    if count == 0 || n <= 0 {
        return Vec::new();
    }

    let offsets: Vec<i64> = {
        let mut rng = rand::thread_rng();
        (0..n.min(count)).map(|_| rng.gen_range(0..count)).collect()
    };

    let picks = offsets.into_iter().map(|offset| {
        let filter = ProverbFilter::validated()
            .order(SortOrder::Oldest)
            .offset(offset)
            .limit(1);
        async move { store.list(&filter).await }
    });

    join_all(picks)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(mut rows) => rows.pop(),
            Err(e) => {
                tracing::warn!("random pick failed: {}", e);
                None
            }
        })
        .collect()
}

/// Same-category proverbs first, then same-region ones, never the seed itself.
pub async fn similar(store: &dyn ProverbStore, id: Uuid, n: i64) -> Vec<Proverb> {
    let seed = match store.get(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("similar recommendations unavailable: {}", e);
            return Vec::new();
        }
    };
    if n <= 0 {
        return Vec::new();
    }

    let mut results = match &seed.category {
        Some(category) => {
            let filter = ProverbFilter::validated()
                .category(category.clone())
                .exclude([seed.id])
                .limit(n);
            fetch(store, filter, "similar").await
        }
        None => Vec::new(),
    };

    let remaining = n - results.len() as i64;
    if remaining > 0 {
        if let Some(region) = &seed.region {
            let seen: Vec<Uuid> = results.iter().map(|p| p.id).collect();
            let filter = ProverbFilter::validated()
                .region(region.clone())
                .exclude([seed.id])
                .exclude(seen)
                .limit(remaining);
            results.extend(fetch(store, filter, "similar").await);
        }
    }

    results.truncate(n as usize);
    results
}

/// Proverbs sharing the seed's category or region, by popularity.
pub async fn related(store: &dyn ProverbStore, id: Uuid, n: i64) -> Vec<Proverb> {
    let seed = match store.get(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("related recommendations unavailable: {}", e);
            return Vec::new();
        }
    };

    let affinity = Affinity {
        categories: seed.category.into_iter().collect(),
        regions: seed.region.into_iter().collect(),
    };
    if affinity.is_empty() {
        return Vec::new();
    }

    let filter = ProverbFilter::validated()
        .affinity(affinity)
        .exclude([seed.id])
        .limit(n);
    fetch(store, filter, "related").await
}

pub async fn by_category(store: &dyn ProverbStore, category: &str, n: i64, offset: i64) -> Vec<Proverb> {
    let filter = ProverbFilter::validated()
        .category(category)
        .limit(n)
        .offset(offset);
    fetch(store, filter, "category").await
}

pub async fn by_region(store: &dyn ProverbStore, region: &str, n: i64, offset: i64) -> Vec<Proverb> {
    let filter = ProverbFilter::validated()
        .region(region)
        .limit(n)
        .offset(offset);
    fetch(store, filter, "region").await
}

pub async fn trending(store: &dyn ProverbStore, category: &str, n: i64) -> Vec<Proverb> {
    let filter = ProverbFilter::validated()
        .category(category)
        .order(SortOrder::Popularity)
        .limit(n);
    fetch(store, filter, "trending").await
}

/// Proverbs in the categories or regions of what the user favorited or viewed,
/// excluding those ids. Falls back to [`popular`] when there is nothing to go on.
pub async fn personalized(
    store: &dyn ProverbStore,
    favorites: &[String],
    history: &[String],
    n: i64,
) -> Vec<Proverb> {
    let seen = parse_ids(favorites.iter().chain(history).map(String::as_str));
    if seen.is_empty() {
        return popular(store, n).await;
    }

    let known = match store.get_many(&seen).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("personalized recommendations unavailable: {}", e);
            return Vec::new();
        }
    };

    let categories: BTreeSet<String> = known.iter().filter_map(|p| p.category.clone()).collect();
    let regions: BTreeSet<String> = known.iter().filter_map(|p| p.region.clone()).collect();
    let affinity = Affinity {
        categories: categories.into_iter().collect(),
        regions: regions.into_iter().collect(),
    };
    if affinity.is_empty() {
        return popular(store, n).await;
    }

    let filter = ProverbFilter::validated()
        .affinity(affinity)
        .exclude(seen)
        .order(SortOrder::Popularity)
        .limit(n.saturating_mul(2));
    let mut candidates = fetch(store, filter, "personalized").await;
    if candidates.is_empty() {
        return popular(store, n).await;
    }

    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(n.max(0) as usize);
    candidates
}

/// 40% personalized, 30% popular, 20% new, 10% random, each rounded down.
pub async fn feed(
    store: &dyn ProverbStore,
    favorites: &[String],
    history: &[String],
    limit: i64,
) -> Feed {
    let (recommended, popular, newest, random) = tokio::join!(
        personalized(store, favorites, history, limit * 4 / 10),
        popular(store, limit * 3 / 10),
        newest(store, limit * 2 / 10),
        random(store, limit / 10),
    );
    Feed {
        recommended,
        popular,
        newest,
        random,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vorbabuna_core::models::NewProverb;
    use vorbabuna_core::MemoryProverbStore;

    async fn add(
        store: &MemoryProverbStore,
        text: &str,
        category: Option<&str>,
        region: Option<&str>,
        validated: bool,
    ) -> Proverb {
        store
            .insert(NewProverb {
                text: text.to_string(),
                meaning: format!("sensul lui {}", text),
                category: category.map(str::to_string),
                region: region.map(str::to_string),
                validated,
                ..NewProverb::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_popular_orders_by_popularity() {
        let store = MemoryProverbStore::new();
        let a = add(&store, "a", None, None, true).await;
        let b = add(&store, "b", None, None, true).await;
        store.increment_popularity(a.id).await.unwrap();
        store.increment_popularity(a.id).await.unwrap();
        store.increment_popularity(b.id).await.unwrap();

        let ids: Vec<_> = popular(&store, 10).await.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_random_never_exceeds_pool_and_skips_pending() {
        let store = MemoryProverbStore::new();
        let a = add(&store, "a", None, None, true).await;
        add(&store, "hidden", None, None, false).await;

        let picks = random(&store, 5).await;
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].id, a.id);
        assert!(random(&MemoryProverbStore::new(), 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_similar_ranks_category_before_region() {
        let store = MemoryProverbStore::new();
        let seed = add(&store, "seed", Some("muncă"), Some("Ardeal"), true).await;
        let region_only = add(&store, "r", Some("familie"), Some("Ardeal"), true).await;
        let same_cat = add(&store, "c", Some("muncă"), Some("Moldova"), true).await;
        store.increment_popularity(region_only.id).await.unwrap();

        let results = similar(&store, seed.id, 5).await;
        let ids: Vec<_> = results.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![same_cat.id, region_only.id]);
        assert!(!ids.contains(&seed.id));
    }

    #[tokio::test]
    async fn test_similar_missing_seed_is_empty() {
        let store = MemoryProverbStore::new();
        add(&store, "x", Some("muncă"), None, true).await;
        assert!(similar(&store, Uuid::new_v4(), 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_related_excludes_seed_and_pending() {
        let store = MemoryProverbStore::new();
        let seed = add(&store, "seed", Some("muncă"), None, true).await;
        let other = add(&store, "o", Some("muncă"), None, true).await;
        add(&store, "p", Some("muncă"), None, false).await;

        let ids: Vec<_> = related(&store, seed.id, 5).await.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![other.id]);
    }

    #[tokio::test]
    async fn test_personalized_empty_inputs_equal_popular() {
        let store = MemoryProverbStore::new();
        for name in ["a", "b", "c"] {
            let p = add(&store, name, Some("x"), None, true).await;
            if name == "b" {
                store.increment_popularity(p.id).await.unwrap();
            }
        }
        let expected: Vec<_> = popular(&store, 20).await.iter().map(|p| p.id).collect();
        let got: Vec<_> = personalized(&store, &[], &[], 20)
            .await
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn test_personalized_uses_preferences_and_excludes_seen() {
        let store = MemoryProverbStore::new();
        let a1 = add(&store, "a1", Some("A"), None, true).await;
        let a2 = add(&store, "a2", Some("A"), None, true).await;
        add(&store, "b1", Some("B"), None, true).await;

        let favorites = vec![a1.id.to_string()];
        let ids: Vec<_> = personalized(&store, &favorites, &[], 5)
            .await
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a2.id]);
    }

    #[tokio::test]
    async fn test_personalized_all_seen_falls_back_to_popular() {
        let store = MemoryProverbStore::new();
        let a1 = add(&store, "a1", Some("A"), None, true).await;
        let b1 = add(&store, "b1", Some("B"), None, true).await;

        let favorites = vec![a1.id.to_string()];
        let got: Vec<_> = personalized(&store, &favorites, &[], 5)
            .await
            .iter()
            .map(|p| p.id)
            .collect();
        let expected: Vec<_> = popular(&store, 5).await.iter().map(|p| p.id).collect();
        assert_eq!(got, expected);
        assert!(got.contains(&b1.id));
    }

    #[tokio::test]
    async fn test_feed_bucket_sizes() {
        let store = MemoryProverbStore::new();
        for i in 0..30 {
            add(&store, &format!("p{}", i), Some("x"), None, true).await;
        }
        let feed = feed(&store, &[], &[], 20).await;
        assert_eq!(feed.recommended.len(), 8);
        assert_eq!(feed.popular.len(), 6);
        assert_eq!(feed.newest.len(), 4);
        assert_eq!(feed.random.len(), 2);
        assert_eq!(feed.total(), 20);
    }

    #[tokio::test]
    async fn test_feed_small_limit_rounds_down() {
        let store = MemoryProverbStore::new();
        add(&store, "only", None, None, true).await;
        let feed = feed(&store, &[], &[], 5).await;
        assert_eq!(feed.recommended.len(), 1);
        assert_eq!(feed.popular.len(), 1);
        assert_eq!(feed.newest.len(), 1);
        assert!(feed.random.is_empty());
    }
}
