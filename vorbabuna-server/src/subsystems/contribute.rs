//! Contribution subsystem: user-submitted proverbs awaiting moderation.

use serde::Deserialize;
use vorbabuna_core::imagery;
use vorbabuna_core::models::{NewProverb, Proverb};
use vorbabuna_core::store::ProverbStore;
use vorbabuna_core::text;

use crate::error::ServiceError;

pub const MIN_TEXT_CHARS: usize = 10;
pub const MAX_TEXT_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRequest {
    pub text: Option<String>,
    pub meaning: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    /// Contact address; accepted but not stored.
    pub email: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create an unvalidated proverb from a submission.
pub async fn contribute(
    store: &dyn ProverbStore,
    req: ContributionRequest,
) -> Result<Proverb, ServiceError> {
    let region = required(req.region);
    let (Some(text), Some(meaning), Some(category)) =
        (required(req.text), required(req.meaning), required(req.category))
    else {
        return Err(ServiceError::validation("text, meaning and category are required"));
    };

    let length = text.chars().count();
    if !(MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&length) {
        return Err(ServiceError::validation(format!(
            "Proverb text must be between {} and {} characters",
            MIN_TEXT_CHARS, MAX_TEXT_CHARS
        )));
    }

    if store.find_by_text(&text).await?.is_some() {
        return Err(ServiceError::Conflict("This proverb already exists".to_string()));
    }

    let new = NewProverb {
        keywords: text::extract_keywords(&text),
        image_prompt: Some(imagery::folk_art_prompt(
            &text,
            Some(&category),
            region.as_deref(),
        )),
        image_url: None,
        text,
        meaning,
        category: Some(category),
        region,
        validated: false,
    };

    let proverb = store.insert(new).await?;
    tracing::info!("Contribution {} received, awaiting moderation", proverb.id);
    Ok(proverb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vorbabuna_core::store::ProverbFilter;
    use vorbabuna_core::MemoryProverbStore;

    fn request(text: &str) -> ContributionRequest {
        ContributionRequest {
            text: Some(text.to_string()),
            meaning: Some("Un înțeles".to_string()),
            category: Some("înțelepciune".to_string()),
            ..ContributionRequest::default()
        }
    }

    #[tokio::test]
    async fn test_length_boundaries() {
        let store = MemoryProverbStore::new();
        for bad in ["a".repeat(9), "a".repeat(201)] {
            let err = contribute(&store, request(&bad)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{} chars", bad.len());
        }
        for good in ["b".repeat(10), "c".repeat(200)] {
            contribute(&store, request(&good)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_length_counts_characters_not_bytes() {
        let store = MemoryProverbStore::new();
        contribute(&store, request(&"ă".repeat(200))).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let store = MemoryProverbStore::new();
        let mut req = request("Graba strică treaba");
        req.category = Some("   ".to_string());
        assert!(matches!(
            contribute(&store, req).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let store = MemoryProverbStore::new();
        contribute(&store, request("Graba strică treaba")).await.unwrap();
        let err = contribute(&store, request("GRABA STRICĂ TREABA")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_contribution_is_pending_with_keywords() {
        let store = MemoryProverbStore::new();
        let p = contribute(&store, request("Graba strică treaba")).await.unwrap();
        assert!(!p.validated);
        assert_eq!(p.keywords, vec!["graba", "strică", "treaba"]);
        assert!(p.image_prompt.is_some());
        assert_eq!(store.count(&ProverbFilter::validated()).await.unwrap(), 0);
        assert_eq!(store.count(&ProverbFilter::pending()).await.unwrap(), 1);
    }
}
