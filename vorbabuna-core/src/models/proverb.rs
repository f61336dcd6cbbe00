use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Proverb {
    pub id: Uuid,
    pub text: String,
    pub meaning: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub keywords: Vec<String>,
    pub image_prompt: Option<String>,
    pub image_url: Option<String>,
    pub validated: bool,
    pub popularity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a proverb is created; the store assigns id, counters and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProverb {
    pub text: String,
    pub meaning: String,
    pub category: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub image_prompt: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub validated: bool,
}
