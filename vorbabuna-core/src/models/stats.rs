use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub total_views: i64,
    pub average_views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStat {
    pub region: String,
    pub count: i64,
    pub total_views: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_proverbs: i64,
    pub validated_proverbs: i64,
    pub pending_proverbs: i64,
    pub total_views: i64,
    pub average_views_per_proverb: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProverbStats {
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub days_old: i64,
}

/// Proverbs created on one UTC day and the popularity they have gathered since.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub created: i64,
    pub popularity: i64,
}

/// Rounded integer average, 0 for an empty group.
pub fn rounded_average(total: i64, count: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    (total as f64 / count as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_average() {
        assert_eq!(rounded_average(0, 0), 0);
        assert_eq!(rounded_average(10, 4), 3);
        assert_eq!(rounded_average(9, 2), 5);
        assert_eq!(rounded_average(7, 3), 2);
    }
}
