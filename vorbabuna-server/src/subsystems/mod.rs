pub mod analytics;
pub mod catalog;
pub mod contribute;
pub mod engagement;
pub mod moderation;
pub mod recommend;
pub mod search;

use uuid::Uuid;

/// Parse a proverb id coming from a client. Malformed ids behave like unknown ones.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Valid ids from `raw`, first occurrence only.
pub fn parse_ids<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for id in raw.into_iter().filter_map(parse_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Split a comma-separated id list from a query string.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
