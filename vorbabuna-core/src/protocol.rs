use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation actions accepted by `/api/admin`.
///
/// POST bodies carry the action inline (`{"action": "bulk-approve", "ids": [...]}`);
/// GET requests name it in the query string and are converted with [`VorbaRequest::from_query`].
/// Ids stay strings here: a malformed id behaves like an unknown one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum VorbaRequest {
    Stats,
    #[serde(alias = "moderation")]
    Pending {
        limit: Option<i64>,
    },
    Health,
    Export,
    Analytics {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Approve {
        id: String,
    },
    Reject {
        id: String,
        reason: Option<String>,
    },
    BulkApprove {
        ids: Vec<String>,
    },
    BulkDelete {
        ids: Vec<String>,
    },
    Flag {
        id: String,
        reason: String,
    },
    Seed {
        #[serde(default)]
        reset: bool,
    },
}

impl VorbaRequest {
    /// Build a read-only action from `/api/admin` query parameters.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, String> {
        let action = params
            .get("action")
            .map(String::as_str)
            .ok_or_else(|| "action is required".to_string())?;

        match action {
            "stats" => Ok(Self::Stats),
            "pending" | "moderation" => {
                let limit = match params.get("limit") {
                    Some(raw) => Some(
                        raw.parse::<i64>()
                            .map_err(|_| format!("invalid limit: {}", raw))?,
                    ),
                    None => None,
                };
                Ok(Self::Pending { limit })
            }
            "health" => Ok(Self::Health),
            "export" => Ok(Self::Export),
            "analytics" => {
                let (Some(start), Some(end)) = (params.get("start"), params.get("end")) else {
                    return Err("start and end dates required".to_string());
                };
                Ok(Self::Analytics {
                    start: parse_instant(start, false)?,
                    end: parse_instant(end, true)?,
                })
            }
            other => Err(format!("Invalid action: {}", other)),
        }
    }

    /// Actions that change data must arrive as POST.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Approve { .. }
                | Self::Reject { .. }
                | Self::BulkApprove { .. }
                | Self::BulkDelete { .. }
                | Self::Flag { .. }
                | Self::Seed { .. }
        )
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain date means
/// the start of that UTC day, or its last instant when `end_of_day` is set.
pub fn parse_instant(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date: {}", raw))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| format!("invalid date: {}", raw))?;
    Ok(date.and_time(time).and_utc())
}

/// JSON envelope shared by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    /// Success carrying a list and its length.
    pub fn list<T: Serialize>(items: &[T]) -> Self {
        Self {
            success: true,
            data: Some(serde_json::to_value(items).unwrap_or(serde_json::Value::Null)),
            count: Some(items.len() as u64),
            ..Self::default()
        }
    }

    /// Success reporting how many rows an operation affected.
    pub fn counted(count: u64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: Some(count),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn into_value(self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"success": false}))
    }
}
