use super::loose_text;
use serde::{Deserialize, Serialize};

/// 活动表原始行 (events)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRow {
    #[serde(deserialize_with = "loose_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub event_type: Option<String>, // 缺省 other
    #[serde(deserialize_with = "loose_text")]
    pub event_date: Option<String>,
}
