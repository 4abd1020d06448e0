use super::{loose_text, LooseInt};
use serde::{Deserialize, Serialize};

/// 出席人数记录原始行 (event_attendance_counts)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceRow {
    #[serde(deserialize_with = "loose_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub attendance_date: Option<String>,
    pub total_count: LooseInt,
    pub members_count: LooseInt,
    pub visitors_count: LooseInt,
}
