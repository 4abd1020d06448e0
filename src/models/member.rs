use super::loose_text;
use serde::{Deserialize, Serialize};

/// 会员表原始行 (members)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberRow {
    #[serde(deserialize_with = "loose_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub membership_type: Option<String>, // 会员类型, 缺省 visitor
    #[serde(deserialize_with = "loose_text")]
    pub created_at: Option<String>,
}

/// 访客表原始行 (visitors)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorRow {
    #[serde(deserialize_with = "loose_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub visit_date: Option<String>,
}
