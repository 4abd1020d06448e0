use super::{loose_text, LooseNumber};
use serde::{Deserialize, Serialize};

/// 奉献记录原始行 (donations)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationRow {
    #[serde(deserialize_with = "loose_text")]
    pub id: Option<String>,
    pub amount: LooseNumber,             // 金额, 可能以字符串形式到达
    #[serde(deserialize_with = "loose_text")]
    pub donation_date: Option<String>,   // YYYY-MM-DD
    #[serde(deserialize_with = "loose_text")]
    pub donation_type: Option<String>,   // tithe / offering / missions / building_fund ...
    #[serde(deserialize_with = "loose_text")]
    pub donor_name: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub created_at: Option<String>,
}
