use super::{AttendanceRow, DonationRow, EventRow, MemberRow, VisitorRow};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 报表所需的原始行集合 (拉取阶段的产物)
#[derive(Debug, Clone, Default)]
pub struct ReportRows {
    pub members: Vec<MemberRow>,
    pub donations: Vec<DonationRow>,
    pub attendance: Vec<AttendanceRow>,
    pub events: Vec<EventRow>,
    pub visitors: Vec<VisitorRow>,
}

/// 分类计数 (会员类型、活动类型)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub label: String,
    pub count: i64,
    pub percentage: i64, // 各分类独立四舍五入, 合计不一定等于 100
}

/// 分类金额 (奉献类型)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountStat {
    pub label: String,
    pub amount: BigDecimal,
    pub percentage: i64,
}

/// 月度奉献趋势点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAmount {
    pub period_label: String, // "Mar 2024"
    pub amount: BigDecimal,
}

/// 出席人数序列点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePoint {
    pub date_label: String, // "Jan 1"
    pub total: i64,
    pub members: i64,
    pub visitors: i64,
}

/// 财务汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total: BigDecimal,
    pub average: BigDecimal,
    pub count: i64,
    pub by_type: Vec<AmountStat>,
}

impl Default for FinancialSummary {
    fn default() -> Self {
        Self {
            total: BigDecimal::zero(),
            average: BigDecimal::zero(),
            count: 0,
            by_type: Vec::new(),
        }
    }
}

/// 报表顶部统计卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeadline {
    pub total_members: i64,
    pub total_donations: BigDecimal,
    pub events_held: i64,
    pub average_attendance: i64,
}

/// 报表页全部数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub membership_stats: Vec<CategoryStat>,
    pub donation_trends: Vec<MonthlyAmount>,
    pub attendance_data: Vec<AttendancePoint>,
    pub financial_summary: FinancialSummary,
    pub event_stats: Vec<CategoryStat>,
    pub headline: ReportHeadline,
}

/// 财务页统计卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationTotals {
    pub total: BigDecimal,
    pub tithe: BigDecimal,
    pub offering: BigDecimal,
    pub missions: BigDecimal,
}

/// 财务页数据: 过滤后的明细 + 统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialView {
    pub donations: Vec<DonationRow>,
    pub totals: DonationTotals,
    pub summary: FinancialSummary,
}

/// 管理首页统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_members: i64,
    pub total_events: i64,
    pub total_donations: i64,
    pub total_visitors: i64,
    pub monthly_donations: BigDecimal,
    pub recent_members: Vec<MemberRow>,
    pub recent_donations: Vec<DonationRow>,
}
