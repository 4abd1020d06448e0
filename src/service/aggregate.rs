//! 报表聚合: 纯函数, 只消费已拉取的原始行
//!
//! 所有函数都不会失败: 缺失字段落到默认值, 无法解析的金额按 0 计入,
//! 空输入得到空列表或 0。

use super::calendar::{self, day_label, month_label};
use crate::models::{
    AmountStat, AttendancePoint, AttendanceRow, CategoryStat, DonationRow, DonationTotals,
    FinancialSummary, MonthlyAmount, ReportData, ReportHeadline, ReportRows,
};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use indexmap::IndexMap;

pub const DEFAULT_MEMBERSHIP_TYPE: &str = "visitor";
pub const DEFAULT_DONATION_TYPE: &str = "other";
pub const DEFAULT_EVENT_TYPE: &str = "other";

/// 首字母大写，其余保持原样 (`building_fund` -> `Building_fund`)
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn category_key<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

/// 向下取整 (with_scale 是向零截断, 负数需要再减 1)
fn floor(value: &BigDecimal) -> BigDecimal {
    let truncated = value.with_scale(0);
    if &truncated > value {
        truncated - BigDecimal::from(1)
    } else {
        truncated
    }
}

/// 四舍五入到 `scale` 位小数, 0.5 向正无穷进位
pub fn round_half_up(value: &BigDecimal, scale: u32) -> BigDecimal {
    let shift = BigDecimal::from(10i64.pow(scale));
    let half = BigDecimal::from(1) / BigDecimal::from(2);
    let shifted = floor(&(value * &shift + half));
    (shifted / shift).with_scale(i64::from(scale))
}

/// round(numerator / denominator), denominator > 0
fn rounded_ratio(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator).div_euclid(2 * denominator)
}

/// round(count / total * 100)
fn count_percentage(count: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    rounded_ratio(100 * count, total)
}

/// round(amount / total * 100), total 为 0 时为 0
fn amount_percentage(amount: &BigDecimal, total: &BigDecimal) -> i64 {
    if total.is_zero() {
        return 0;
    }
    let hundred = BigDecimal::from(100);
    let ratio = amount * &hundred / total;
    round_half_up(&ratio, 0).to_i64().unwrap_or(0)
}

/// 按分类计数并计算占比
///
/// 分组保持首次出现顺序。百分比按分类独立取整, 不强制合计为 100。
pub fn category_breakdown<T, F>(records: &[T], accessor: F, default: &str) -> Vec<CategoryStat>
where
    F: Fn(&T) -> Option<&str>,
{
    let total = records.len() as i64;
    if total == 0 {
        return Vec::new();
    }

    let mut counts: IndexMap<String, i64> = IndexMap::new();
    for record in records {
        let key = category_key(accessor(record), default);
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(key, count)| CategoryStat {
            label: capitalize(&key),
            count,
            percentage: count_percentage(count, total),
        })
        .collect()
}

fn log_unparsable_amounts(donations: &[DonationRow], stage: &str) {
    let skipped = donations.iter().filter(|d| d.amount.value().is_none()).count();
    if skipped > 0 {
        tracing::debug!("{}: {} 条奉献记录金额缺失或无法解析, 按 0 计入", stage, skipped);
    }
}

/// 月度奉献趋势
///
/// 按 `donation_date` 的年月分组求和; 输出顺序为扫描时首次出现的顺序,
/// 不按日期重新排序。
pub fn monthly_donation_trend(donations: &[DonationRow]) -> Vec<MonthlyAmount> {
    log_unparsable_amounts(donations, "monthly_donation_trend");

    let mut months: IndexMap<String, BigDecimal> = IndexMap::new();
    for donation in donations {
        let label = calendar::label_for(donation.donation_date.as_deref(), month_label);
        let entry = months.entry(label).or_insert_with(BigDecimal::zero);
        *entry += donation.amount.or_zero();
    }

    months
        .into_iter()
        .map(|(period_label, amount)| MonthlyAmount {
            period_label,
            amount: round_half_up(&amount, 2),
        })
        .collect()
}

/// 财务汇总: 总额、平均额、笔数、按类型金额占比
///
/// 平均额按两位小数四舍五入; 总额与分类金额保留原始精度。
pub fn financial_summary(donations: &[DonationRow]) -> FinancialSummary {
    if donations.is_empty() {
        return FinancialSummary::default();
    }
    log_unparsable_amounts(donations, "financial_summary");

    let count = donations.len() as i64;
    let mut total = BigDecimal::zero();
    let mut by_type: IndexMap<String, BigDecimal> = IndexMap::new();

    for donation in donations {
        let amount = donation.amount.or_zero();
        total += &amount;
        let key = category_key(donation.donation_type.as_deref(), DEFAULT_DONATION_TYPE);
        let entry = by_type.entry(key.to_string()).or_insert_with(BigDecimal::zero);
        *entry += amount;
    }

    let average = round_half_up(&(&total / BigDecimal::from(count)), 2);
    let by_type = by_type
        .into_iter()
        .map(|(key, amount)| AmountStat {
            label: capitalize(&key),
            percentage: amount_percentage(&amount, &total),
            amount,
        })
        .collect();

    FinancialSummary {
        total,
        average,
        count,
        by_type,
    }
}

/// 出席人数序列: 一条记录对应一个点, 保持输入顺序
pub fn attendance_series(records: &[AttendanceRow]) -> Vec<AttendancePoint> {
    records
        .iter()
        .map(|record| AttendancePoint {
            date_label: calendar::label_for(record.attendance_date.as_deref(), day_label),
            total: record.total_count.or_zero(),
            members: record.members_count.or_zero(),
            visitors: record.visitors_count.or_zero(),
        })
        .collect()
}

/// 报表顶部卡片
pub fn report_headline(
    membership: &[CategoryStat],
    summary: &FinancialSummary,
    events: &[CategoryStat],
    attendance: &[AttendancePoint],
) -> ReportHeadline {
    let average_attendance = if attendance.is_empty() {
        0
    } else {
        let sum: i64 = attendance.iter().map(|p| p.total).sum();
        rounded_ratio(sum, attendance.len() as i64)
    };

    ReportHeadline {
        total_members: membership.iter().map(|s| s.count).sum(),
        total_donations: summary.total.clone(),
        events_held: events.iter().map(|s| s.count).sum(),
        average_attendance,
    }
}

/// 财务页卡片: 总额及十一奉献 / 奉献 / 宣教三类
pub fn donation_totals(donations: &[DonationRow]) -> DonationTotals {
    let sum_of = |kind: Option<&str>| -> BigDecimal {
        donations
            .iter()
            .filter(|d| kind.map_or(true, |k| d.donation_type.as_deref() == Some(k)))
            .fold(BigDecimal::zero(), |acc, d| acc + d.amount.or_zero())
    };

    DonationTotals {
        total: sum_of(None),
        tithe: sum_of(Some("tithe")),
        offering: sum_of(Some("offering")),
        missions: sum_of(Some("missions")),
    }
}

/// 组装完整报表 (访客行只参与拉取, 不参与图表)
pub fn build_report(rows: &ReportRows) -> ReportData {
    let membership_stats = category_breakdown(
        &rows.members,
        |m| m.membership_type.as_deref(),
        DEFAULT_MEMBERSHIP_TYPE,
    );
    let donation_trends = monthly_donation_trend(&rows.donations);
    let attendance_data = attendance_series(&rows.attendance);
    let financial_summary = financial_summary(&rows.donations);
    let event_stats =
        category_breakdown(&rows.events, |e| e.event_type.as_deref(), DEFAULT_EVENT_TYPE);
    let headline = report_headline(
        &membership_stats,
        &financial_summary,
        &event_stats,
        &attendance_data,
    );

    ReportData {
        membership_stats,
        donation_trends,
        attendance_data,
        financial_summary,
        event_stats,
        headline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRow, LooseInt, MemberRow};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn donation(kind: Option<&str>, amount: &str, date: &str) -> DonationRow {
        DonationRow {
            amount: amount.into(),
            donation_type: kind.map(str::to_string),
            donation_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn member(kind: Option<&str>) -> MemberRow {
        MemberRow {
            membership_type: kind.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn breakdown_counts_and_rounds_each_bucket() {
        let members = vec![member(Some("active")), member(Some("active")), member(None)];
        let stats = category_breakdown(&members, |m| m.membership_type.as_deref(), DEFAULT_MEMBERSHIP_TYPE);
        assert_eq!(
            stats,
            vec![
                CategoryStat { label: "Active".into(), count: 2, percentage: 67 },
                CategoryStat { label: "Visitor".into(), count: 1, percentage: 33 },
            ]
        );
    }

    #[test]
    fn percentages_may_not_sum_to_hundred() {
        // 三个各 1/3 -> 33 + 33 + 33 = 99
        let members = vec![member(Some("a")), member(Some("b")), member(Some("c"))];
        let stats = category_breakdown(&members, |m| m.membership_type.as_deref(), "x");
        assert_eq!(stats.iter().map(|s| s.percentage).sum::<i64>(), 99);

        // 1/8 = 12.5 进位到 13, 合计 101
        let mut members = vec![member(Some("big")); 7];
        members.push(member(Some("small")));
        let stats = category_breakdown(&members, |m| m.membership_type.as_deref(), "x");
        assert_eq!(stats[1].percentage, 13);
        assert_eq!(stats[0].percentage, 88);
    }

    #[test]
    fn empty_breakdown_is_empty() {
        let members: Vec<MemberRow> = Vec::new();
        assert!(category_breakdown(&members, |m| m.membership_type.as_deref(), "visitor").is_empty());
    }

    #[test]
    fn empty_string_falls_back_to_default() {
        let members = vec![member(Some(""))];
        let stats = category_breakdown(&members, |m| m.membership_type.as_deref(), DEFAULT_MEMBERSHIP_TYPE);
        assert_eq!(stats[0].label, "Visitor");
    }

    #[test]
    fn underscore_labels_are_only_capitalized() {
        assert_eq!(capitalize("building_fund"), "Building_fund");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclat"), "Éclat");
    }

    #[test]
    fn labels_group_on_raw_value() {
        let members = vec![member(Some("tithe")), member(Some("Tithe"))];
        let stats = category_breakdown(&members, |m| m.membership_type.as_deref(), "x");
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.label == "Tithe"));
    }

    #[test]
    fn trend_keeps_first_seen_month_order() {
        let donations = vec![
            donation(Some("tithe"), "10", "2024-03-15"),
            donation(Some("tithe"), "20", "2024-01-02"),
            donation(Some("tithe"), "30", "2024-03-20"),
        ];
        let trend = monthly_donation_trend(&donations);
        let labels: Vec<_> = trend.iter().map(|p| p.period_label.as_str()).collect();
        assert_eq!(labels, vec!["Mar 2024", "Jan 2024"]);
        assert_eq!(trend[0].amount, dec("40"));
        assert_eq!(trend[1].amount, dec("20"));
    }

    #[test]
    fn trend_tolerates_bad_amounts_and_dates() {
        let donations = vec![
            donation(None, "bad", "2024-05-01"),
            donation(None, "12.345", "2024-05-09"),
            donation(None, "5", "not a date"),
        ];
        let trend = monthly_donation_trend(&donations);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].amount, dec("12.35"));
        assert_eq!(trend[1].period_label, calendar::INVALID_DATE);
    }

    #[test]
    fn summary_skips_unparsable_amounts() {
        let donations = vec![
            donation(Some("tithe"), "100", "2024-01-01"),
            donation(Some("tithe"), "bad", "2024-01-01"),
            donation(Some("offering"), "50", "2024-01-01"),
        ];
        let summary = financial_summary(&donations);
        assert_eq!(summary.total, dec("150"));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, dec("50"));
        assert_eq!(
            summary.by_type,
            vec![
                AmountStat { label: "Tithe".into(), amount: dec("100"), percentage: 67 },
                AmountStat { label: "Offering".into(), amount: dec("50"), percentage: 33 },
            ]
        );
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let donations = vec![
            donation(Some("tithe"), "10", "2024-01-01"),
            donation(Some("tithe"), "0", "2024-01-02"),
            donation(Some("tithe"), "0.005", "2024-01-03"),
        ];
        let summary = financial_summary(&donations);
        assert_eq!(summary.total, dec("10.005"));
        assert_eq!(summary.average, dec("3.34"));
        assert_eq!(summary.average.to_string(), "3.34");

        let halves = vec![donation(None, "1", "2024-01-01"), donation(None, "0", "2024-01-01")];
        assert_eq!(financial_summary(&halves).average.to_string(), "0.50");
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        assert_eq!(financial_summary(&[]), FinancialSummary::default());
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let donations = vec![donation(Some("tithe"), "0", "2024-01-01"), donation(None, "x", "2024-01-01")];
        let summary = financial_summary(&donations);
        assert!(summary.total.is_zero());
        assert!(summary.average.is_zero());
        assert!(summary.by_type.iter().all(|s| s.percentage == 0));
        assert_eq!(summary.by_type[1].label, "Other");
    }

    #[test]
    fn attendance_defaults_missing_counts() {
        let records = vec![
            AttendanceRow {
                attendance_date: Some("2024-01-01".into()),
                ..Default::default()
            },
            AttendanceRow {
                attendance_date: Some("2024-01-08".into()),
                total_count: LooseInt::from(120),
                members_count: LooseInt::from(100),
                visitors_count: LooseInt::from(20),
                ..Default::default()
            },
        ];
        let series = attendance_series(&records);
        assert_eq!(
            series,
            vec![
                AttendancePoint { date_label: "Jan 1".into(), total: 0, members: 0, visitors: 0 },
                AttendancePoint { date_label: "Jan 8".into(), total: 120, members: 100, visitors: 20 },
            ]
        );
        assert!(attendance_series(&[]).is_empty());
    }

    #[test]
    fn headline_rounds_average_attendance() {
        let attendance = vec![
            AttendancePoint { date_label: "a".into(), total: 10, members: 0, visitors: 0 },
            AttendancePoint { date_label: "b".into(), total: 11, members: 0, visitors: 0 },
        ];
        let headline = report_headline(&[], &FinancialSummary::default(), &[], &attendance);
        assert_eq!(headline.average_attendance, 11);
        assert_eq!(report_headline(&[], &FinancialSummary::default(), &[], &[]).average_attendance, 0);
    }

    #[test]
    fn totals_pick_fixed_types() {
        let donations = vec![
            donation(Some("tithe"), "100", "2024-01-01"),
            donation(Some("missions"), "25.50", "2024-01-01"),
            donation(Some("building_fund"), "70", "2024-01-01"),
        ];
        let totals = donation_totals(&donations);
        assert_eq!(totals.total, dec("195.50"));
        assert_eq!(totals.tithe, dec("100"));
        assert!(totals.offering.is_zero());
        assert_eq!(totals.missions, dec("25.5"));
    }

    #[test]
    fn report_combines_all_sections() {
        let rows = ReportRows {
            members: vec![member(Some("active")), member(None)],
            donations: vec![donation(Some("tithe"), "40", "2024-02-11")],
            events: vec![EventRow { event_type: Some("service".into()), ..Default::default() }],
            ..Default::default()
        };
        let report = build_report(&rows);
        assert_eq!(report.headline.total_members, 2);
        assert_eq!(report.headline.events_held, 1);
        assert_eq!(report.headline.total_donations, dec("40"));
        assert_eq!(report.donation_trends[0].period_label, "Feb 2024");
        assert_eq!(report.event_stats[0].label, "Service");
        assert!(report.attendance_data.is_empty());
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up(&dec("2.5"), 0), dec("3"));
        assert_eq!(round_half_up(&dec("-2.5"), 0), dec("-2"));
        assert_eq!(round_half_up(&dec("1.005"), 2), dec("1.01"));
        assert_eq!(round_half_up(&dec("7"), 2).to_string(), "7.00");
    }
}
