//! 聚合之前的过滤阶段 (分类 / 月份 / 日期范围)

use super::calendar::parse_calendar_date;
use crate::error::{ReportError, Result};
use crate::models::DonationRow;
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// 表示"全部"的哨兵值
pub const ALL: &str = "all";

/// 分类过滤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

/// 月份过滤: 全部 或 "N 个月前" 所在的自然月
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonthFilter {
    #[default]
    All,
    MonthsAgo(u32),
}

impl MonthFilter {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            return Ok(Self::All);
        }
        value
            .parse()
            .map(Self::MonthsAgo)
            .map_err(|_| ReportError::InvalidQuery(format!("invalid month filter: {}", value)))
    }

    /// 目标 (年, 月)
    pub fn target(&self, today: NaiveDate) -> Option<(i32, u32)> {
        match self {
            Self::All => None,
            Self::MonthsAgo(n) => today
                .checked_sub_months(Months::new(*n))
                .map(|d| (d.year(), d.month())),
        }
    }

    pub fn matches(&self, date: Option<&str>, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::MonthsAgo(_) => {
                let Some(target) = self.target(today) else {
                    return false;
                };
                date.and_then(parse_calendar_date)
                    .map(|d| (d.year(), d.month()) == target)
                    .unwrap_or(false)
            }
        }
    }
}

/// 奉献列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationFilter {
    pub kind: CategoryFilter,
    pub month: MonthFilter,
}

/// 先按类型、再按月份过滤; 不改变顺序
pub fn filter_donations(
    donations: &[DonationRow],
    filter: &DonationFilter,
    today: NaiveDate,
) -> Vec<DonationRow> {
    donations
        .iter()
        .filter(|d| filter.kind.matches(d.donation_type.as_deref()))
        .filter(|d| filter.month.matches(d.donation_date.as_deref(), today))
        .cloned()
        .collect()
}

/// 闭区间日期范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(ReportError::InvalidQuery(format!(
                "date range start {} is after end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// 截止今天的最近 `days` 天
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            from: today - Duration::days(days.max(0)),
            to: today,
        }
    }

    /// 只给出一端时, 另一端取默认范围的对应端
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
        default_days: i64,
    ) -> Result<Self> {
        let fallback = Self::last_days(today, default_days);
        Self::new(from.unwrap_or(fallback.from), to.unwrap_or(fallback.to))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
