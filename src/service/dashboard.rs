use super::fetch::FetchFailures;
use crate::db::{queries, RowSource};
use crate::error::Result;
use crate::models::DashboardStats;
use crate::session::Session;
use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 首页"最近"列表条数
pub const RECENT_LIMIT: i64 = 5;
pub const DASHBOARD_FETCH_FAILED: &str = "Failed to fetch dashboard statistics";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOutcome {
    pub stats: DashboardStats,
    pub notice: Option<String>,
}

/// 管理首页统计服务
pub struct DashboardService<S> {
    source: Arc<S>,
}

impl<S: RowSource> DashboardService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub async fn stats(&self, session: &Session, today: NaiveDate) -> Result<DashboardOutcome> {
        session.require_admin()?;

        let source = self.source.as_ref();
        let month_start = today.with_day(1).unwrap_or(today);
        let (members, events, donations, visitors, recent_members, recent_donations, monthly) = futures::join!(
            queries::members(source),
            queries::events(source),
            queries::donations_recent_first(source),
            queries::visitors(source),
            queries::recent_members(source, RECENT_LIMIT),
            queries::recent_donations(source, RECENT_LIMIT),
            queries::donations_since(source, month_start),
        );

        let mut failures = FetchFailures::new();
        let members = failures.take(queries::MEMBERS, members);
        let events = failures.take(queries::EVENTS, events);
        let donations = failures.take(queries::DONATIONS, donations);
        let visitors = failures.take(queries::VISITORS, visitors);
        let recent_members = failures.take(queries::MEMBERS, recent_members);
        let recent_donations = failures.take(queries::DONATIONS, recent_donations);
        let monthly = failures.take(queries::DONATIONS, monthly);

        let monthly_donations = monthly
            .iter()
            .fold(BigDecimal::zero(), |acc, d| acc + d.amount.or_zero());

        let stats = DashboardStats {
            total_members: members.len() as i64,
            total_events: events.len() as i64,
            total_donations: donations.len() as i64,
            total_visitors: visitors.len() as i64,
            monthly_donations,
            recent_members,
            recent_donations,
        };
        tracing::info!(
            "首页统计: 会员 {}, 活动 {}, 奉献 {} 笔, 访客 {}, 本月奉献 {}",
            stats.total_members,
            stats.total_events,
            stats.total_donations,
            stats.total_visitors,
            stats.monthly_donations
        );

        Ok(DashboardOutcome {
            stats,
            notice: failures.notice(DASHBOARD_FETCH_FAILED),
        })
    }
}
