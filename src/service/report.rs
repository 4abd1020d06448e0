use super::aggregate;
use super::fetch::FetchFailures;
use super::filters::{filter_donations, DateRange, DonationFilter};
use super::sequencer::{RefreshSequencer, RefreshTicket};
use crate::db::{queries, RowSource};
use crate::error::{ReportError, Result};
use crate::models::{FinancialView, ReportData, ReportRows};
use crate::session::Session;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const REPORT_FETCH_FAILED: &str = "Failed to fetch report data";
pub const DONATIONS_FETCH_FAILED: &str = "Failed to fetch donations";

/// 一次报表计算的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub range: DateRange,
    pub data: ReportData,
    /// 任一拉取失败时给用户的一条提示
    pub notice: Option<String>,
    pub failed_sources: Vec<String>,
}

/// 已发布的报表 (最近一次未被取代的刷新)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedReport {
    pub ticket: u64,
    pub outcome: ReportOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub outcome: ReportOutcome,
    /// false 表示结果迟到, 已被更新的刷新取代而未发布
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialOutcome {
    pub view: FinancialView,
    pub notice: Option<String>,
}

/// 报表服务: 拉取原始行 -> 纯函数聚合
pub struct ReportService<S> {
    source: Arc<S>,
    sequencer: RefreshSequencer,
    latest: RwLock<Option<PublishedReport>>,
}

impl<S: RowSource> ReportService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            sequencer: RefreshSequencer::new(),
            latest: RwLock::new(None),
        }
    }

    pub fn sequencer(&self) -> &RefreshSequencer {
        &self.sequencer
    }

    /// 并发拉取报表所需的五张表, 全部返回后才进入聚合
    pub async fn fetch_rows(&self, range: &DateRange) -> (ReportRows, FetchFailures) {
        let source = self.source.as_ref();
        let (members, donations, attendance, events, visitors) = futures::join!(
            queries::members(source),
            queries::donations_between(source, range),
            queries::attendance_between(source, range),
            queries::events(source),
            queries::visitors_between(source, range),
        );

        let mut failures = FetchFailures::new();
        let rows = ReportRows {
            members: failures.take(queries::MEMBERS, members),
            donations: failures.take(queries::DONATIONS, donations),
            attendance: failures.take(queries::ATTENDANCE_COUNTS, attendance),
            events: failures.take(queries::EVENTS, events),
            visitors: failures.take(queries::VISITORS, visitors),
        };
        (rows, failures)
    }

    /// 生成报表; 部分拉取失败时基于成功的部分聚合
    pub async fn build_report(&self, session: &Session, range: &DateRange) -> Result<ReportOutcome> {
        session.require_admin()?;

        let (rows, failures) = self.fetch_rows(range).await;
        tracing::info!(
            "报表 {} ~ {}: 会员 {}, 奉献 {}, 出席 {}, 活动 {}, 访客 {}",
            range.from,
            range.to,
            rows.members.len(),
            rows.donations.len(),
            rows.attendance.len(),
            rows.events.len(),
            rows.visitors.len()
        );

        let data = aggregate::build_report(&rows);
        Ok(ReportOutcome {
            range: *range,
            data,
            notice: failures.notice(REPORT_FETCH_FAILED),
            failed_sources: failures.into_tables(),
        })
    }

    /// 以新序号刷新并尝试发布
    pub async fn refresh(&self, session: &Session, range: &DateRange) -> Result<RefreshOutcome> {
        let ticket = self.sequencer.begin();
        self.refresh_with(ticket, session, range).await
    }

    /// 使用已领取的序号刷新; 序号已被取代时结果不发布
    pub async fn refresh_with(
        &self,
        ticket: RefreshTicket,
        session: &Session,
        range: &DateRange,
    ) -> Result<RefreshOutcome> {
        let outcome = self.build_report(session, range).await?;
        let published = self.publish(ticket, outcome.clone()).await;
        Ok(RefreshOutcome { outcome, published })
    }

    async fn publish(&self, ticket: RefreshTicket, outcome: ReportOutcome) -> bool {
        let mut latest = self.latest.write().await;
        let newer_published = latest
            .as_ref()
            .map_or(false, |p| p.ticket >= ticket.value());
        if !self.sequencer.is_current(ticket) || newer_published {
            tracing::warn!("刷新 #{} 已被取代, 丢弃迟到的结果", ticket.value());
            return false;
        }
        *latest = Some(PublishedReport {
            ticket: ticket.value(),
            outcome,
        });
        true
    }

    /// 最近一次发布的报表
    pub async fn latest(&self, session: &Session) -> Result<PublishedReport> {
        session.require_admin()?;
        self.latest
            .read()
            .await
            .clone()
            .ok_or_else(|| ReportError::NotFound("no report has been published yet".to_string()))
    }

    /// 财务页: 全量奉献 (新录入在前) -> 过滤 -> 统计
    pub async fn financials(
        &self,
        session: &Session,
        filter: &DonationFilter,
        today: NaiveDate,
    ) -> Result<FinancialOutcome> {
        session.require_admin()?;

        let mut failures = FetchFailures::new();
        let all = queries::donations_recent_first(self.source.as_ref()).await;
        let all = failures.take(queries::DONATIONS, all);

        let donations = filter_donations(&all, filter, today);
        tracing::debug!("财务过滤: {} -> {} 笔", all.len(), donations.len());

        let view = FinancialView {
            totals: aggregate::donation_totals(&donations),
            summary: aggregate::financial_summary(&donations),
            donations,
        };
        Ok(FinancialOutcome {
            view,
            notice: failures.notice(DONATIONS_FETCH_FAILED),
        })
    }
}
