use crate::db::RowSource;
use crate::error::ReportError;
use crate::service::report::{FinancialOutcome, PublishedReport, RefreshOutcome, ReportOutcome};
use crate::service::dashboard::DashboardOutcome;
use crate::service::{
    CategoryFilter, DashboardService, DateRange, DonationFilter, MonthFilter, ReportService,
};
use crate::session::{Role, Session};
use axum::{
    async_trait,
    extract::{FromRequestParts, Json, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// 共享状态
pub struct AppState<S> {
    pub reports: Arc<ReportService<S>>,
    pub dashboard: Arc<DashboardService<S>>,
    pub default_range_days: i64,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            reports: Arc::clone(&self.reports),
            dashboard: Arc::clone(&self.dashboard),
            default_range_days: self.default_range_days,
        }
    }
}

impl<S: RowSource> AppState<S> {
    pub fn new(source: Arc<S>, default_range_days: i64) -> Self {
        Self {
            reports: Arc::new(ReportService::new(Arc::clone(&source))),
            dashboard: Arc::new(DashboardService::new(source)),
            default_range_days,
        }
    }
}

/// 统一响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub notice: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(message: impl Into<String>, notice: Option<String>, data: T) -> Response {
        let body = Self {
            success: true,
            message: message.into(),
            notice,
            data: Some(data),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

fn failure(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        message,
        notice: None,
        data: None,
    };
    (status, Json(body)).into_response()
}

fn error_response(e: ReportError) -> Response {
    let status = match &e {
        ReportError::Forbidden(_) => StatusCode::FORBIDDEN,
        ReportError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        ReportError::NotFound(_) => StatusCode::NOT_FOUND,
        ReportError::Database(_) | ReportError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("请求失败: {}", e);
    }
    failure(status, format!("Error: {}", e))
}

/// 会话由上游鉴权网关通过请求头传入
#[async_trait]
impl<St: Send + Sync> FromRequestParts<St> for Session {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let Some(user_id) = header(USER_ID_HEADER) else {
            return Err(failure(StatusCode::UNAUTHORIZED, "Error: missing session".to_string()));
        };
        let role = header(USER_ROLE_HEADER).map(Role::parse).unwrap_or(Role::Member);
        Ok(Session::new(user_id, role))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub months_ago: Option<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 报表
pub async fn report<S: RowSource + 'static>(
    State(state): State<AppState<S>>,
    session: Session,
    Query(query): Query<ReportQuery>,
) -> Response {
    let range = match DateRange::resolve(query.from, query.to, today(), state.default_range_days) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };
    match state.reports.build_report(&session, &range).await {
        Ok(ReportOutcome { data, notice, .. }) => {
            ApiResponse::ok(format!("Report for {} ~ {}", range.from, range.to), notice, data)
        }
        Err(e) => error_response(e),
    }
}

/// 刷新并发布报表
pub async fn refresh_report<S: RowSource + 'static>(
    State(state): State<AppState<S>>,
    session: Session,
    Query(query): Query<ReportQuery>,
) -> Response {
    let range = match DateRange::resolve(query.from, query.to, today(), state.default_range_days) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };
    match state.reports.refresh(&session, &range).await {
        Ok(RefreshOutcome { outcome, published }) => {
            let message = if published {
                "Report refreshed".to_string()
            } else {
                "Report superseded by a newer refresh".to_string()
            };
            let notice = outcome.notice.clone();
            ApiResponse::ok(message, notice, RefreshOutcome { outcome, published })
        }
        Err(e) => error_response(e),
    }
}

/// 最近一次发布的报表
pub async fn latest_report<S: RowSource + 'static>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Response {
    match state.reports.latest(&session).await {
        Ok(published) => {
            let notice = published.outcome.notice.clone();
            ApiResponse::<PublishedReport>::ok("Latest report", notice, published)
        }
        Err(e) => error_response(e),
    }
}

/// 财务明细与统计
pub async fn financials<S: RowSource + 'static>(
    State(state): State<AppState<S>>,
    session: Session,
    Query(query): Query<FinancialQuery>,
) -> Response {
    let month = match MonthFilter::parse(query.months_ago.as_deref().unwrap_or_default()) {
        Ok(m) => m,
        Err(e) => return error_response(e),
    };
    let filter = DonationFilter {
        kind: CategoryFilter::parse(query.kind.as_deref().unwrap_or_default()),
        month,
    };
    match state.reports.financials(&session, &filter, today()).await {
        Ok(FinancialOutcome { view, notice }) => {
            let message = format!("{} donations", view.donations.len());
            ApiResponse::ok(message, notice, view)
        }
        Err(e) => error_response(e),
    }
}

/// 管理首页统计
pub async fn dashboard<S: RowSource + 'static>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Response {
    match state.dashboard.stats(&session, today()).await {
        Ok(DashboardOutcome { stats, notice }) => ApiResponse::ok("Dashboard statistics", notice, stats),
        Err(e) => error_response(e),
    }
}
