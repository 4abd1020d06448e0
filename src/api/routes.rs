use super::handlers::{self, AppState};
use crate::db::RowSource;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 构建路由
pub fn router<S: RowSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/reports", get(handlers::report::<S>))
        .route("/api/reports/refresh", post(handlers::refresh_report::<S>))
        .route("/api/reports/latest", get(handlers::latest_report::<S>))
        .route("/api/financials", get(handlers::financials::<S>))
        .route("/api/dashboard", get(handlers::dashboard::<S>))
        .with_state(state)
        .layer(ServiceBuilder::new())
}
