pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod session;

pub use config::AppConfig;
pub use db::{create_pool, PgRowSource, RowSource, TableQuery};
pub use error::{ReportError, Result};
pub use service::{DashboardService, ReportService};
pub use session::{Role, Session};
