use congregation_reports::{api, create_pool, AppConfig, PgRowSource};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let source = Arc::new(PgRowSource::new(pool));
    let state = api::AppState::new(source, config.report.default_range_days);
    let app = api::router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/reports          - 报表 (from/to)");
    info!("  POST /api/reports/refresh  - 刷新并发布报表");
    info!("  GET  /api/reports/latest   - 最近发布的报表");
    info!("  GET  /api/financials       - 财务明细 (type/months_ago)");
    info!("  GET  /api/dashboard        - 首页统计");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
