use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub slow_statement_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 未指定日期范围时，默认统计最近 N 天
    pub default_range_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/congregation".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_statement_secs: 5,
            },
            report: ReportConfig {
                default_range_days: 30,
            },
        }
    }
}

/// 环境变量 -> 配置键
const ENV_KEYS: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("DATABASE_MAX_CONNECTIONS", "database.max_connections"),
    ("DATABASE_ACQUIRE_TIMEOUT_SECS", "database.acquire_timeout_secs"),
    ("DATABASE_SLOW_STATEMENT_SECS", "database.slow_statement_secs"),
    ("REPORT_DEFAULT_RANGE_DAYS", "report.default_range_days"),
];

impl AppConfig {
    /// 从默认值 + 环境变量加载配置
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数覆盖默认值 (便于测试)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("database.acquire_timeout_secs", defaults.database.acquire_timeout_secs as i64)?
            .set_default("database.slow_statement_secs", defaults.database.slow_statement_secs as i64)?
            .set_default("report.default_range_days", defaults.report.default_range_days)?;

        for (env_key, config_key) in ENV_KEYS {
            if let Some(value) = lookup(env_key) {
                builder = builder.set_override(*config_key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }
}
