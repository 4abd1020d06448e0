use crate::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::{Duration, Instant};

/// 单次拉取超时
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 过滤值 (始终以绑定参数传入)
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Date(NaiveDate),
    Int(i64),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => " = ",
            Self::Gte => " >= ",
            Self::Lte => " <= ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// 通用表查询: select * + 等值/范围过滤 + 排序 + 条数限制
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    filters: Vec<ColumnFilter>,
    order: Option<(String, bool)>,
    limit: Option<i64>,
}

impl TableQuery {
    pub fn select_all(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    fn filter(mut self, column: &str, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        self.filters.push(ColumnFilter {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lte(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    pub fn order(&self) -> Option<(&str, bool)> {
        self.order.as_ref().map(|(c, asc)| (c.as_str(), *asc))
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    /// 表名、列名只允许 ASCII 字母数字和下划线
    pub fn validate(&self) -> Result<()> {
        let columns = self
            .filters
            .iter()
            .map(|f| f.column.as_str())
            .chain(self.order.iter().map(|(c, _)| c.as_str()));
        for ident in std::iter::once(self.table.as_str()).chain(columns) {
            if !is_identifier(ident) {
                return Err(ReportError::InvalidQuery(format!("invalid identifier: {:?}", ident)));
            }
        }
        if matches!(self.limit, Some(n) if n < 0) {
            return Err(ReportError::InvalidQuery("negative limit".to_string()));
        }
        Ok(())
    }

    /// 构建 SQL, 每行以 JSON 对象返回
    pub fn to_sql(&self) -> Result<QueryBuilder<'static, Postgres>> {
        self.validate()?;

        let mut builder = QueryBuilder::new("SELECT row_to_json(t) AS data FROM ");
        builder.push(&self.table).push(" t");

        for (idx, filter) in self.filters.iter().enumerate() {
            builder
                .push(if idx == 0 { " WHERE t." } else { " AND t." })
                .push(&filter.column)
                .push(filter.op.sql());
            match &filter.value {
                FilterValue::Text(s) => builder.push_bind(s.clone()),
                FilterValue::Date(d) => builder.push_bind(*d),
                FilterValue::Int(n) => builder.push_bind(*n),
            };
        }

        if let Some((column, ascending)) = &self.order {
            builder
                .push(" ORDER BY t.")
                .push(column)
                .push(if *ascending { " ASC" } else { " DESC" });
        }

        if let Some(n) = self.limit {
            builder.push(" LIMIT ").push_bind(n);
        }

        Ok(builder)
    }
}

fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 原始行来源 (托管数据库或测试替身)
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<Value>>;
}

/// 基于 PostgreSQL 连接池的行来源
#[derive(Clone)]
pub struct PgRowSource {
    pool: PgPool,
}

impl PgRowSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowSource for PgRowSource {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<Value>> {
        let mut builder = query.to_sql()?;
        tracing::debug!("查询 {}: {}", query.table(), builder.sql());
        let start = Instant::now();

        let result = tokio::time::timeout(
            FETCH_TIMEOUT,
            builder.build_query_scalar::<Value>().fetch_all(&self.pool),
        )
        .await;

        match result {
            Ok(Ok(rows)) => {
                tracing::debug!("✓ {} 返回 {} 行, 耗时: {:?}", query.table(), rows.len(), start.elapsed());
                Ok(rows)
            }
            Ok(Err(e)) => {
                tracing::error!("✗ 查询 {} 失败, 耗时: {:?}, 错误: {:?}", query.table(), start.elapsed(), e);
                Err(e.into())
            }
            Err(_) => {
                tracing::error!("✗ 查询 {} 超时 (>{:?})", query.table(), FETCH_TIMEOUT);
                Err(sqlx::Error::PoolTimedOut.into())
            }
        }
    }
}
