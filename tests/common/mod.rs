#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use congregation_reports::db::query::ColumnFilter;
use congregation_reports::db::{FilterOp, FilterValue, RowSource, TableQuery};
use congregation_reports::{ReportError, Result, Role, Session};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// 内存行来源: 按表名返回 JSON 行, 在内存中执行过滤/排序/限制
#[derive(Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    delays: HashMap<NaiveDate, Duration>,
    calls: Mutex<Vec<TableQuery>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn failing(mut self, table: &str) -> Self {
        self.failing.insert(table.to_string());
        self
    }

    /// 查询的第一个 >= 日期条件等于 `from` 时延迟返回
    pub fn delay_when_from(mut self, from: NaiveDate, delay: Duration) -> Self {
        self.delays.insert(from, delay);
        self
    }

    pub fn calls(&self) -> Vec<TableQuery> {
        self.calls.lock().unwrap().clone()
    }
}

fn compare(row: &Value, filter: &ColumnFilter) -> Option<Ordering> {
    let field = row.get(&filter.column)?;
    match (&filter.value, field) {
        (FilterValue::Text(expected), Value::String(actual)) => Some(actual.as_str().cmp(expected.as_str())),
        (FilterValue::Date(expected), Value::String(actual)) => {
            let day = actual.get(..10).unwrap_or(actual.as_str());
            Some(day.cmp(expected.to_string().as_str()))
        }
        (FilterValue::Int(expected), Value::Number(actual)) => actual.as_i64().map(|a| a.cmp(expected)),
        _ => None,
    }
}

fn matches(row: &Value, filter: &ColumnFilter) -> bool {
    match (filter.op, compare(row, filter)) {
        (FilterOp::Eq, Some(Ordering::Equal)) => true,
        (FilterOp::Gte, Some(Ordering::Equal | Ordering::Greater)) => true,
        (FilterOp::Lte, Some(Ordering::Equal | Ordering::Less)) => true,
        _ => false,
    }
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl RowSource for MemorySource {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<Value>> {
        query.validate()?;
        self.calls.lock().unwrap().push(query.clone());

        let from = query.filters().iter().find_map(|f| match (f.op, &f.value) {
            (FilterOp::Gte, FilterValue::Date(d)) => Some(*d),
            _ => None,
        });
        if let Some(delay) = from.and_then(|d| self.delays.get(&d)) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(query.table()) {
            return Err(ReportError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows: Vec<Value> = self
            .tables
            .get(query.table())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| query.filters().iter().all(|f| matches(row, f)))
            .collect();

        if let Some((column, ascending)) = query.order() {
            rows.sort_by_key(|row| sort_key(row, column));
            if !ascending {
                rows.reverse();
            }
        }
        if let Some(n) = query.limit_value() {
            rows.truncate(n as usize);
        }
        Ok(rows)
    }
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn admin() -> Session {
    Session::new("admin-1", Role::Admin)
}

pub fn member() -> Session {
    Session::new("member-7", Role::Member)
}

pub fn donation(id: &str, kind: &str, amount: Value, date: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "amount": amount,
        "donation_type": kind,
        "donation_date": date,
        "donor_name": "Anonymous",
        "created_at": created_at,
    })
}

/// 一个小型教会的样例数据
pub fn sample_source() -> MemorySource {
    MemorySource::new()
        .with_table(
            "members",
            vec![
                json!({"id": "m1", "first_name": "Ruth", "membership_type": "active", "created_at": "2024-01-05T10:00:00+00:00"}),
                json!({"id": "m2", "first_name": "Boaz", "membership_type": "active", "created_at": "2024-02-05T10:00:00+00:00"}),
                json!({"id": "m3", "first_name": "Naomi", "membership_type": null, "created_at": "2024-03-05T10:00:00+00:00"}),
                json!({"id": "m4", "first_name": "Orpah", "membership_type": "inactive", "created_at": "2024-03-06T10:00:00+00:00"}),
            ],
        )
        .with_table(
            "donations",
            vec![
                donation("d1", "tithe", json!("100"), "2024-03-15", "2024-03-15T09:00:00+00:00"),
                donation("d2", "offering", json!(50), "2024-01-02", "2024-01-02T09:00:00+00:00"),
                donation("d3", "building_fund", json!("30.25"), "2024-03-20", "2024-03-20T09:00:00+00:00"),
                donation("d4", "tithe", json!("bad"), "2024-02-10", "2024-02-10T09:00:00+00:00"),
                donation("d5", "missions", json!("999"), "2023-06-01", "2023-06-01T09:00:00+00:00"),
            ],
        )
        .with_table(
            "event_attendance_counts",
            vec![
                json!({"id": "a1", "attendance_date": "2024-03-03", "total_count": 120, "members_count": 100, "visitors_count": 20}),
                json!({"id": "a2", "attendance_date": "2024-03-10", "total_count": "95"}),
                json!({"id": "a3", "attendance_date": "2023-01-01", "total_count": 1}),
            ],
        )
        .with_table(
            "events",
            vec![
                json!({"id": "e1", "title": "Sunday Service", "event_type": "service"}),
                json!({"id": "e2", "title": "Youth Night", "event_type": "youth"}),
                json!({"id": "e3", "title": "Picnic"}),
            ],
        )
        .with_table(
            "visitors",
            vec![
                json!({"id": "v1", "visit_date": "2024-03-03"}),
                json!({"id": "v2", "visit_date": "2022-03-03"}),
            ],
        )
}
