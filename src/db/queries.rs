use super::query::{RowSource, TableQuery};
use crate::error::Result;
use crate::models::{AttendanceRow, DonationRow, EventRow, MemberRow, VisitorRow};
use crate::service::filters::DateRange;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const MEMBERS: &str = "members";
pub const DONATIONS: &str = "donations";
pub const ATTENDANCE_COUNTS: &str = "event_attendance_counts";
pub const EVENTS: &str = "events";
pub const VISITORS: &str = "visitors";

/// 将 JSON 行解码为结构体; 非对象或解码失败的行跳过并记录
pub fn decode_rows<T: DeserializeOwned>(table: &str, values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let rows: Vec<T> = values
        .into_iter()
        .filter_map(|value| {
            if !value.is_object() {
                tracing::warn!("{}: 跳过非对象行 {}", table, value);
                return None;
            }
            match serde_json::from_value(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!("{}: 行解码失败, 已跳过: {}", table, e);
                    None
                }
            }
        })
        .collect();

    if rows.len() < total {
        tracing::info!("{}: {}/{} 行解码成功", table, rows.len(), total);
    }
    rows
}

async fn fetch_as<T, S>(source: &S, query: TableQuery) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: RowSource + ?Sized,
{
    let values = source.fetch(&query).await?;
    Ok(decode_rows(query.table(), values))
}

/// 日期列落在范围内 (闭区间)
pub fn between_query(table: &str, column: &str, range: &DateRange) -> TableQuery {
    TableQuery::select_all(table)
        .gte(column, range.from)
        .lte(column, range.to)
}

pub fn recent_query(table: &str, n: i64) -> TableQuery {
    TableQuery::select_all(table)
        .order_by("created_at", false)
        .limit(n)
}

/// 全部会员
pub async fn members<S: RowSource + ?Sized>(source: &S) -> Result<Vec<MemberRow>> {
    fetch_as(source, TableQuery::select_all(MEMBERS)).await
}

/// 全部活动
pub async fn events<S: RowSource + ?Sized>(source: &S) -> Result<Vec<EventRow>> {
    fetch_as(source, TableQuery::select_all(EVENTS)).await
}

/// 全部访客
pub async fn visitors<S: RowSource + ?Sized>(source: &S) -> Result<Vec<VisitorRow>> {
    fetch_as(source, TableQuery::select_all(VISITORS)).await
}

/// 日期范围内的奉献
pub async fn donations_between<S: RowSource + ?Sized>(
    source: &S,
    range: &DateRange,
) -> Result<Vec<DonationRow>> {
    fetch_as(source, between_query(DONATIONS, "donation_date", range)).await
}

/// 日期范围内的出席统计
pub async fn attendance_between<S: RowSource + ?Sized>(
    source: &S,
    range: &DateRange,
) -> Result<Vec<AttendanceRow>> {
    fetch_as(source, between_query(ATTENDANCE_COUNTS, "attendance_date", range)).await
}

/// 日期范围内的访客
pub async fn visitors_between<S: RowSource + ?Sized>(
    source: &S,
    range: &DateRange,
) -> Result<Vec<VisitorRow>> {
    fetch_as(source, between_query(VISITORS, "visit_date", range)).await
}

/// 全部奉献, 最新录入在前
pub async fn donations_recent_first<S: RowSource + ?Sized>(source: &S) -> Result<Vec<DonationRow>> {
    fetch_as(source, TableQuery::select_all(DONATIONS).order_by("created_at", false)).await
}

/// 最近加入的 n 位会员
pub async fn recent_members<S: RowSource + ?Sized>(source: &S, n: i64) -> Result<Vec<MemberRow>> {
    fetch_as(source, recent_query(MEMBERS, n)).await
}

/// 最近的 n 笔奉献
pub async fn recent_donations<S: RowSource + ?Sized>(source: &S, n: i64) -> Result<Vec<DonationRow>> {
    fetch_as(source, recent_query(DONATIONS, n)).await
}

/// 某日 (含) 之后录入的奉献
pub async fn donations_since<S: RowSource + ?Sized>(
    source: &S,
    since: NaiveDate,
) -> Result<Vec<DonationRow>> {
    fetch_as(source, TableQuery::select_all(DONATIONS).gte("created_at", since)).await
}
