use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// 无法识别的日期统一使用此标签
pub const INVALID_DATE: &str = "Invalid Date";

/// 解析记录中的日期字段
///
/// `YYYY-MM-DD` 直接作为日历日期；带时区的时间戳换算到本地时区后取日期；
/// 不带时区的时间戳直接取日期部分。不做 UTC 归一化。
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Local).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|ts| ts.date())
}

/// "Mar 2024"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// "Jan 1"
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// 对可选日期字段生成标签，缺失或无法解析时返回 [`INVALID_DATE`]
pub fn label_for(value: Option<&str>, format: fn(NaiveDate) -> String) -> String {
    value
        .and_then(parse_calendar_date)
        .map(format)
        .unwrap_or_else(|| INVALID_DATE.to_string())
}
