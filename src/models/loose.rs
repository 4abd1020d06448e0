use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// 宽松数值: 可以是 JSON 数字、数字字符串或 null
///
/// 无法解析的值视为缺失，反序列化本身永不失败。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LooseNumber(Option<BigDecimal>);

impl LooseNumber {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::parse(&n.to_string()),
            Value::String(s) => Self::parse(s),
            _ => Self(None),
        }
    }

    pub fn parse(text: &str) -> Self {
        Self(BigDecimal::from_str(text.trim()).ok())
    }

    pub fn value(&self) -> Option<&BigDecimal> {
        self.0.as_ref()
    }

    /// 缺失或无法解析时按 0 计入
    pub fn or_zero(&self) -> BigDecimal {
        self.0.clone().unwrap_or_else(BigDecimal::zero)
    }
}

impl From<BigDecimal> for LooseNumber {
    fn from(value: BigDecimal) -> Self {
        Self(Some(value))
    }
}

impl From<&str> for LooseNumber {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<i64> for LooseNumber {
    fn from(value: i64) -> Self {
        Self(Some(BigDecimal::from(value)))
    }
}

impl<'de> Deserialize<'de> for LooseNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

impl Serialize for LooseNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// 宽松文本字段: 非字符串 (数字、数组、对象等) 视为缺失, 不让整行解码失败
///
/// 用于 `#[serde(deserialize_with = "loose_text")]`, 缺失的字段仍由 `#[serde(default)]` 补 None。
pub fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => {
            tracing::debug!("非文本字段值 {}, 按缺失处理", other);
            Ok(None)
        }
    }
}

/// 宽松整数: 计数类字段 (人数等)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LooseInt(Option<i64>);

impl LooseInt {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self(n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))),
            Value::String(s) => Self(s.trim().parse().ok()),
            _ => Self(None),
        }
    }

    pub fn value(&self) -> Option<i64> {
        self.0
    }

    pub fn or_zero(&self) -> i64 {
        self.0.unwrap_or(0)
    }
}

impl From<i64> for LooseInt {
    fn from(value: i64) -> Self {
        Self(Some(value))
    }
}

impl<'de> Deserialize<'de> for LooseInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

impl Serialize for LooseInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
