use crate::error::Result;

/// 并发拉取时的失败收集: 失败的一路按空集合继续
#[derive(Debug, Default)]
pub struct FetchFailures {
    tables: Vec<String>,
}

impl FetchFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take<T>(&mut self, table: &str, result: Result<Vec<T>>) -> Vec<T> {
        match result {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("拉取 {} 失败, 按空集合处理: {}", table, e);
                self.tables.push(table.to_string());
                Vec::new()
            }
        }
    }

    /// 有任一失败时只产生一条提示
    pub fn notice(&self, message: &str) -> Option<String> {
        (!self.tables.is_empty()).then(|| message.to_string())
    }

    pub fn into_tables(self) -> Vec<String> {
        self.tables
    }
}
