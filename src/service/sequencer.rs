use std::sync::atomic::{AtomicU64, Ordering};

/// 刷新序号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 刷新序号分配器
///
/// 每次刷新领取一个递增序号; 只有最新序号的结果可以发布,
/// 被后续刷新取代的迟到结果一律丢弃。
#[derive(Debug, Default)]
pub struct RefreshSequencer {
    issued: AtomicU64,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}
