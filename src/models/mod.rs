pub mod attendance;
pub mod donation;
pub mod event;
pub mod loose;
pub mod member;
pub mod report;

pub use attendance::AttendanceRow;
pub use donation::DonationRow;
pub use event::EventRow;
pub use loose::{loose_text, LooseInt, LooseNumber};
pub use member::{MemberRow, VisitorRow};
pub use report::{
    AmountStat, AttendancePoint, CategoryStat, DashboardStats, DonationTotals, FinancialSummary,
    FinancialView, MonthlyAmount, ReportData, ReportHeadline, ReportRows,
};
