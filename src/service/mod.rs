pub mod aggregate;
pub mod calendar;
pub mod dashboard;
pub mod fetch;
pub mod filters;
pub mod report;
pub mod sequencer;

pub use dashboard::DashboardService;
pub use filters::{CategoryFilter, DateRange, DonationFilter, MonthFilter};
pub use report::ReportService;
pub use sequencer::{RefreshSequencer, RefreshTicket};
