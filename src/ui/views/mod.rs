mod dashboard;
mod detail;
mod list;

pub use dashboard::DashboardView;
pub use detail::RecordDetailView;
pub use list::ResourceListView;
