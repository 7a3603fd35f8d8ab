pub mod footer;
pub mod header;
pub mod utils;

pub use footer::{draw_footer, draw_toasts};
pub use header::{draw_header, PAGES};
pub use utils::{centered_rect, format_optional_money, salary_range, truncate};
