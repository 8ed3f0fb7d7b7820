pub mod browse;
pub mod details;
pub mod widgets;

pub use browse::render_browse_view;
pub use details::render_details_view;
