//! TUI widgets.

pub mod command_line;
pub mod dashboard;
pub mod detail_view;
pub mod overlay;
pub mod status_bar;

pub use command_line::CommandLine;
pub use detail_view::DetailView;
