pub mod header;
pub mod progress;
pub mod statusbar;
pub mod target;
pub mod weekly;
