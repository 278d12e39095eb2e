/// Shared modules for the KPI board
pub mod cell;
pub mod color;
pub mod format;
pub mod layout;
pub mod marquee;
pub mod source;
pub mod sync;
pub mod types;
pub mod widget;
