//! Interactive terminal picker

pub mod picker;
pub mod text_utils;

pub use picker::TerminalPicker;
