//! Utility functions for formatting and file handling.

pub mod format;
pub mod fs;

// Re-export commonly used functions at module level
pub use format::format_age;
pub use fs::{expand_home, is_single_component, write_atomic};
