//! Utility functions for rule implementations.

pub mod allowance;
pub mod paths;

// Re-export commonly used utilities for rule implementations
#[doc(inline)]
pub use allowance::{check_allow_with_reason, check_node_allowance, AllowCheck};
#[doc(inline)]
pub use paths::{normalize_separators, position_ignore_case};
