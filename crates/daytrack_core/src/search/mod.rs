//! Search entry points.
//!
//! # Responsibility
//! - Expose substring search over task and goal text.
//! - Keep search result shaping inside core.

pub mod substring;
