//! # Analyst Tools
//!
//! `#[tool]` functions the analyst skills may call during a stage.

pub mod search_tools;
