//! Shared utilities for bounded-memory matrix processing.
//!
//! - Buffer budgets for transpose blocks and column bands
//! - Zero-allocation text parsing
//! - Efficient text output formatting

pub mod buffers;
pub mod output;
pub mod parsing;

pub use buffers::{transpose_block_width, COLUMN_BAND_BUDGET, TRANSPOSE_BUDGET};
pub use output::TextWriter;
pub use parsing::{fields, is_blank, is_comment, Lines};
