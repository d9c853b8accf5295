//! Command-line argument parsing and output formatting

pub mod args;
pub mod output;
