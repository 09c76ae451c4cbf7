//! Report rendering.

pub mod generator;

pub use generator::{generate_summary_text, generate_text_report, render, write_report};
