//! Report rendering.

pub mod generator;

pub use generator::{
    average_score, generate_fix_markdown, generate_json, generate_scan_markdown,
    generate_scan_set_markdown,
};
