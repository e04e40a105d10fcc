//! Helpers shared by the Front& crates: CSV parsing and export, text shaping
//! for terminal tables, and configuration loading.

pub mod config;
pub mod csv;
pub mod text_processing;

pub use config::{FrontandConfig, expand_tilde};
pub use csv::{parse_csv, to_csv_text};
