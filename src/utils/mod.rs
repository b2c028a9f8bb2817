// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod logging;

pub use logging::{format_info, format_success, format_warning, init_logger};
