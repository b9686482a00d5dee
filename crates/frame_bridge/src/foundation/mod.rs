//! Foundation module - Core utilities and types
//!
//! - Math types used by input payloads
//! - Logging utilities

pub mod math;
pub mod logging;
