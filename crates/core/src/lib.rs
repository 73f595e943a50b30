//! Core types for feedrelay
//!
//! Domain records, task payloads and configuration shared across all other crates.

mod config;
pub mod constants;
mod env_config;
mod error;
mod feed;
mod task;

pub use config::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use feed::*;
pub use task::*;
