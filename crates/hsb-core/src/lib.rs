//! Core domain + application logic for the Hearthstone card bot.
//!
//! This crate is intentionally platform-agnostic. The Hearthstone API and the
//! chat platform live behind ports (traits) implemented in adapter crates.

pub mod cache;
pub mod card;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod format;
pub mod logging;
pub mod parser;
pub mod ports;
pub mod util;

pub use errors::{Error, Result};
