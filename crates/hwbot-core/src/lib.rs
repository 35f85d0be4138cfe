//! Core domain + application logic for the homework review bot.
//!
//! This crate is framework-agnostic. The review-status HTTP API and Telegram
//! live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod homework;
pub mod interpreter;
pub mod logging;
pub mod notifier;
pub mod ports;
pub mod watcher;

pub use errors::{Error, Result};
