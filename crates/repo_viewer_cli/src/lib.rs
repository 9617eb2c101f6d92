//! Repository viewer CLI library exports for integration testing.
//!
//! Exposes the command implementations, configuration and errors so they can
//! be driven without going through argument parsing.

pub mod commands;
pub mod config;
pub mod errors;
