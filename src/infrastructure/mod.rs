//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Database: Quote and definition persistence
//! - Resources: Emote and emoji files
//! - Clock: Wall clock and sleeping
//! - Adapters: Platform integrations

pub mod adapters;
pub mod clock;
pub mod config;
pub mod database;
pub mod resources;
