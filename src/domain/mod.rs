//! Domain layer - Core business objects and the seams to the outside world
//!
//! This layer contains:
//! - Entities: Messages, users, quote/definition records, resource tables
//! - Traits: Abstractions for infrastructure (Platform, QuoteStore, ResourceStore, Clock)

pub mod entities;
pub mod traits;
