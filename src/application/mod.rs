//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: Bot, storage, config and lookup errors
//! - Messaging: Dispatching, response policies, parsing, the response sender
//! - Handlers: Quote, definition, emote and emoji behaviors
//! - Services: Dispatcher wiring and the inbound/outbound loops

pub mod errors;
pub mod handlers;
pub mod messaging;
pub mod services;
