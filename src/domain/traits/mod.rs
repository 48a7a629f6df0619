//! Domain traits - Abstractions for infrastructure implementations

pub mod clock;
pub mod platform;
pub mod resources;
pub mod store;

pub use clock::{Clock, Sleeper};
pub use platform::{BotInfo, Platform, ReactionFailure, ReactionResponse};
pub use resources::ResourceStore;
pub use store::QuoteStore;
