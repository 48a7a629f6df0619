//! Domain entities - Core business objects with no external dependencies

pub mod emote;
pub mod message;
pub mod record;
pub mod user;

pub use emote::{EmojiNameSet, EmoteTable};
pub use message::{InboundMessage, OutboundMessage};
pub use record::{DefinitionRecord, QuoteRecord};
pub use user::User;
