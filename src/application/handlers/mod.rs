//! Command handlers - one per bot behavior

pub mod definition;
pub mod emoji;
pub mod emote;
pub mod purge;
pub mod quote;

pub use definition::{AddDefinition, DefineHelp, FindDefinition};
pub use emoji::{EmojiCatalog, EmojiResponder, Reaction};
pub use emote::{EmoteLimits, EmoteResponder};
pub use purge::{EmojiPurge, PurgeReport, PurgeState, PurgeStop};
pub use quote::{AddQuote, FindQuote, RandomQuote};
