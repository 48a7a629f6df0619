//! quip-bot - a chat bot that remembers quotes and definitions and
//! answers with emotes and emoji reactions.

pub mod application;
pub mod domain;
pub mod infrastructure;
