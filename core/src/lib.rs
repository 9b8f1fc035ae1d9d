//! Game state for a memory-matching ("concentration") card game.
//!
//! A [`MatchEngine`] owns the board, the flip queue and the session counters.
//! Cards are flipped through [`MatchEngine::request_flip`], pairs are resolved
//! after [`RESOLVE_DELAY`] through whatever [`Scheduler`] the engine was built
//! with, and [`SavedSession`] moves a game in and out of a [`KeyValueStore`].

#![no_std]

extern crate alloc;

pub use board::*;
pub use card::*;
pub use deck::*;
pub use engine::*;
pub use error::*;
pub use observer::*;
pub use persist::*;
pub use scheduler::*;
pub use session::*;
pub use store::*;
pub use types::*;

mod board;
mod card;
mod deck;
mod engine;
mod error;
mod observer;
mod persist;
mod scheduler;
mod session;
mod store;
mod types;
