use alloc::string::String;
use thiserror::Error;

use crate::{CardCount, CardId, Dim};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board dimensions {rows}x{columns}")]
    InvalidDimensions { rows: Dim, columns: Dim },
    #[error("A {rows}x{columns} board has an odd number of cards")]
    OddCardCount { rows: Dim, columns: Dim },
    #[error("Deck does not match declared board size")]
    InvalidBoardShape,
    #[error("Deck is not made of pairs, id {id} appears {count} times")]
    UnpairedDeck { id: CardId, count: usize },
    #[error("Invalid card index {0}")]
    InvalidCardIndex(CardCount),
    #[error("Corrupt save: {0}")]
    CorruptSave(#[from] CorruptSave),
}

/// Why a saved session was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorruptSave {
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("value {value} of `{key}` is out of range")]
    OutOfRange { key: String, value: i64 },
    #[error("saved dimensions {rows}x{columns} are not a playable board")]
    InvalidDimensions { rows: i64, columns: i64 },
    #[error("card count {found} does not match {expected}")]
    CardCountMismatch { expected: CardCount, found: i64 },
    #[error("card id {id} appears {count} times")]
    UnpairedId { id: CardId, count: usize },
    #[error("only one card of pair {0} is matched")]
    HalfMatchedPair(CardId),
    #[error("{0} disagrees with the card states")]
    InconsistentCounter(&'static str),
    #[error("malformed store contents")]
    Malformed,
}

pub type Result<T> = core::result::Result<T, GameError>;
