use alloc::vec;
use alloc::vec::Vec;

use crate::*;
pub use random::*;

mod random;

pub trait DeckGenerator {
    fn generate(self, config: GameConfig) -> Deck;
}

/// Ordered pair ids, one per board position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    ids: Vec<CardId>,
}

impl Deck {
    /// Unshuffled deck, every id in `[0, pairs)` twice in ascending order.
    pub fn ordered(config: GameConfig) -> Self {
        let ids = (0..config.total_pairs()).flat_map(|id| [id, id]).collect();
        Self { ids }
    }

    /// Identity over previously saved ids, no shuffling.
    pub fn restore(saved_ids: &[CardId]) -> Self {
        Self {
            ids: saved_ids.to_vec(),
        }
    }

    pub fn ids(&self) -> &[CardId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Checks that every id in `[0, len/2)` appears exactly twice.
    pub fn check_pairs(&self) -> core::result::Result<(), CorruptSave> {
        let pairs = self.ids.len() / 2;
        let mut counts = vec![0usize; pairs];
        for &id in &self.ids {
            match counts.get_mut(usize::from(id)) {
                Some(count) => *count += 1,
                None => return Err(CorruptSave::UnpairedId { id, count: 1 }),
            }
        }
        match counts.iter().position(|&count| count != 2) {
            Some(id) => Err(CorruptSave::UnpairedId {
                id: id.try_into().unwrap_or(CardId::MAX),
                count: counts[id],
            }),
            None => Ok(()),
        }
    }

    pub fn into_ids(self) -> Vec<CardId> {
        self.ids
    }
}

/// Deals a predetermined order, used for replays and scripted boards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedDeck {
    ids: Vec<CardId>,
}

impl FixedDeck {
    pub fn new(ids: &[CardId]) -> Self {
        Self { ids: ids.to_vec() }
    }
}

impl DeckGenerator for FixedDeck {
    fn generate(self, config: GameConfig) -> Deck {
        if self.ids.len() != usize::from(config.total_cards()) {
            log::warn!(
                "Fixed deck has {} cards, board needs {}",
                self.ids.len(),
                config.total_cards()
            );
        }
        Deck::restore(&self.ids)
    }
}
