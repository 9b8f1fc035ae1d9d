use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cards laid out row-major on a `rows x columns` grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    cards: Array2<Card>,
}

impl Board {
    /// Lays out `deck` in positional order, all cards face-down.
    ///
    /// The deck must fill the grid and hold every id in `[0, pairs)` exactly
    /// twice, otherwise the board could never be cleared.
    pub fn new(config: GameConfig, deck: Deck) -> Result<Self> {
        if deck.len() != usize::from(config.total_cards()) {
            return Err(GameError::InvalidBoardShape);
        }
        deck.check_pairs().map_err(|reason| match reason {
            CorruptSave::UnpairedId { id, count } => GameError::UnpairedDeck { id, count },
            other => other.into(),
        })?;
        let cards = deck.into_ids().into_iter().map(Card::new).collect();
        let cards = Array2::from_shape_vec(config.size().to_nd_index(), cards)
            .map_err(|_| GameError::InvalidBoardShape)?;
        Ok(Self { config, cards })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Pos2 {
        self.config.size()
    }

    pub fn len(&self) -> CardCount {
        self.config.total_cards()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate_index(&self, index: CardCount) -> Result<Pos2> {
        self.config
            .position_of(index)
            .ok_or(GameError::InvalidCardIndex(index))
    }

    pub fn card(&self, index: CardCount) -> Result<&Card> {
        let pos = self.validate_index(index)?;
        Ok(&self.cards[pos.to_nd_index()])
    }

    pub(crate) fn card_mut(&mut self, index: CardCount) -> Result<&mut Card> {
        let pos = self.validate_index(index)?;
        Ok(&mut self.cards[pos.to_nd_index()])
    }

    pub fn card_at(&self, pos: Pos2) -> Option<&Card> {
        self.cards.get(pos.to_nd_index())
    }

    /// Cards in positional order, `index = row * columns + col`.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = &Card>> {
        self.cards.rows().into_iter().map(|row| row.into_iter())
    }

    pub fn matched_pairs(&self) -> CardCount {
        let matched = self.iter().filter(|card| card.is_matched()).count();
        (matched / 2).try_into().unwrap_or(CardCount::MAX)
    }

    pub fn ids(&self) -> Vec<CardId> {
        self.iter().map(Card::id).collect()
    }
}
