use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::collections::btree_map::Entry;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Store keys of a saved session.
pub mod keys {
    use alloc::format;
    use alloc::string::String;

    pub const ROWS: &str = "Rows";
    pub const COLUMNS: &str = "Columns";
    pub const CURRENT_MATCHES: &str = "CurrentMatches";
    pub const TOTAL_MATCHES: &str = "TotalMatches";
    pub const TURNS_TAKEN: &str = "TurnsTaken";
    pub const SCORE: &str = "Score";
    pub const CARD_COUNT: &str = "CardCount";

    pub fn card_id(index: usize) -> String {
        format!("CardID_{index}")
    }

    pub fn card_matched(index: usize) -> String {
        format!("CardMatched_{index}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardState {
    pub id: CardId,
    pub matched: bool,
}

/// Everything needed to put a board back exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub rows: Dim,
    pub columns: Dim,
    pub current_matches: CardCount,
    pub total_matches: CardCount,
    pub turns_taken: u32,
    pub score: u32,
    /// Positional order, same as [`Board::iter`].
    pub cards: Vec<CardState>,
}

impl SavedSession {
    pub fn capture(board: &Board, session: &Session) -> Self {
        let config = board.config();
        Self {
            rows: config.rows(),
            columns: config.columns(),
            current_matches: session.current_matches(),
            total_matches: session.total_matches(),
            turns_taken: session.turns_taken(),
            score: session.score(),
            cards: board
                .iter()
                .map(|card| CardState {
                    id: card.id(),
                    matched: card.is_matched(),
                })
                .collect(),
        }
    }

    pub fn config(&self) -> Result<GameConfig> {
        GameConfig::new(self.rows, self.columns).map_err(|_| {
            CorruptSave::InvalidDimensions {
                rows: self.rows.into(),
                columns: self.columns.into(),
            }
            .into()
        })
    }

    pub fn session(&self) -> Session {
        Session::from_counters(
            self.current_matches,
            self.total_matches,
            self.turns_taken,
            self.score,
        )
    }

    pub fn ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|state| state.id).collect()
    }

    /// Checks the record describes a board that could have been played.
    pub fn validate(&self) -> Result<GameConfig> {
        let config = self.config()?;

        if self.cards.len() != usize::from(config.total_cards()) {
            return Err(CorruptSave::CardCountMismatch {
                expected: config.total_cards(),
                found: self.cards.len().try_into().unwrap_or(i64::MAX),
            }
            .into());
        }

        Deck::restore(&self.ids()).check_pairs()?;

        let mut pair_matched = BTreeMap::new();
        for state in &self.cards {
            match pair_matched.entry(state.id) {
                Entry::Vacant(entry) => {
                    entry.insert(state.matched);
                }
                Entry::Occupied(entry) if *entry.get() != state.matched => {
                    return Err(CorruptSave::HalfMatchedPair(state.id).into());
                }
                Entry::Occupied(_) => {}
            }
        }

        if self.total_matches != config.total_pairs() {
            return Err(CorruptSave::InconsistentCounter(keys::TOTAL_MATCHES).into());
        }
        let matched_pairs = pair_matched.values().filter(|&&matched| matched).count();
        if usize::from(self.current_matches) != matched_pairs {
            return Err(CorruptSave::InconsistentCounter(keys::CURRENT_MATCHES).into());
        }
        if self.turns_taken < u32::from(self.current_matches) {
            return Err(CorruptSave::InconsistentCounter(keys::TURNS_TAKEN).into());
        }

        Ok(config)
    }

    /// Board and counters in the saved order, matched cards face-up.
    pub fn rebuild(&self) -> Result<(Board, Session)> {
        let config = self.validate()?;
        let mut board = Board::new(config, Deck::restore(&self.ids()))?;
        for (index, state) in (0..).zip(&self.cards) {
            if state.matched {
                let card = board.card_mut(index)?;
                card.reveal();
                card.set_matched();
            }
        }
        Ok((board, self.session()))
    }

    /// Flattens the record into `store`, replacing any previous save.
    pub fn save(&self, store: &mut impl KeyValueStore) {
        let previous_count = stored_card_count(store);

        store.set_int(keys::COLUMNS, self.columns.into());
        store.set_int(keys::CURRENT_MATCHES, self.current_matches.into());
        store.set_int(keys::TOTAL_MATCHES, self.total_matches.into());
        store.set_int(keys::TURNS_TAKEN, self.turns_taken.into());
        store.set_int(keys::SCORE, self.score.into());
        store.set_int(
            keys::CARD_COUNT,
            self.cards.len().try_into().unwrap_or(i64::MAX),
        );
        for (index, state) in self.cards.iter().enumerate() {
            store.set_int(&keys::card_id(index), state.id.into());
            store.set_int(&keys::card_matched(index), state.matched.into());
        }
        for index in self.cards.len()..previous_count {
            store.remove(&keys::card_id(index));
            store.remove(&keys::card_matched(index));
        }
        // `Rows` marks the save as present, written last
        store.set_int(keys::ROWS, self.rows.into());

        log::debug!(
            "Saved {}x{} session, {} turns taken",
            self.rows,
            self.columns,
            self.turns_taken
        );
    }

    /// Reads a save back, `Ok(None)` when the store holds no save at all.
    pub fn load(store: &impl KeyValueStore) -> Result<Option<Self>> {
        if !store.has_key(keys::ROWS) {
            log::debug!("No saved game found");
            return Ok(None);
        }

        let saved = read_session(store).inspect_err(|err| {
            log::warn!("Rejecting saved game: {}", err);
        })?;
        saved.validate().inspect_err(|err| {
            log::warn!("Rejecting saved game: {}", err);
        })?;
        Ok(Some(saved))
    }
}

/// Removes a save written by [`SavedSession::save`], other keys are left alone.
pub fn clear_save(store: &mut impl KeyValueStore) {
    let count = stored_card_count(store);
    store.remove(keys::ROWS);
    for key in [
        keys::COLUMNS,
        keys::CURRENT_MATCHES,
        keys::TOTAL_MATCHES,
        keys::TURNS_TAKEN,
        keys::SCORE,
        keys::CARD_COUNT,
    ] {
        store.remove(key);
    }
    for index in 0..count {
        store.remove(&keys::card_id(index));
        store.remove(&keys::card_matched(index));
    }
}

fn stored_card_count(store: &impl KeyValueStore) -> usize {
    store
        .get_int(keys::CARD_COUNT)
        .and_then(|count| usize::try_from(count).ok())
        .unwrap_or(0)
        .min(CardCount::MAX.into())
}

type ReadResult<T> = core::result::Result<T, CorruptSave>;

fn read(store: &impl KeyValueStore, key: &str) -> ReadResult<i64> {
    store
        .get_int(key)
        .ok_or_else(|| CorruptSave::MissingKey(key.to_owned()))
}

fn read_as<T: TryFrom<i64>>(store: &impl KeyValueStore, key: &str) -> ReadResult<T> {
    let value = read(store, key)?;
    T::try_from(value).map_err(|_| CorruptSave::OutOfRange {
        key: key.to_owned(),
        value,
    })
}

fn read_flag(store: &impl KeyValueStore, key: &str) -> ReadResult<bool> {
    match read(store, key)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(CorruptSave::OutOfRange {
            key: key.to_owned(),
            value,
        }),
    }
}

fn read_session(store: &impl KeyValueStore) -> ReadResult<SavedSession> {
    let rows = read(store, keys::ROWS)?;
    let columns = read(store, keys::COLUMNS)?;
    let config = GameConfig::from_raw(rows, columns)?;

    let card_count = read(store, keys::CARD_COUNT)?;
    if card_count != i64::from(config.total_cards()) {
        return Err(CorruptSave::CardCountMismatch {
            expected: config.total_cards(),
            found: card_count,
        });
    }

    let cards = (0..usize::from(config.total_cards()))
        .map(|index| {
            Ok(CardState {
                id: read_as(store, &keys::card_id(index))?,
                matched: read_flag(store, &keys::card_matched(index))?,
            })
        })
        .collect::<ReadResult<Vec<_>>>()?;

    Ok(SavedSession {
        rows: config.rows(),
        columns: config.columns(),
        current_matches: read_as(store, keys::CURRENT_MATCHES)?,
        total_matches: read_as(store, keys::TOTAL_MATCHES)?,
        turns_taken: read_as(store, keys::TURNS_TAKEN)?,
        score: read_as(store, keys::SCORE)?,
        cards,
    })
}
