use serde::{Deserialize, Serialize};

use crate::*;

/// Linear dimension, used for board rows and columns.
pub type Dim = u8;

/// Count type used for card totals and board positions.
pub type CardCount = u16;

/// Pair identifier; two cards share an id iff they match.
pub type CardId = u16;

/// Grid position `(row, col)`.
pub type Pos2 = (Dim, Dim);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Pos2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Dim, b: Dim) -> CardCount {
    let a = a as CardCount;
    let b = b as CardCount;
    a.saturating_mul(b)
}

/// Validated board dimensions, `rows * columns` is always even and positive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    rows: Dim,
    columns: Dim,
}

impl GameConfig {
    pub fn new(rows: Dim, columns: Dim) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidDimensions { rows, columns });
        }
        if mult(rows, columns) % 2 != 0 {
            return Err(GameError::OddCardCount { rows, columns });
        }
        Ok(Self { rows, columns })
    }

    /// Same as [`GameConfig::new`] but for dimensions read back from a save,
    /// the error carries the values exactly as stored.
    pub fn from_raw(rows: i64, columns: i64) -> core::result::Result<Self, CorruptSave> {
        let invalid = CorruptSave::InvalidDimensions { rows, columns };
        match (Dim::try_from(rows), Dim::try_from(columns)) {
            (Ok(rows), Ok(columns)) => Self::new(rows, columns).map_err(|_| invalid),
            _ => Err(invalid),
        }
    }

    pub const fn rows(&self) -> Dim {
        self.rows
    }

    pub const fn columns(&self) -> Dim {
        self.columns
    }

    pub const fn size(&self) -> Pos2 {
        (self.rows, self.columns)
    }

    pub const fn total_cards(&self) -> CardCount {
        mult(self.rows, self.columns)
    }

    pub const fn total_pairs(&self) -> CardCount {
        self.total_cards() / 2
    }

    /// Maps a positional index to its grid cell, `None` when out of bounds.
    pub fn position_of(&self, index: CardCount) -> Option<Pos2> {
        if index >= self.total_cards() {
            return None;
        }
        let columns = CardCount::from(self.columns);
        let row = (index / columns).try_into().ok()?;
        let col = (index % columns).try_into().ok()?;
        Some((row, col))
    }

    pub fn index_of(&self, (row, col): Pos2) -> Option<CardCount> {
        if row < self.rows && col < self.columns {
            Some(CardCount::from(row) * CardCount::from(self.columns) + CardCount::from(col))
        } else {
            None
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::default().config()
    }
}

/// Board presets offered by the menu.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn config(self) -> GameConfig {
        let (rows, columns) = match self {
            Difficulty::Easy => (2, 2),
            Difficulty::Medium => (3, 4),
            Difficulty::Hard => (5, 6),
        };
        GameConfig { rows, columns }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value.trim()))
    }
}

/// Derives the score from the number of turns taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRules {
    pub base_score: u32,
    pub turn_penalty: u32,
}

impl ScoreRules {
    pub const fn new(base_score: u32, turn_penalty: u32) -> Self {
        Self {
            base_score,
            turn_penalty,
        }
    }

    /// `max(0, base_score - turns * turn_penalty)`
    pub const fn score_for(&self, turns: u32) -> u32 {
        self.base_score
            .saturating_sub(turns.saturating_mul(self.turn_penalty))
    }
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self::new(5000, 50)
    }
}
