use serde::{Deserialize, Serialize};

use crate::CardId;

/// A single card on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    face_up: bool,
    matched: bool,
}

impl Card {
    pub const fn new(id: CardId) -> Self {
        Self {
            id,
            face_up: false,
            matched: false,
        }
    }

    pub const fn id(&self) -> CardId {
        self.id
    }

    pub const fn is_face_up(&self) -> bool {
        self.face_up
    }

    pub const fn is_matched(&self) -> bool {
        self.matched
    }

    /// Whether a player flip on this card would do anything.
    pub const fn is_flippable(&self) -> bool {
        !self.matched && !self.face_up
    }

    /// Toggles the face, matched cards stay put. Returns whether the face changed.
    pub fn flip(&mut self) -> bool {
        if self.matched {
            return false;
        }
        self.face_up = !self.face_up;
        true
    }

    /// Turns the card face-up without toggling, returns whether the face changed.
    pub fn reveal(&mut self) -> bool {
        let changed = !self.face_up;
        self.face_up = true;
        changed
    }

    /// Monotonic, the card never leaves the matched state.
    pub fn set_matched(&mut self) {
        self.matched = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_toggles_until_matched() {
        let mut card = Card::new(3);
        assert!(card.is_flippable());

        assert!(card.flip());
        assert!(card.is_face_up());
        assert!(!card.is_flippable());

        card.set_matched();
        card.set_matched();
        assert!(!card.flip());
        assert!(card.is_face_up());
        assert!(card.is_matched());
    }

    #[test]
    fn set_matched_does_not_force_face_up() {
        let mut card = Card::new(0);
        card.set_matched();

        assert!(!card.is_face_up());
        assert!(card.reveal());
        assert!(!card.reveal());
        assert!(card.is_face_up());
    }
}
