use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Fisher-Yates shuffle of the ordered deck, seeded for reproducibility.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDeckGenerator {
    seed: u64,
}

impl RandomDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds from the thread rng.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DeckGenerator for RandomDeckGenerator {
    fn generate(self, config: GameConfig) -> Deck {
        let mut ids = Deck::ordered(config).into_ids();
        let mut rng = SmallRng::seed_from_u64(self.seed);

        for i in (1..ids.len()).rev() {
            let j = rng.random_range(0..=i);
            ids.swap(i, j);
        }

        log::debug!(
            "Generated {}x{} deck with seed {}",
            config.rows(),
            config.columns(),
            self.seed
        );
        log::trace!("Deck order: {:?}", ids);
        Deck { ids }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn sorted(deck: &Deck) -> Vec<CardId> {
        let mut ids = deck.ids().to_vec();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn shuffle_keeps_the_multiset() {
        for difficulty in Difficulty::ALL {
            let config = difficulty.config();
            for seed in 0..32 {
                let deck = RandomDeckGenerator::new(seed).generate(config);
                assert_eq!(deck.len(), usize::from(config.total_cards()));
                assert_eq!(deck.check_pairs(), Ok(()));
                assert_eq!(sorted(&deck), Deck::ordered(config).into_ids());
            }
        }
    }

    #[test]
    fn same_seed_same_order() {
        let config = GameConfig::new(5, 6).unwrap();

        let a = RandomDeckGenerator::new(7).generate(config);
        let b = RandomDeckGenerator::new(7).generate(config);

        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_changes_order() {
        let config = GameConfig::new(5, 6).unwrap();
        let ordered = Deck::ordered(config);

        let shuffled = (0..8)
            .map(|seed| RandomDeckGenerator::new(seed).generate(config))
            .filter(|deck| *deck != ordered)
            .count();

        assert!(shuffled > 0);
    }
}
