use log::debug;
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

use crate::card::{Card, Rank, Suit};
use crate::error::{Error, Result};

/// Fraction of the shoe that may be dealt before the next round boundary
/// triggers a reshuffle.
pub const RESHUFFLE_PENETRATION: f64 = 0.5;

pub const CARDS_PER_DECK: usize = 52;

/// One or more 52-card decks. The top of the shoe is the end of `cards`.
pub struct Shoe {
    total_decks: u8,
    cards: Vec<Card>,
    used: usize,
    next_id: u32,
    rng: SmallRng,
}

impl Shoe {
    /// Builds and shuffles a shoe. With no seed the RNG is drawn from entropy.
    pub fn new(total_decks: u8, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut shoe = Shoe {
            total_decks: 0,
            cards: Vec::new(),
            used: 0,
            next_id: 0,
            rng,
        };
        shoe.populate(total_decks)?;
        shoe.shuffle();
        Ok(shoe)
    }

    /// Refills the shoe with `total_decks` full decks in suit/rank order.
    pub fn populate(&mut self, total_decks: u8) -> Result<()> {
        if total_decks < 1 {
            return Err(Error::InvalidDeckCount(total_decks));
        }
        self.total_decks = total_decks;
        self.refill();
        Ok(())
    }

    fn refill(&mut self) {
        self.cards.clear();
        for _ in 0..self.total_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    self.cards.push(Card::new(suit, rank));
                }
            }
        }
        self.used = 0;
    }

    /// Full reshuffle: every card returns to the shoe before shuffling.
    pub fn shuffle(&mut self) {
        self.refill();
        self.cards.shuffle(&mut self.rng);
        debug!("shuffled {} decks", self.total_decks);
    }

    pub fn draw(&mut self) -> Result<Card> {
        let card = self.cards.pop().ok_or(Error::EmptyShoe)?;
        self.used += 1;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(card.with_id(self.next_id))
    }

    pub fn total_decks(&self) -> u8 {
        self.total_decks
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    /// Fraction of the shoe dealt since the last shuffle, in `[0, 1]`.
    pub fn penetration(&self) -> f64 {
        let total = self.used + self.cards.len();
        if total == 0 {
            return 0.0;
        }
        self.used as f64 / total as f64
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.penetration() > RESHUFFLE_PENETRATION
    }

    /// Shoe that deals `cards` in the given order.
    #[cfg(test)]
    pub(crate) fn stacked(cards: &[Card]) -> Self {
        let mut stack = cards.to_vec();
        stack.reverse();
        Shoe {
            total_decks: 1,
            cards: stack,
            used: 0,
            next_id: 0,
            rng: SmallRng::seed_from_u64(0),
        }
    }
}
