use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Suit {
    Heart,
    Spade,
    Diamond,
    Club,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Spade, Suit::Diamond, Suit::Club];

    pub fn symbol(&self) -> char {
        match self {
            Suit::Heart => '\u{2665}',
            Suit::Spade => '\u{2660}',
            Suit::Diamond => '\u{2666}',
            Suit::Club => '\u{2663}',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Face number, 1 (Ace) through 13 (King).
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Hard blackjack value: Ace counts 1, face cards 10.
    pub fn value(&self) -> u8 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            _ => self.number(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

/// A playing card. `id` is stamped by the shoe when the card is dealt so a
/// renderer can tell two identical cards apart; it takes no part in equality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    #[serde(default)]
    pub id: u32,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card { suit, rank, id: 0 }
    }

    pub(crate) fn with_id(self, id: u32) -> Self {
        Card { id, ..self }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    /// Value used when only this card is visible: Ace 11, faces 10.
    pub fn face_value(&self) -> u8 {
        if self.is_ace() {
            11
        } else {
            self.rank.value()
        }
    }

    /// Glyph from the Unicode "Playing Cards" block.
    pub fn unicode(&self) -> char {
        let suit_base: u32 = match self.suit {
            Suit::Spade => 0x1F0A0,
            Suit::Heart => 0x1F0B0,
            Suit::Diamond => 0x1F0C0,
            Suit::Club => 0x1F0D0,
        };
        // 0xC is the Knight, which standard decks skip
        let offset = match self.rank.number() {
            n @ 1..=11 => n as u32,
            n => n as u32 + 1,
        };
        char::from_u32(suit_base + offset).unwrap_or('\u{1F0A0}')
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }
}

impl Eq for Card {}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.suit.hash(state);
        self.rank.hash(state);
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}
