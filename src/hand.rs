use serde::Serialize;

use crate::card::Card;
use crate::error::IllegalAction;

/// Blackjack total of `cards`: every Ace starts at 1 and Aces are promoted to
/// 11 one at a time while the running total is 11 or less.
pub fn hand_value(cards: &[Card]) -> u8 {
    let (total, _) = value_with_softness(cards);
    total
}

fn value_with_softness(cards: &[Card]) -> (u8, bool) {
    let mut total: u8 = 0;
    let mut aces = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        total = total.saturating_add(card.rank.value());
    }

    let mut soft = false;
    while aces > 0 && total <= 11 {
        total += 10;
        aces -= 1;
        soft = true;
    }

    (total, soft)
}

/// True when an Ace is currently counted as 11.
pub fn is_soft(cards: &[Card]) -> bool {
    value_with_softness(cards).1
}

pub fn has_ace(cards: &[Card]) -> bool {
    cards.iter().any(Card::is_ace)
}

pub fn is_bust(cards: &[Card]) -> bool {
    hand_value(cards) > 21
}

/// Total of exactly 21, whatever the card count.
pub fn is_twenty_one(cards: &[Card]) -> bool {
    hand_value(cards) == 21
}

/// A two-card 21.
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && is_twenty_one(cards)
}

/// Two cards of equal blackjack value, so a Ten and a Jack pair up.
pub fn can_split_cards(cards: &[Card]) -> bool {
    cards.len() == 2 && cards[0].rank.value() == cards[1].rank.value()
}

/// The dealer's hand. The first card dealt is the hole card and stays face
/// down until revealed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerHand {
    cards: Vec<Card>,
    hole_card_hidden: bool,
}

impl DealerHand {
    pub fn new() -> Self {
        DealerHand {
            cards: Vec::new(),
            hole_card_hidden: true,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_hole_card_hidden(&self) -> bool {
        self.hole_card_hidden
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        if self.cards.len() > 2 {
            self.reveal_hole_card();
        }
    }

    pub fn reveal_hole_card(&mut self) {
        self.hole_card_hidden = false;
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.hole_card_hidden = true;
    }

    /// Cards a player can see.
    pub fn visible_cards(&self) -> &[Card] {
        if self.hole_card_hidden && !self.cards.is_empty() {
            &self.cards[1..]
        } else {
            &self.cards
        }
    }

    pub fn up_card(&self) -> Option<&Card> {
        self.cards.get(1)
    }

    /// Total of the visible cards only.
    pub fn total(&self) -> u8 {
        hand_value(self.visible_cards())
    }

    pub fn is_soft(&self) -> bool {
        is_soft(self.visible_cards())
    }

    pub fn is_bust(&self) -> bool {
        self.total() > 21
    }

    pub fn is_natural(&self) -> bool {
        !self.hole_card_hidden && is_natural(&self.cards)
    }
}

impl Default for DealerHand {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHand {
    cards: Vec<Card>,
    bet: f64,
    stood: bool,
    doubled: bool,
    surrendered: bool,
}

impl PlayerHand {
    pub fn new(bet: f64) -> Self {
        PlayerHand {
            cards: Vec::new(),
            bet,
            stood: false,
            doubled: false,
            surrendered: false,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    /// Bets are fixed once the hand holds a card.
    pub(crate) fn set_bet(&mut self, bet: f64) -> Result<(), IllegalAction> {
        if !self.cards.is_empty() {
            return Err(IllegalAction::BetLocked);
        }
        self.bet = bet;
        Ok(())
    }

    pub fn has_stood(&self) -> bool {
        self.stood
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn is_surrendered(&self) -> bool {
        self.surrendered
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn total(&self) -> u8 {
        hand_value(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    pub fn has_ace(&self) -> bool {
        has_ace(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        is_bust(&self.cards)
    }

    pub fn is_twenty_one(&self) -> bool {
        is_twenty_one(&self.cards)
    }

    pub fn is_natural(&self) -> bool {
        is_natural(&self.cards)
    }

    pub fn can_split(&self) -> bool {
        can_split_cards(&self.cards)
    }

    pub fn can_surrender(&self) -> bool {
        self.cards.len() == 2
    }

    pub fn can_double(&self) -> bool {
        self.cards.len() == 2
    }

    /// Takes the second card of a splittable pair. Returns `None` and leaves
    /// the hand alone when it is not a pair.
    pub fn split(&mut self) -> Option<Card> {
        if !self.can_split() {
            return None;
        }
        self.cards.pop()
    }

    pub fn stand(&mut self) {
        self.stood = true;
    }

    pub(crate) fn double_bet(&mut self) {
        self.bet *= 2.0;
        self.doubled = true;
    }

    pub(crate) fn surrender(&mut self) {
        self.surrendered = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(Suit::Spade, r)).collect()
    }

    #[test]
    fn test_hand_value_simple() {
        assert_eq!(hand_value(&cards(&[Rank::Two, Rank::Three])), 5);
        assert_eq!(hand_value(&cards(&[Rank::King, Rank::Queen])), 20);
        assert_eq!(hand_value(&[]), 0);
    }

    #[test]
    fn test_hand_value_soft_ace() {
        let hand = cards(&[Rank::Ace, Rank::Six]);
        assert_eq!(hand_value(&hand), 17);
        assert!(is_soft(&hand));
    }

    #[test]
    fn test_hand_value_hard_ace() {
        let hand = cards(&[Rank::Ace, Rank::Six, Rank::Nine]);
        assert_eq!(hand_value(&hand), 16);
        assert!(!is_soft(&hand));
        assert!(has_ace(&hand));
    }

    #[test]
    fn test_hand_value_multiple_aces() {
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Nine])), 21);
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Ace])), 12);
        assert_eq!(
            hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Ace, Rank::Ace])),
            14
        );
    }

    #[test]
    fn test_hand_value_bounded_by_card_count() {
        let sets = [
            cards(&[Rank::Ace]),
            cards(&[Rank::Ace, Rank::Ace, Rank::Ace]),
            cards(&[Rank::King, Rank::Queen, Rank::Jack]),
            cards(&[Rank::Two, Rank::Two, Rank::Two, Rank::Two]),
            cards(&[Rank::Ace, Rank::Five, Rank::Ace, Rank::Ten]),
        ];
        for hand in &sets {
            let total = hand_value(hand) as usize;
            assert!(total >= hand.len());
            assert!(total <= hand.len() * 11);
        }
    }

    #[test]
    fn test_bust() {
        assert!(is_bust(&cards(&[Rank::King, Rank::Queen, Rank::Five])));
        assert!(!is_bust(&cards(&[Rank::King, Rank::Ace])));
    }

    #[test]
    fn test_twenty_one_versus_natural() {
        let natural = cards(&[Rank::Ace, Rank::King]);
        assert!(is_twenty_one(&natural));
        assert!(is_natural(&natural));

        let built = cards(&[Rank::Seven, Rank::Seven, Rank::Seven]);
        assert!(is_twenty_one(&built));
        assert!(!is_natural(&built));
    }

    #[test]
    fn test_split_pairs_by_value() {
        assert!(can_split_cards(&cards(&[Rank::Ten, Rank::Jack])));
        assert!(can_split_cards(&cards(&[Rank::Eight, Rank::Eight])));
        assert!(!can_split_cards(&cards(&[Rank::Eight, Rank::Nine])));
        assert!(!can_split_cards(&cards(&[Rank::Eight, Rank::Eight, Rank::Two])));
    }

    #[test]
    fn test_player_hand_split_takes_second_card() {
        let mut hand = PlayerHand::new(50.0);
        hand.add_card(Card::new(Suit::Heart, Rank::Eight));
        hand.add_card(Card::new(Suit::Club, Rank::Eight));
        let moved = hand.split();
        assert_eq!(moved, Some(Card::new(Suit::Club, Rank::Eight)));
        assert_eq!(hand.cards(), &[Card::new(Suit::Heart, Rank::Eight)]);
    }

    #[test]
    fn test_player_hand_split_noop_without_pair() {
        let mut hand = PlayerHand::new(50.0);
        hand.add_card(Card::new(Suit::Heart, Rank::Eight));
        hand.add_card(Card::new(Suit::Club, Rank::Nine));
        assert_eq!(hand.split(), None);
        assert_eq!(hand.cards().len(), 2);
    }

    #[test]
    fn test_bet_locked_after_cards() {
        let mut hand = PlayerHand::new(25.0);
        assert!(hand.set_bet(40.0).is_ok());
        hand.add_card(Card::new(Suit::Heart, Rank::Two));
        assert_eq!(hand.set_bet(100.0), Err(IllegalAction::BetLocked));
        assert_eq!(hand.bet(), 40.0);
    }

    #[test]
    fn test_can_surrender_needs_two_cards() {
        let mut hand = PlayerHand::new(25.0);
        hand.add_card(Card::new(Suit::Heart, Rank::Ten));
        assert!(!hand.can_surrender());
        hand.add_card(Card::new(Suit::Heart, Rank::Six));
        assert!(hand.can_surrender());
        hand.add_card(Card::new(Suit::Heart, Rank::Two));
        assert!(!hand.can_surrender());
    }

    #[test]
    fn test_dealer_hides_hole_card() {
        let mut dealer = DealerHand::new();
        dealer.add_card(Card::new(Suit::Heart, Rank::King));
        dealer.add_card(Card::new(Suit::Spade, Rank::Ace));
        assert!(dealer.is_hole_card_hidden());
        assert_eq!(dealer.total(), 11);
        assert!(!dealer.is_natural());

        dealer.reveal_hole_card();
        dealer.reveal_hole_card();
        assert!(!dealer.is_hole_card_hidden());
        assert_eq!(dealer.total(), 21);
        assert!(dealer.is_natural());
    }

    #[test]
    fn test_dealer_third_card_reveals() {
        let mut dealer = DealerHand::new();
        dealer.add_card(Card::new(Suit::Heart, Rank::Five));
        dealer.add_card(Card::new(Suit::Spade, Rank::Six));
        dealer.add_card(Card::new(Suit::Club, Rank::Two));
        assert!(!dealer.is_hole_card_hidden());
        assert_eq!(dealer.total(), 13);
    }

    #[test]
    fn test_dealer_clear_hides_again() {
        let mut dealer = DealerHand::new();
        dealer.add_card(Card::new(Suit::Heart, Rank::Five));
        dealer.reveal_hole_card();
        dealer.clear();
        assert!(dealer.cards().is_empty());
        assert!(dealer.is_hole_card_hidden());
        assert_eq!(dealer.total(), 0);
    }
}
