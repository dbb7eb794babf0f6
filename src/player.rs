use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::deck::Shoe;
use crate::error::{Error, IllegalAction, Result};
use crate::hand::{DealerHand, PlayerHand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HandOutcome {
    Win,
    Blackjack,
    Loss,
    Push,
    Surrender,
}

/// Result of settling one hand; `net` is the change applied to the bankroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub player: PlayerId,
    pub hand_index: usize,
    pub outcome: HandOutcome,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    id: PlayerId,
    name: String,
    bankroll: f64,
    hands: Vec<PlayerHand>,
    active_hand_index: Option<usize>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, bankroll: f64) -> Self {
        Player {
            id,
            name: name.into(),
            bankroll,
            hands: Vec::new(),
            active_hand_index: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn hands(&self) -> &[PlayerHand] {
        &self.hands
    }

    pub fn active_hand_index(&self) -> Option<usize> {
        self.active_hand_index
    }

    /// Bankroll not yet committed to this round's hands.
    pub fn available(&self) -> f64 {
        self.bankroll - self.hands.iter().map(PlayerHand::bet).sum::<f64>()
    }

    pub fn add_hand(&mut self, bet: f64, first_card: Option<Card>) -> Result<()> {
        if bet > self.available() {
            return Err(IllegalAction::InsufficientBankroll.into());
        }
        let mut hand = PlayerHand::new(bet);
        if let Some(card) = first_card {
            hand.add_card(card);
        }
        self.hands.push(hand);
        if self.hands.len() == 1 {
            self.active_hand_index = Some(0);
        }
        Ok(())
    }

    /// Replaces the stake on a hand that has not been dealt yet.
    pub fn change_bet(&mut self, hand_index: usize, bet: f64) -> Result<()> {
        let staked = self
            .hands
            .get(hand_index)
            .ok_or(IllegalAction::NoActiveHand)?
            .bet();
        if bet > self.available() + staked {
            return Err(IllegalAction::InsufficientBankroll.into());
        }
        self.hands[hand_index].set_bet(bet)?;
        Ok(())
    }

    pub fn current_hand(&self) -> Option<&PlayerHand> {
        self.active_hand_index.and_then(|i| self.hands.get(i))
    }

    fn current_hand_mut(&mut self) -> Result<&mut PlayerHand> {
        let index = self.active_hand_index.ok_or(IllegalAction::NoActiveHand)?;
        self.hands
            .get_mut(index)
            .ok_or_else(|| IllegalAction::NoActiveHand.into())
    }

    pub(crate) fn deal_to(&mut self, hand_index: usize, card: Card) {
        if let Some(hand) = self.hands.get_mut(hand_index) {
            hand.add_card(card);
        }
    }

    #[cfg(test)]
    pub(crate) fn hands_mut(&mut self) -> &mut [PlayerHand] {
        &mut self.hands
    }

    fn step(&mut self) {
        self.active_hand_index = match self.active_hand_index {
            Some(i) if i + 1 < self.hands.len() => Some(i + 1),
            _ => None,
        };
    }

    /// Moves the cursor to the next hand still to play, or clears it after
    /// the last one.
    fn advance(&mut self) {
        self.step();
        self.skip_finished_hands();
    }

    /// Passes over hands that already total 21 or more.
    pub(crate) fn skip_finished_hands(&mut self) {
        while let Some(hand) = self.current_hand() {
            if hand.total() < 21 {
                break;
            }
            self.step();
        }
    }

    /// Drops this round's hands without touching the bankroll.
    pub(crate) fn clear_hands(&mut self) {
        self.hands.clear();
        self.active_hand_index = None;
    }

    pub fn hit(&mut self, card: Card) -> Result<()> {
        let hand = self.current_hand_mut()?;
        hand.add_card(card);
        if hand.total() >= 21 {
            self.advance();
        }
        Ok(())
    }

    pub fn stand(&mut self) -> Result<()> {
        self.current_hand_mut()?.stand();
        self.advance();
        Ok(())
    }

    pub fn can_double_down(&self) -> bool {
        self.current_hand()
            .map_or(false, |hand| hand.can_double() && hand.bet() <= self.available())
    }

    /// Draws exactly one card, doubles the bet and finishes the hand.
    pub fn double_down(&mut self, shoe: &mut Shoe) -> Result<Card> {
        let hand = self.current_hand().ok_or(IllegalAction::NoActiveHand)?;
        if !hand.can_double() {
            return Err(IllegalAction::CannotDouble.into());
        }
        if hand.bet() > self.available() {
            return Err(IllegalAction::InsufficientBankroll.into());
        }

        let card = shoe.draw()?;
        let hand = self.current_hand_mut()?;
        hand.add_card(card);
        hand.double_bet();
        hand.stand();
        self.advance();
        Ok(card)
    }

    pub fn can_split(&self) -> bool {
        self.current_hand()
            .map_or(false, |hand| hand.can_split() && hand.bet() <= self.available())
    }

    /// Moves the second card of the current pair into a new hand with the same
    /// bet, then deals one card to each. The original hand stays current.
    pub fn split(&mut self, shoe: &mut Shoe) -> Result<()> {
        let hand = self.current_hand().ok_or(IllegalAction::NoActiveHand)?;
        if !hand.can_split() {
            return Err(IllegalAction::CannotSplit.into());
        }
        let bet = hand.bet();
        if bet > self.available() {
            return Err(IllegalAction::InsufficientBankroll.into());
        }
        if shoe.remaining() < 2 {
            return Err(Error::EmptyShoe);
        }

        let hand = self.current_hand_mut()?;
        let moved = hand.split().ok_or(IllegalAction::CannotSplit)?;
        hand.add_card(shoe.draw()?);

        let mut new_hand = PlayerHand::new(bet);
        new_hand.add_card(moved);
        new_hand.add_card(shoe.draw()?);
        self.hands.push(new_hand);
        self.skip_finished_hands();
        Ok(())
    }

    pub fn surrender(&mut self) -> Result<()> {
        let hand = self.current_hand_mut()?;
        if !hand.can_surrender() {
            return Err(IllegalAction::CannotSurrender.into());
        }
        hand.surrender();
        self.advance();
        Ok(())
    }

    /// Settles every hand against the dealer, applies the result to the
    /// bankroll and clears the hands for the next round.
    pub fn handle_end_round(
        &mut self,
        dealer: &DealerHand,
        blackjack_payout: f64,
    ) -> Vec<Settlement> {
        let settlements: Vec<Settlement> = self
            .hands
            .iter()
            .enumerate()
            .map(|(hand_index, hand)| {
                let (outcome, net) = settle_hand(hand, dealer, blackjack_payout);
                Settlement {
                    player: self.id,
                    hand_index,
                    outcome,
                    net,
                }
            })
            .collect();

        self.bankroll += settlements.iter().map(|s| s.net).sum::<f64>();
        self.clear_hands();
        settlements
    }
}

fn settle_hand(
    hand: &PlayerHand,
    dealer: &DealerHand,
    blackjack_payout: f64,
) -> (HandOutcome, f64) {
    let bet = hand.bet();
    if hand.is_surrendered() {
        return (HandOutcome::Surrender, -bet / 2.0);
    }

    let player_bust = hand.is_bust();
    let dealer_bust = dealer.is_bust();
    let player_natural = hand.is_natural();
    let dealer_natural = dealer.is_natural();

    match (player_bust, dealer_bust) {
        (true, true) => return (HandOutcome::Push, 0.0),
        (false, true) => return (HandOutcome::Win, bet),
        (true, false) => return (HandOutcome::Loss, -bet),
        (false, false) => {}
    }

    match (player_natural, dealer_natural) {
        (false, true) => return (HandOutcome::Loss, -bet),
        (true, true) => return (HandOutcome::Push, 0.0),
        (true, false) => return (HandOutcome::Blackjack, bet * blackjack_payout),
        (false, false) => {}
    }

    let player_total = hand.total();
    let dealer_total = dealer.total();
    if player_total > dealer_total {
        (HandOutcome::Win, bet)
    } else if player_total < dealer_total {
        (HandOutcome::Loss, -bet)
    } else {
        (HandOutcome::Push, 0.0)
    }
}
