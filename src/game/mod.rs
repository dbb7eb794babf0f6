use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::deck::Shoe;
use crate::error::{Error, IllegalAction, Result};
use crate::hand::DealerHand;
use crate::player::{Player, PlayerId, Settlement};
use crate::rules::Rules;
use crate::strategy::{ActionOptions, Advice, StrategyChart};


fn default_num_decks() -> u8 {
    6
}

/// Round lifecycle. Cycles Preparing -> Dealing -> PlayerPlaying ->
/// DealerPlaying -> Ending -> Preparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundState {
    Preparing,
    Dealing,
    PlayerPlaying,
    DealerPlaying,
    Ending,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundState::Preparing => "preparing",
            RoundState::Dealing => "dealing",
            RoundState::PlayerPlaying => "playerPlaying",
            RoundState::DealerPlaying => "dealerPlaying",
            RoundState::Ending => "ending",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_num_decks")]
    pub num_decks: u8,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: Rules,
    /// Custom chart in the `StrategyChart::from_value` layout.
    #[serde(default)]
    pub strategy: Option<serde_json::Value>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            num_decks: default_num_decks(),
            seed: None,
            rules: Rules::default(),
            strategy: None,
        }
    }
}

/// Read-only picture of the table for the renderer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView<'a> {
    pub state: RoundState,
    pub players: &'a [Player],
    pub dealer_hand: &'a DealerHand,
    pub dealer_total: u8,
    pub rules: &'a Rules,
    pub current_player: Option<PlayerId>,
    pub cards_remaining: usize,
}

pub struct Game {
    state: RoundState,
    players: Vec<Player>,
    dealer_hand: DealerHand,
    shoe: Shoe,
    rules: Rules,
    chart: StrategyChart,
    current_player_index: Option<usize>,
    next_player_id: u32,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.rules.validate()?;
        let chart = match &config.strategy {
            Some(value) => StrategyChart::from_value(value)?,
            None => StrategyChart::basic(),
        };
        let shoe = Shoe::new(config.num_decks, config.seed)?;
        Ok(Self::with_parts(shoe, config.rules, chart))
    }

    fn with_parts(shoe: Shoe, rules: Rules, chart: StrategyChart) -> Self {
        Game {
            state: RoundState::Preparing,
            players: Vec::new(),
            dealer_hand: DealerHand::new(),
            shoe,
            rules,
            chart,
            current_player_index: None,
            next_player_id: 0,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn dealer_hand(&self) -> &DealerHand {
        &self.dealer_hand
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_index.and_then(|i| self.players.get(i))
    }

    pub fn view(&self) -> TableView<'_> {
        TableView {
            state: self.state,
            players: &self.players,
            dealer_hand: &self.dealer_hand,
            dealer_total: self.dealer_hand.total(),
            rules: &self.rules,
            current_player: self.current_player().map(Player::id),
            cards_remaining: self.shoe.remaining(),
        }
    }

    fn expect_state(&self, expected: RoundState) -> Result<()> {
        if self.state != expected {
            debug!("rejected: expected {expected}, game is {}", self.state);
            return Err(IllegalAction::WrongState {
                expected,
                actual: self.state,
            }
            .into());
        }
        Ok(())
    }

    fn player_index(&self, id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| IllegalAction::UnknownPlayer.into())
    }

    pub fn add_player(&mut self, name: impl Into<String>, bankroll: f64) -> Result<PlayerId> {
        self.expect_state(RoundState::Preparing)?;
        if !bankroll.is_finite() || bankroll < 0.0 {
            return Err(IllegalAction::InvalidBankroll.into());
        }
        self.next_player_id += 1;
        let id = PlayerId(self.next_player_id);
        let player = Player::new(id, name, bankroll);
        info!("player {} joined with {}", player.name(), bankroll);
        self.players.push(player);
        Ok(id)
    }

    /// Places a bet for a new hand. Bets above the table maximum are clamped;
    /// returns the amount actually staked.
    pub fn add_player_hand(&mut self, id: PlayerId, bet: f64) -> Result<f64> {
        self.expect_state(RoundState::Preparing)?;
        let index = self.player_index(id)?;
        let bet = self
            .rules
            .clamp_bet(bet)
            .ok_or(IllegalAction::BetBelowMinimum)?;
        self.players[index].add_hand(bet, None)?;
        Ok(bet)
    }

    /// Re-stakes a hand before the deal, with the same clamping as
    /// `add_player_hand`.
    pub fn change_bet(&mut self, id: PlayerId, hand_index: usize, bet: f64) -> Result<f64> {
        self.expect_state(RoundState::Preparing)?;
        let index = self.player_index(id)?;
        let bet = self
            .rules
            .clamp_bet(bet)
            .ok_or(IllegalAction::BetBelowMinimum)?;
        self.players[index].change_bet(hand_index, bet)?;
        Ok(bet)
    }

    /// Deals two cards to every player hand and to the dealer, alternating
    /// rounds: player hands first, then the dealer's hole card, then player
    /// hands again, then the dealer's up-card.
    pub fn deal(&mut self) -> Result<()> {
        self.expect_state(RoundState::Preparing)?;
        let hand_count: usize = self.players.iter().map(|p| p.hands().len()).sum();
        if hand_count == 0 {
            return Err(IllegalAction::NoPlayerHands.into());
        }
        if self.shoe.remaining() < 2 * (hand_count + 1) {
            return Err(Error::EmptyShoe);
        }

        self.state = RoundState::Dealing;
        self.dealer_hand.clear();
        for _ in 0..2 {
            for player in &mut self.players {
                for hand_index in 0..player.hands().len() {
                    let card = self.shoe.draw()?;
                    player.deal_to(hand_index, card);
                }
            }
            self.dealer_hand.add_card(self.shoe.draw()?);
        }
        self.current_player_index = Some(0);
        info!("dealt {hand_count} hands, {} cards left", self.shoe.remaining());
        Ok(())
    }

    pub fn start_player_play(&mut self) -> Result<()> {
        self.expect_state(RoundState::Dealing)?;
        match self.first_player_from(0) {
            Some(index) => {
                self.current_player_index = Some(index);
                self.state = RoundState::PlayerPlaying;
                debug!("player play starts at seat {index}");
                Ok(())
            }
            None => self.start_dealer_play(),
        }
    }

    /// First seat at or after `start` with a hand still to play. Hands already
    /// at 21 are passed over on the way.
    fn first_player_from(&mut self, start: usize) -> Option<usize> {
        for index in start..self.players.len() {
            let player = &mut self.players[index];
            player.skip_finished_hands();
            if player.current_hand().is_some() {
                return Some(index);
            }
        }
        None
    }

    pub fn is_player_turn(&self, id: PlayerId) -> bool {
        self.state == RoundState::PlayerPlaying
            && self.current_player().map(Player::id) == Some(id)
    }

    fn turn_index(&self, id: PlayerId) -> Result<usize> {
        self.expect_state(RoundState::PlayerPlaying)?;
        let index = self.player_index(id)?;
        if self.current_player_index != Some(index) {
            debug!("rejected: not the turn of player {}", id.0);
            return Err(IllegalAction::NotPlayersTurn.into());
        }
        Ok(index)
    }

    /// Moves play on once the current player has no hand left.
    fn finish_action(&mut self, index: usize) -> Result<()> {
        if self.players[index].current_hand().is_none() {
            self.increment_player_index()?;
        }
        Ok(())
    }

    fn increment_player_index(&mut self) -> Result<()> {
        let next = self.current_player_index.map_or(0, |i| i + 1);
        match self.first_player_from(next) {
            Some(index) => {
                self.current_player_index = Some(index);
                Ok(())
            }
            None => self.start_dealer_play(),
        }
    }

    pub fn hit(&mut self, id: PlayerId) -> Result<()> {
        let index = self.turn_index(id)?;
        let player = &mut self.players[index];
        if player.current_hand().is_none() {
            return Err(IllegalAction::NoActiveHand.into());
        }
        let card = self.shoe.draw()?;
        player.hit(card)?;
        self.finish_action(index)
    }

    pub fn stand(&mut self, id: PlayerId) -> Result<()> {
        let index = self.turn_index(id)?;
        self.players[index].stand()?;
        self.finish_action(index)
    }

    pub fn double_down(&mut self, id: PlayerId) -> Result<()> {
        let index = self.turn_index(id)?;
        if !self.rules.double_down.is_allowed {
            return Err(IllegalAction::DisallowedByRules("double down").into());
        }
        if self.players[index].hands().len() > 1 && !self.rules.double_down.after_split_allowed {
            return Err(IllegalAction::DisallowedByRules("double down after split").into());
        }
        self.players[index].double_down(&mut self.shoe)?;
        self.finish_action(index)
    }

    pub fn split(&mut self, id: PlayerId) -> Result<()> {
        let index = self.turn_index(id)?;
        self.check_split_rules(&self.players[index])?;
        self.players[index].split(&mut self.shoe)?;
        self.finish_action(index)
    }

    fn check_split_rules(&self, player: &Player) -> Result<()> {
        let split = &self.rules.split;
        if !split.is_allowed {
            return Err(IllegalAction::DisallowedByRules("split").into());
        }
        if player.hands().len() >= split.max_hands {
            return Err(IllegalAction::DisallowedByRules("split beyond the hand limit").into());
        }
        let resplitting_aces = player.hands().len() > 1
            && player
                .current_hand()
                .map_or(false, |hand| hand.can_split() && hand.cards()[0].is_ace());
        if resplitting_aces && !split.resplit_aces_allowed {
            return Err(IllegalAction::DisallowedByRules("resplitting aces").into());
        }
        Ok(())
    }

    pub fn surrender(&mut self, id: PlayerId) -> Result<()> {
        let index = self.turn_index(id)?;
        if !self.rules.surrender_allowed {
            return Err(IllegalAction::DisallowedByRules("surrender").into());
        }
        self.players[index].surrender()?;
        self.finish_action(index)
    }

    /// Reveals the hole card and draws to 17. A soft 17 draws again only when
    /// the dealer hits soft 17.
    fn start_dealer_play(&mut self) -> Result<()> {
        self.state = RoundState::DealerPlaying;
        self.current_player_index = None;
        self.dealer_hand.reveal_hole_card();
        while self.dealer_should_draw() {
            match self.shoe.draw() {
                Ok(card) => self.dealer_hand.add_card(card),
                Err(err) => {
                    self.void_round();
                    return Err(err);
                }
            }
        }
        info!(
            "dealer stands with {}{}",
            self.dealer_hand.total(),
            if self.dealer_hand.is_bust() { " (bust)" } else { "" }
        );
        Ok(())
    }

    /// Abandons a round the dealer cannot finish. No hand is settled, so every
    /// bet stays with its player. The table waits in `Ending` for `start_round`
    /// with a freshly shuffled shoe.
    fn void_round(&mut self) {
        warn!(
            "shoe ran dry with the dealer on {}, voiding the round",
            self.dealer_hand.total()
        );
        for player in &mut self.players {
            player.clear_hands();
        }
        self.current_player_index = None;
        self.state = RoundState::Ending;
        self.shoe.shuffle();
    }

    fn dealer_should_draw(&self) -> bool {
        let total = self.dealer_hand.total();
        match total {
            0..=16 => true,
            17 => self.dealer_hand.is_soft() && !self.rules.dealer_stands_on_soft17,
            _ => false,
        }
    }

    /// Settles every hand, then reshuffles if more than half the shoe is
    /// gone. The table stays in `Ending` until `start_round`.
    pub fn end_round(&mut self) -> Result<Vec<Settlement>> {
        self.expect_state(RoundState::DealerPlaying)?;
        self.state = RoundState::Ending;

        let payout = self.rules.blackjack_payout;
        let settlements: Vec<Settlement> = self
            .players
            .iter_mut()
            .flat_map(|player| player.handle_end_round(&self.dealer_hand, payout))
            .collect();
        info!("settled {} hands", settlements.len());

        if self.shoe.needs_reshuffle() {
            info!(
                "penetration {:.2} past threshold, reshuffling",
                self.shoe.penetration()
            );
            self.shoe.shuffle();
        }
        Ok(settlements)
    }

    pub fn start_round(&mut self) -> Result<()> {
        self.expect_state(RoundState::Ending)?;
        self.dealer_hand.clear();
        self.current_player_index = None;
        self.state = RoundState::Preparing;
        Ok(())
    }

    /// Basic-strategy advice for the player whose turn it is.
    pub fn get_basic_strategy_action(&self, id: PlayerId) -> Result<Advice> {
        let index = self.turn_index(id)?;
        let player = &self.players[index];
        let hand = player.current_hand().ok_or(IllegalAction::NoActiveHand)?;

        let options = ActionOptions {
            can_split: player.can_split() && self.check_split_rules(player).is_ok(),
            can_double: player.can_double_down()
                && self.rules.double_down.is_allowed
                && (player.hands().len() == 1 || self.rules.double_down.after_split_allowed),
            can_surrender: self.rules.surrender_allowed && hand.can_surrender(),
            double_after_split: self.rules.double_down.is_allowed
                && self.rules.double_down.after_split_allowed,
        };
        self.chart
            .advise(hand, self.dealer_hand.total(), &options)
            .ok_or_else(|| IllegalAction::NoActiveHand.into())
    }
}
