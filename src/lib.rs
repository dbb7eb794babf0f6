use wasm_bindgen::prelude::*;

mod card;
mod deck;
mod error;
mod game;
mod hand;
mod logging;
mod player;
mod rules;
mod strategy;

pub use card::{Card, Rank, Suit};
pub use deck::{Shoe, CARDS_PER_DECK, RESHUFFLE_PENETRATION};
pub use error::{Error, IllegalAction};
pub use game::{Game, GameConfig, RoundState, TableView};
pub use hand::{
    can_split_cards, hand_value, has_ace, is_bust, is_natural, is_soft, is_twenty_one, DealerHand,
    PlayerHand,
};
pub use player::{HandOutcome, Player, PlayerId, Settlement};
pub use rules::{BettingLimit, DoubleDownRules, Rules, SplitRules};
pub use strategy::{Action, ActionOptions, Advice, Chart, StrategyChart, StrategyCode};

fn rejected(err: Error) -> JsValue {
    JsValue::from_str(&format!("Action rejected: {err}"))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

/// Installs the panic hook and routes engine logs to the browser console.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    console_error_panic_hook::set_once();
    logging::init(logging::parse_level(level));
}

/// A blackjack table driven by the renderer.
#[wasm_bindgen]
pub struct BlackjackTable {
    game: Game,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(config: &JsValue) -> Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config.clone())
                .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?
        };
        let game =
            Game::new(config).map_err(|err| JsValue::from_str(&format!("Setup failed: {err}")))?;
        Ok(BlackjackTable { game })
    }

    #[wasm_bindgen(js_name = addPlayer)]
    pub fn add_player(&mut self, name: &str, bankroll: f64) -> Result<u32, JsValue> {
        self.game
            .add_player(name, bankroll)
            .map(|id| id.0)
            .map_err(rejected)
    }

    #[wasm_bindgen(js_name = addPlayerHand)]
    pub fn add_player_hand(&mut self, player: u32, bet: f64) -> Result<f64, JsValue> {
        self.game
            .add_player_hand(PlayerId(player), bet)
            .map_err(rejected)
    }

    #[wasm_bindgen(js_name = changeBet)]
    pub fn change_bet(
        &mut self,
        player: u32,
        hand_index: usize,
        bet: f64,
    ) -> Result<f64, JsValue> {
        self.game
            .change_bet(PlayerId(player), hand_index, bet)
            .map_err(rejected)
    }

    pub fn deal(&mut self) -> Result<(), JsValue> {
        self.game.deal().map_err(rejected)
    }

    #[wasm_bindgen(js_name = startPlayerPlay)]
    pub fn start_player_play(&mut self) -> Result<(), JsValue> {
        self.game.start_player_play().map_err(rejected)
    }

    pub fn hit(&mut self, player: u32) -> Result<(), JsValue> {
        self.game.hit(PlayerId(player)).map_err(rejected)
    }

    pub fn stand(&mut self, player: u32) -> Result<(), JsValue> {
        self.game.stand(PlayerId(player)).map_err(rejected)
    }

    #[wasm_bindgen(js_name = doubleDown)]
    pub fn double_down(&mut self, player: u32) -> Result<(), JsValue> {
        self.game.double_down(PlayerId(player)).map_err(rejected)
    }

    pub fn split(&mut self, player: u32) -> Result<(), JsValue> {
        self.game.split(PlayerId(player)).map_err(rejected)
    }

    pub fn surrender(&mut self, player: u32) -> Result<(), JsValue> {
        self.game.surrender(PlayerId(player)).map_err(rejected)
    }

    #[wasm_bindgen(js_name = basicStrategyAction)]
    pub fn basic_strategy_action(&self, player: u32) -> Result<JsValue, JsValue> {
        let advice = self
            .game
            .get_basic_strategy_action(PlayerId(player))
            .map_err(rejected)?;
        to_js(&advice)
    }

    #[wasm_bindgen(js_name = endRound)]
    pub fn end_round(&mut self) -> Result<JsValue, JsValue> {
        let settlements = self.game.end_round().map_err(rejected)?;
        to_js(&settlements)
    }

    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&mut self) -> Result<(), JsValue> {
        self.game.start_round().map_err(rejected)
    }

    #[wasm_bindgen(js_name = isPlayerTurn)]
    pub fn is_player_turn(&self, player: u32) -> bool {
        self.game.is_player_turn(PlayerId(player))
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.view())
    }
}

#[cfg(feature = "inspect")]
#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(js_name = debugJson)]
    pub fn debug_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.game.view())
            .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
    }
}
