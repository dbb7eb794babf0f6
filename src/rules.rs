use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BettingLimit {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleDownRules {
    pub is_allowed: bool,
    pub after_split_allowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRules {
    pub is_allowed: bool,
    pub resplit_aces_allowed: bool,
    /// Most hands a player may hold after splitting.
    pub max_hands: usize,
}

/// Table rules. A game keeps one snapshot for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rules {
    pub betting_limit: BettingLimit,
    /// Multiplier of the bet paid on a natural, e.g. 1.5 for 3:2.
    pub blackjack_payout: f64,
    pub dealer_stands_on_soft17: bool,
    pub double_down: DoubleDownRules,
    pub split: SplitRules,
    pub surrender_allowed: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            betting_limit: BettingLimit {
                min: 25.0,
                max: 1000.0,
            },
            blackjack_payout: 1.5,
            dealer_stands_on_soft17: true,
            double_down: DoubleDownRules {
                is_allowed: true,
                after_split_allowed: true,
            },
            split: SplitRules {
                is_allowed: true,
                resplit_aces_allowed: true,
                max_hands: 4,
            },
            surrender_allowed: true,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<()> {
        let limit = &self.betting_limit;
        if !(limit.min > 0.0) {
            return Err(Error::InvalidRules(format!(
                "minimum bet must be positive, got {}",
                limit.min
            )));
        }
        if limit.min > limit.max {
            return Err(Error::InvalidRules(format!(
                "minimum bet {} exceeds maximum {}",
                limit.min, limit.max
            )));
        }
        if !(self.blackjack_payout > 0.0) {
            return Err(Error::InvalidRules(format!(
                "blackjack payout must be positive, got {}",
                self.blackjack_payout
            )));
        }
        if self.split.is_allowed && self.split.max_hands < 2 {
            return Err(Error::InvalidRules(format!(
                "splitting needs room for at least 2 hands, got {}",
                self.split.max_hands
            )));
        }
        Ok(())
    }

    /// Clamps `bet` to the table maximum. Bets under the minimum are refused.
    pub fn clamp_bet(&self, bet: f64) -> Option<f64> {
        if !(bet >= self.betting_limit.min) {
            return None;
        }
        Some(bet.min(self.betting_limit.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = Rules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.blackjack_payout, 1.5);
        assert_eq!(rules.split.max_hands, 4);
    }

    #[test]
    fn test_clamp_bet() {
        let rules = Rules::default();
        assert_eq!(rules.clamp_bet(10.0), None);
        assert_eq!(rules.clamp_bet(25.0), Some(25.0));
        assert_eq!(rules.clamp_bet(5000.0), Some(1000.0));
        assert_eq!(rules.clamp_bet(f64::NAN), None);
    }

    #[test]
    fn test_invalid_limits() {
        let rules = Rules {
            betting_limit: BettingLimit {
                min: 500.0,
                max: 100.0,
            },
            ..Rules::default()
        };
        assert!(matches!(rules.validate(), Err(Error::InvalidRules(_))));
    }

    #[test]
    fn test_invalid_payout_and_split_room() {
        let rules = Rules {
            blackjack_payout: 0.0,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());

        let mut rules = Rules::default();
        rules.split.max_hands = 1;
        assert!(rules.validate().is_err());
        rules.split.is_allowed = false;
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_partial_rules_from_json() {
        let rules: Rules =
            serde_json::from_str(r#"{ "blackjackPayout": 1.2, "surrenderAllowed": false }"#)
                .unwrap();
        assert_eq!(rules.blackjack_payout, 1.2);
        assert!(!rules.surrender_allowed);
        assert!(rules.dealer_stands_on_soft17);
        assert_eq!(rules.betting_limit.min, 25.0);
    }
}
