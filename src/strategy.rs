use serde::Serialize;

use crate::error::{Error, Result};
use crate::hand::PlayerHand;

/// Dealer up-cards 2 through Ace.
pub const DEALER_COLUMNS: usize = 10;
const BASE_ROWS: usize = 18; // hard 3..=20
const SOFT_ROWS: usize = 8; // A,2..=A,9
const SPLIT_ROWS: usize = 10; // 2,2..=A,A

type Grid<const ROWS: usize> = [[StrategyCode; DEALER_COLUMNS]; ROWS];

/// Entry of a strategy chart. The compound codes depend on what the player
/// is allowed to do at the moment of asking.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyCode {
    Hit,
    Stand,
    Split,
    DoubleElseHit,
    DoubleElseStand,
    SplitIfDoubleAfterSplitElseHit,
    SurrenderElseHit,
}

impl StrategyCode {
    pub fn from_code(code: &str) -> Option<StrategyCode> {
        match code {
            "H" => Some(StrategyCode::Hit),
            "S" => Some(StrategyCode::Stand),
            "P" => Some(StrategyCode::Split),
            "DH" => Some(StrategyCode::DoubleElseHit),
            "DS" => Some(StrategyCode::DoubleElseStand),
            "PH" => Some(StrategyCode::SplitIfDoubleAfterSplitElseHit),
            "RH" => Some(StrategyCode::SurrenderElseHit),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            StrategyCode::Hit => "H",
            StrategyCode::Stand => "S",
            StrategyCode::Split => "P",
            StrategyCode::DoubleElseHit => "DH",
            StrategyCode::DoubleElseStand => "DS",
            StrategyCode::SplitIfDoubleAfterSplitElseHit => "PH",
            StrategyCode::SurrenderElseHit => "RH",
        }
    }

    pub fn resolve(&self, options: &ActionOptions) -> Action {
        match self {
            StrategyCode::Hit => Action::Hit,
            StrategyCode::Stand => Action::Stand,
            StrategyCode::Split => Action::Split,
            StrategyCode::DoubleElseHit if options.can_double => Action::DoubleDown,
            StrategyCode::DoubleElseHit => Action::Hit,
            StrategyCode::DoubleElseStand if options.can_double => Action::DoubleDown,
            StrategyCode::DoubleElseStand => Action::Stand,
            StrategyCode::SplitIfDoubleAfterSplitElseHit
                if options.can_split && options.double_after_split =>
            {
                Action::Split
            }
            StrategyCode::SplitIfDoubleAfterSplitElseHit => Action::Hit,
            StrategyCode::SurrenderElseHit if options.can_surrender => Action::Surrender,
            StrategyCode::SurrenderElseHit => Action::Hit,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Hit,
    Stand,
    DoubleDown,
    Split,
    Surrender,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Chart {
    Base,
    Soft,
    Split,
}

/// What the current hand may legally do, as decided by the game.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ActionOptions {
    pub can_split: bool,
    pub can_double: bool,
    pub can_surrender: bool,
    pub double_after_split: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub code: StrategyCode,
    pub chart: Chart,
    pub action: Action,
}

/// Base, soft and split charts indexed by player hand and dealer up-card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyChart {
    base: Grid<BASE_ROWS>,
    soft: Grid<SOFT_ROWS>,
    split: Grid<SPLIT_ROWS>,
}

impl Default for StrategyChart {
    fn default() -> Self {
        Self::basic()
    }
}

impl StrategyChart {
    pub fn basic() -> Self {
        use StrategyCode::{
            DoubleElseHit as DH, DoubleElseStand as DS, Hit as H, Split as P,
            SplitIfDoubleAfterSplitElseHit as PH, Stand as S, SurrenderElseHit as RH,
        };

        StrategyChart {
            base: [
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, DH, DH, DH, DH, H, H, H, H, H],
                [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
                [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH],
                [H, H, S, S, S, H, H, H, H, H],
                [S, S, S, S, S, H, H, H, H, H],
                [S, S, S, S, S, H, H, H, H, H],
                [S, S, S, S, S, H, H, H, RH, H],
                [S, S, S, S, S, H, H, RH, RH, RH],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
            ],
            soft: [
                [H, H, H, DH, DH, H, H, H, H, H],
                [H, H, H, DH, DH, H, H, H, H, H],
                [H, H, DH, DH, DH, H, H, H, H, H],
                [H, H, DH, DH, DH, H, H, H, H, H],
                [H, DH, DH, DH, DH, H, H, H, H, H],
                [S, DS, DS, DS, DS, S, S, H, H, H],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
            ],
            split: [
                [PH, PH, P, P, P, P, H, H, H, H],
                [PH, PH, P, P, P, P, H, H, H, H],
                [H, H, H, PH, PH, H, H, H, H, H],
                [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
                [PH, P, P, P, P, H, H, H, H, H],
                [P, P, P, P, P, P, H, H, H, H],
                [P, P, P, P, P, P, P, P, P, P],
                [P, P, P, P, P, S, P, P, S, S],
                [S, S, S, S, S, S, S, S, S, S],
                [P, P, P, P, P, P, P, P, P, P],
            ],
        }
    }

    /// Parses a chart from `{"base": [[..]], "soft": [[..]], "split": [[..]]}`
    /// where every cell is one of `H S P DH DS PH RH`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|err| Error::InvalidStrategy(err.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidStrategy("chart must be an object".to_string()))?;
        let section = |name: &str| {
            obj.get(name)
                .ok_or_else(|| Error::InvalidStrategy(format!("missing \"{name}\" table")))
        };
        Ok(StrategyChart {
            base: value_to_grid(section("base")?, "base")?,
            soft: value_to_grid(section("soft")?, "soft")?,
            split: value_to_grid(section("split")?, "split")?,
        })
    }

    pub fn lookup(&self, chart: Chart, row: usize, column: usize) -> Option<StrategyCode> {
        let row = match chart {
            Chart::Base => self.base.get(row)?,
            Chart::Soft => self.soft.get(row)?,
            Chart::Split => self.split.get(row)?,
        };
        row.get(column).copied()
    }

    /// Recommends an action for `hand` against a dealer showing
    /// `dealer_up_total` (2 through 11). Never mutates anything.
    pub fn advise(
        &self,
        hand: &PlayerHand,
        dealer_up_total: u8,
        options: &ActionOptions,
    ) -> Option<Advice> {
        let column = (dealer_up_total as usize).checked_sub(2)?;
        let (chart, row) = chart_row(hand, options.can_split)?;
        let code = self.lookup(chart, row, column)?;
        Some(Advice {
            code,
            chart,
            action: code.resolve(options),
        })
    }
}

/// Split chart for a splittable pair, soft chart for soft 13 through 19
/// (A,2 to A,8), base chart for everything else including hard hands that
/// hold an Ace.
fn chart_row(hand: &PlayerHand, can_split: bool) -> Option<(Chart, usize)> {
    let cards = hand.cards();
    if cards.is_empty() {
        return None;
    }
    if can_split && hand.can_split() {
        let row = if cards[0].is_ace() {
            SPLIT_ROWS - 1
        } else {
            cards[0].rank.value() as usize - 2
        };
        return Some((Chart::Split, row));
    }

    let total = hand.total() as usize;
    if hand.is_soft() && (13..20).contains(&total) {
        return Some((Chart::Soft, total - 13));
    }
    Some((Chart::Base, total.clamp(3, 20) - 3))
}

fn value_to_grid<const ROWS: usize>(value: &serde_json::Value, name: &str) -> Result<Grid<ROWS>> {
    let rows = value
        .as_array()
        .ok_or_else(|| Error::InvalidStrategy(format!("{name} table must be an array")))?;
    if rows.len() != ROWS {
        return Err(Error::InvalidStrategy(format!(
            "{name} table needs {} rows, got {}",
            ROWS,
            rows.len()
        )));
    }

    let mut grid = [[StrategyCode::Hit; DEALER_COLUMNS]; ROWS];
    for (row_index, row_value) in rows.iter().enumerate() {
        let cells = row_value
            .as_array()
            .filter(|cells| cells.len() == DEALER_COLUMNS)
            .ok_or_else(|| {
                Error::InvalidStrategy(format!(
                    "{name} row {row_index} must hold {} actions",
                    DEALER_COLUMNS
                ))
            })?;
        for (column, cell) in cells.iter().enumerate() {
            grid[row_index][column] = cell
                .as_str()
                .and_then(StrategyCode::from_code)
                .ok_or_else(|| {
                    Error::InvalidStrategy(format!(
                        "{name}[{row_index}][{column}]: bad action {cell}"
                    ))
                })?;
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};

    fn hand(ranks: &[Rank]) -> PlayerHand {
        let mut hand = PlayerHand::new(25.0);
        for &rank in ranks {
            hand.add_card(Card::new(Suit::Club, rank));
        }
        hand
    }

    fn all_allowed() -> ActionOptions {
        ActionOptions {
            can_split: true,
            can_double: true,
            can_surrender: true,
            double_after_split: true,
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for code in ["H", "S", "P", "DH", "DS", "PH", "RH"] {
            assert_eq!(StrategyCode::from_code(code).map(|c| c.as_code()), Some(code));
        }
        assert_eq!(StrategyCode::from_code("X"), None);
    }

    #[test]
    fn test_hard_sixteen_against_ten_surrenders() {
        let chart = StrategyChart::basic();
        let advice = chart
            .advise(&hand(&[Rank::Ten, Rank::Six]), 10, &all_allowed())
            .unwrap();
        assert_eq!(advice.chart, Chart::Base);
        assert_eq!(advice.code, StrategyCode::SurrenderElseHit);
        assert_eq!(advice.action, Action::Surrender);

        let no_surrender = ActionOptions {
            can_surrender: false,
            ..all_allowed()
        };
        let advice = chart
            .advise(&hand(&[Rank::Ten, Rank::Six]), 10, &no_surrender)
            .unwrap();
        assert_eq!(advice.action, Action::Hit);
    }

    #[test]
    fn test_eleven_doubles_against_ace() {
        let chart = StrategyChart::basic();
        let advice = chart
            .advise(&hand(&[Rank::Five, Rank::Six]), 11, &all_allowed())
            .unwrap();
        assert_eq!(advice.code, StrategyCode::DoubleElseHit);
        assert_eq!(advice.action, Action::DoubleDown);
    }

    #[test]
    fn test_soft_chart_used_for_soft_hands() {
        let chart = StrategyChart::basic();
        let options = ActionOptions {
            can_double: false,
            ..all_allowed()
        };
        let advice = chart
            .advise(&hand(&[Rank::Ace, Rank::Seven]), 4, &options)
            .unwrap();
        assert_eq!(advice.chart, Chart::Soft);
        assert_eq!(advice.code, StrategyCode::DoubleElseStand);
        assert_eq!(advice.action, Action::Stand);

        // Ace counted as 1 reads the base chart
        let advice = chart
            .advise(&hand(&[Rank::Ace, Rank::Six, Rank::Nine]), 10, &all_allowed())
            .unwrap();
        assert_eq!(advice.chart, Chart::Base);
    }

    #[test]
    fn test_split_chart_for_pairs() {
        let chart = StrategyChart::basic();
        let advice = chart
            .advise(&hand(&[Rank::Eight, Rank::Eight]), 10, &all_allowed())
            .unwrap();
        assert_eq!(advice.chart, Chart::Split);
        assert_eq!(advice.action, Action::Split);

        let advice = chart
            .advise(&hand(&[Rank::Ace, Rank::Ace]), 6, &all_allowed())
            .unwrap();
        assert_eq!(advice.chart, Chart::Split);
        assert_eq!(advice.code, StrategyCode::Split);

        let advice = chart
            .advise(&hand(&[Rank::King, Rank::Ten]), 6, &all_allowed())
            .unwrap();
        assert_eq!(advice.code, StrategyCode::Stand);
    }

    #[test]
    fn test_pair_without_split_reads_base_chart() {
        let chart = StrategyChart::basic();
        let options = ActionOptions {
            can_split: false,
            ..all_allowed()
        };
        let advice = chart
            .advise(&hand(&[Rank::Eight, Rank::Eight]), 10, &options)
            .unwrap();
        assert_eq!(advice.chart, Chart::Base);
        assert_eq!(advice.code, StrategyCode::SurrenderElseHit);
    }

    #[test]
    fn test_aces_without_split_read_base_chart() {
        let chart = StrategyChart::basic();
        let options = ActionOptions {
            can_split: false,
            ..all_allowed()
        };
        let advice = chart
            .advise(&hand(&[Rank::Ace, Rank::Ace]), 6, &options)
            .unwrap();
        // soft 12 sits below the soft chart's first row (A,2)
        assert_eq!(advice.chart, Chart::Base);
        assert_eq!(Some(advice.code), chart.lookup(Chart::Base, 12 - 3, 6 - 2));
    }

    #[test]
    fn test_split_if_das_else_hit() {
        let chart = StrategyChart::basic();
        let advice = chart
            .advise(&hand(&[Rank::Two, Rank::Two]), 2, &all_allowed())
            .unwrap();
        assert_eq!(advice.action, Action::Split);

        let no_das = ActionOptions {
            double_after_split: false,
            ..all_allowed()
        };
        let advice = chart
            .advise(&hand(&[Rank::Two, Rank::Two]), 2, &no_das)
            .unwrap();
        assert_eq!(advice.action, Action::Hit);
    }

    #[test]
    fn test_dealer_column_out_of_range() {
        let chart = StrategyChart::basic();
        assert!(chart
            .advise(&hand(&[Rank::Ten, Rank::Six]), 0, &all_allowed())
            .is_none());
        assert!(chart
            .advise(&hand(&[Rank::Ten, Rank::Six]), 12, &all_allowed())
            .is_none());
    }

    #[test]
    fn test_chart_from_json() {
        let row = |code: &str| format!("[{}]", vec![format!("\"{code}\""); 10].join(","));
        let table = |rows: usize, code: &str| format!("[{}]", vec![row(code); rows].join(","));
        let json = format!(
            r#"{{ "base": {}, "soft": {}, "split": {} }}"#,
            table(18, "S"),
            table(8, "H"),
            table(10, "P")
        );
        let chart = StrategyChart::from_json(&json).unwrap();
        assert_eq!(chart.lookup(Chart::Base, 0, 0), Some(StrategyCode::Stand));
        assert_eq!(chart.lookup(Chart::Soft, 7, 9), Some(StrategyCode::Hit));
        assert_eq!(chart.lookup(Chart::Split, 9, 9), Some(StrategyCode::Split));
    }

    #[test]
    fn test_chart_from_json_rejects_bad_shapes() {
        assert!(matches!(
            StrategyChart::from_json("[]"),
            Err(Error::InvalidStrategy(_))
        ));
        assert!(matches!(
            StrategyChart::from_json(r#"{ "base": [], "soft": [], "split": [] }"#),
            Err(Error::InvalidStrategy(_))
        ));
        assert!(StrategyChart::from_json("not json").is_err());
    }
}
