//! The fixed round/slot template of a team match and the opponent's known assignments to it.

use serde::{Deserialize, Serialize};

use crate::player::{MatchType, Pair, PlayerId};

pub const ROUNDS: usize = 8;
pub const SLOTS: usize = 4;
pub const GAMES: usize = ROUNDS * SLOTS;

const MIXED_ROUND: [MatchType; SLOTS] = [MatchType::Mixed; SLOTS];
const GENDERED_ROUND: [MatchType; SLOTS] = [
    MatchType::Female,
    MatchType::Female,
    MatchType::Male,
    MatchType::Male,
];

/// Rounds alternate between all-mixed and female, female, male, male.
pub const TEMPLATE: [[MatchType; SLOTS]; ROUNDS] = [
    MIXED_ROUND,
    GENDERED_ROUND,
    MIXED_ROUND,
    GENDERED_ROUND,
    MIXED_ROUND,
    GENDERED_ROUND,
    MIXED_ROUND,
    GENDERED_ROUND,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentSlot {
    pub match_type: MatchType,
    pub opponent_player_a_id: PlayerId,
    pub opponent_player_b_id: PlayerId,
}
impl OpponentSlot {
    pub fn pair(&self) -> Option<Pair> {
        Pair::try_new(self.opponent_player_a_id.clone(), self.opponent_player_b_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpponentRound {
    pub slots: Vec<OpponentSlot>,
}

/// The opponent pair fielded in the given `round` and `slot`, if one was supplied.
pub fn opponent_at(rounds: &[OpponentRound], round: usize, slot: usize) -> Option<Pair> {
    rounds.get(round)?.slots.get(slot)?.pair()
}
