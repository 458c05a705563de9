//! Request validation. Every violated constraint contributes one message, so a caller can report
//! all problems with a request at once.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::player::{MatchType, PlayerId};
use crate::recommend::{Mode, Request};
use crate::schedule::{ROUNDS, SLOTS, TEMPLATE};

pub const MIN_PLAYERS: usize = 8;
pub const MAX_PLAYERS: usize = 20;
pub const MAX_RECOMMENDATIONS: usize = 10;
pub const MAX_SCENARIO_LIMIT: usize = 30;

#[derive(Debug, Error, PartialEq)]
#[error("invalid request: {}", .violations.join("; "))]
pub struct InvalidRequest {
    pub violations: Vec<String>,
}

pub fn validate_request(request: &Request) -> Result<(), InvalidRequest> {
    let mut violations = vec![];
    let players = &request.available_player_ids;
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
        violations.push(format!(
            "availablePlayerIds must contain between {MIN_PLAYERS} and {MAX_PLAYERS} players, got {}",
            players.len()
        ));
    }
    if players.len() % 2 != 0 {
        violations.push(format!("availablePlayerIds must contain an even number of players, got {}", players.len()));
    }
    let mut seen = FxHashSet::default();
    for player in players {
        if !seen.insert(player) {
            violations.push(format!("availablePlayerIds contains duplicate player {player}"));
        }
    }
    if !(1..=MAX_RECOMMENDATIONS).contains(&request.max_recommendations) {
        violations.push(format!("maxRecommendations must be between 1 and {MAX_RECOMMENDATIONS}"));
    }
    if !(request.downside_quantile > 0.0 && request.downside_quantile < 1.0) {
        violations.push("downsideQuantile must be strictly between 0 and 1".into());
    }
    if !(1..=MAX_SCENARIO_LIMIT).contains(&request.scenario_limit) {
        violations.push(format!("scenarioLimit must be between 1 and {MAX_SCENARIO_LIMIT}"));
    }
    if request.mode == Mode::KnownOpponent {
        validate_opponent_rounds(request, &mut violations);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(InvalidRequest { violations })
    }
}

fn validate_opponent_rounds(request: &Request, violations: &mut Vec<String>) {
    let Some(rounds) = &request.opponent_rounds else {
        violations.push("opponentRounds is required in known_opponent mode".into());
        return;
    };
    let Some(roster) = &request.opponent_roster else {
        violations.push("opponentRoster is required in known_opponent mode".into());
        return;
    };
    if rounds.len() != ROUNDS {
        violations.push(format!("opponentRounds must contain {ROUNDS} rounds, got {}", rounds.len()));
    }
    for (round_index, round) in rounds.iter().enumerate().take(ROUNDS) {
        let round_no = round_index + 1;
        if round.slots.len() != SLOTS {
            violations.push(format!(
                "opponentRounds[{round_no}] must contain {SLOTS} slots, got {}",
                round.slots.len()
            ));
        }
        for (slot_index, slot) in round.slots.iter().enumerate().take(SLOTS) {
            let slot_no = slot_index + 1;
            let expected = TEMPLATE[round_index][slot_index];
            if slot.match_type != expected {
                violations.push(format!(
                    "round {round_no} slot {slot_no} must be {expected}, got {}",
                    slot.match_type
                ));
            }
            if slot.opponent_player_a_id == slot.opponent_player_b_id {
                violations.push(format!(
                    "round {round_no} slot {slot_no} repeats opponent player {}",
                    slot.opponent_player_a_id
                ));
            }
            let genders: Vec<_> = [&slot.opponent_player_a_id, &slot.opponent_player_b_id]
                .into_iter()
                .filter_map(|player: &PlayerId| match roster.get(player) {
                    Some(gender) => Some(*gender),
                    None => {
                        violations.push(format!(
                            "round {round_no} slot {slot_no} opponent player {player} is not in opponentRoster"
                        ));
                        None
                    }
                })
                .collect();
            if let [first, second] = genders[..] {
                if MatchType::of([Some(first), Some(second)]) != Some(slot.match_type) {
                    violations.push(format!(
                        "round {round_no} slot {slot_no} pairs {first} and {second} players in a {} slot",
                        slot.match_type
                    ));
                }
            }
        }
    }
}
