//! Combinatorics of doubles pairings.

use crate::player::{Pair, Pairing, PlayerId};

/// The number of perfect matchings of `players` people, `(n-1)!!`. Zero when `players` is odd or
/// fewer than two.
pub fn count_pairings(players: usize) -> u64 {
    if players < 2 || players % 2 != 0 {
        return 0;
    }
    (1..players as u64).step_by(2).product()
}

/// Enumerates every way of partitioning `players` into unordered pairs. An odd-sized or
/// single-player roster yields no pairings.
///
/// The first untaken player is partnered with each remaining player in turn, recursing on the
/// rest, so `n` players produce exactly `(n-1)!!` pairings.
pub fn enumerate(players: &[PlayerId]) -> Vec<Pairing> {
    let pairings = count_pairings(players.len());
    if pairings == 0 {
        return vec![];
    }
    let mut taken = vec![false; players.len()];
    let mut partial = Vec::with_capacity(players.len() / 2);
    let mut outputs = Vec::with_capacity(pairings as usize);
    extend(players, &mut taken, &mut partial, &mut outputs);
    outputs
}

fn extend(players: &[PlayerId], taken: &mut [bool], partial: &mut Vec<Pair>, outputs: &mut Vec<Pairing>) {
    let Some(first) = taken.iter().position(|&taken| !taken) else {
        outputs.push(Pairing::new(partial.clone()));
        return;
    };
    taken[first] = true;
    for other in first + 1..players.len() {
        if taken[other] {
            continue;
        }
        taken[other] = true;
        partial.push(Pair::new(players[first].clone(), players[other].clone()));
        extend(players, taken, partial, outputs);
        partial.pop();
        taken[other] = false;
    }
    taken[first] = false;
}
