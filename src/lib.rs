//! Doubles lineup recommendations for pickleball team matches.
//! Enumerates (or searches) the ways of pairing a roster, scores each pairing against a weighted
//! set of hypothesised opponent lineups or a known opponent schedule, and ranks the results by
//! expected wins or downside risk.

#![allow(clippy::too_many_arguments)]

pub mod blend;
pub mod bundle;
pub mod calibration;
pub mod comb;
pub mod config;
pub mod file;
pub mod known;
pub mod lookup;
pub mod player;
pub mod print;
pub mod probs;
pub mod rank;
pub mod recommend;
pub mod scenario;
pub mod schedule;
pub mod search;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
