//! Players, doubles pairs and pairings. A [Pair] is held in canonical (sorted) order so that it
//! can be used directly as a lookup key; a [Pairing] partitions a roster into pairs.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum_macros::{Display, EnumIter};

/// Number of digest bytes retained in a pairing ID.
const ID_BYTES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "F", alias = "f")]
    Female,
    #[serde(alias = "M", alias = "m")]
    Male,
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f" | "female" => Ok(Gender::Female),
            "m" | "male" => Ok(Gender::Male),
            _ => bail!("unsupported gender '{s}'"),
        }
    }
}

/// The category of a doubles game, which also determines who may play it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchType {
    Mixed,
    Female,
    Male,
}

impl MatchType {
    /// The category implied by the genders of two partners, if both are known.
    pub fn of(genders: [Option<Gender>; 2]) -> Option<Self> {
        match genders {
            [Some(Gender::Female), Some(Gender::Female)] => Some(MatchType::Female),
            [Some(Gender::Male), Some(Gender::Male)] => Some(MatchType::Male),
            [Some(_), Some(_)] => Some(MatchType::Mixed),
            _ => None,
        }
    }

    /// Whether two partners may play a game of this type. Unknown genders are admitted.
    pub fn admits(&self, genders: [Option<Gender>; 2]) -> bool {
        match MatchType::of(genders) {
            Some(composition) => composition == *self,
            None => match self {
                MatchType::Mixed => true,
                MatchType::Female => !genders.contains(&Some(Gender::Male)),
                MatchType::Male => !genders.contains(&Some(Gender::Female)),
            },
        }
    }
}

impl FromStr for MatchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mixed" => Ok(MatchType::Mixed),
            "female" | "womens" => Ok(MatchType::Female),
            "male" | "mens" => Ok(MatchType::Male),
            _ => bail!("unsupported match type '{s}'"),
        }
    }
}

/// An unordered pair of distinct players, stored sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    low: PlayerId,
    high: PlayerId,
}

impl Pair {
    pub fn new(first: PlayerId, second: PlayerId) -> Self {
        assert_ne!(first, second, "a pair cannot contain {first} twice");
        if first < second {
            Self { low: first, high: second }
        } else {
            Self { low: second, high: first }
        }
    }

    pub fn try_new(first: PlayerId, second: PlayerId) -> Option<Self> {
        if first == second {
            None
        } else {
            Some(Self::new(first, second))
        }
    }

    pub fn players(&self) -> [&PlayerId; 2] {
        [&self.low, &self.high]
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.low == *player || self.high == *player
    }

    /// Canonical key: the sorted identifiers joined with `|`.
    pub fn key(&self) -> String {
        format!("{}|{}", self.low, self.high)
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.low, self.high)
    }
}

impl FromStr for Pair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, second) = s.split_once('|').context("pair should be in the form <player>|<player>")?;
        if first.is_empty() || second.is_empty() {
            bail!("pair '{s}' is missing a player");
        }
        Pair::try_new(first.into(), second.into()).with_context(|| format!("pair '{s}' repeats a player"))
    }
}

/// A partition of a roster into doubles pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pairs: Vec<Pair>,
}

impl Pairing {
    pub fn new(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sorted pair keys, independent of the order in which the pairs were generated.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.pairs.iter().map(Pair::key).collect();
        keys.sort();
        keys
    }

    /// A stable identifier: the truncated SHA-256 digest of the sorted pairs. Each player ID is
    /// length-prefixed, so IDs containing separators cannot collide.
    pub fn id(&self) -> String {
        let mut pairs: Vec<_> = self.pairs.iter().collect();
        pairs.sort();
        let mut hasher = Sha256::new();
        for pair in pairs {
            for player in pair.players() {
                hasher.update((player.as_str().len() as u64).to_le_bytes());
                hasher.update(player.as_str().as_bytes());
            }
        }
        hasher
            .finalize()
            .iter()
            .take(ID_BYTES)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    /// Whether every one of `players` appears in exactly one pair and nobody else does.
    pub fn partitions(&self, players: &[PlayerId]) -> bool {
        if self.pairs.len() * 2 != players.len() {
            return false;
        }
        players
            .iter()
            .all(|player| self.pairs.iter().filter(|pair| pair.contains(player)).count() == 1)
    }

    /// Exchanges partners between the pairs at `first` and `second`. With `cross` unset, the low
    /// players of each pair are partnered together (as are the high players); with `cross` set,
    /// each low player is partnered with the other pair's high player.
    pub fn swap_partners(&self, first: usize, second: usize, cross: bool) -> Pairing {
        debug_assert_ne!(first, second);
        let [a, b] = self.pairs[first].players();
        let [c, d] = self.pairs[second].players();
        let (left, right) = if cross {
            (Pair::new(a.clone(), d.clone()), Pair::new(b.clone(), c.clone()))
        } else {
            (Pair::new(a.clone(), c.clone()), Pair::new(b.clone(), d.clone()))
        };
        let mut pairs = self.pairs.clone();
        pairs[first] = left;
        pairs[second] = right;
        Pairing { pairs }
    }
}

impl Display for Pairing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, pair) in self.pairs.iter().enumerate() {
            if index != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pair}")?;
        }
        write!(f, "]")
    }
}
