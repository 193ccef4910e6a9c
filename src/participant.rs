// This file is part of doubles-draw.
//
// doubles-draw is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// doubles-draw is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{fmt, str::FromStr};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

/// An index into [`Roster::participants`].
pub type ParticipantId = usize;

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Pool {
    A,
    B,
    #[default]
    Single,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::A => write!(f, "a"),
            Pool::B => write!(f, "b"),
            Pool::Single => write!(f, "single"),
        }
    }
}

impl FromStr for Pool {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let string = string.to_lowercase();

        match string.as_str() {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "single" | "s" => Ok(Self::Single),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Pool!"
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Participant {
    pub name: String,
    pub pool: Pool,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Mode {
    /// Teams take one participant from each of two pools.
    Mixed,
    /// Teams take any two participants of one pool.
    SamePool,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Mixed => write!(f, "mixed"),
            Mode::SamePool => write!(f, "same_pool"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PoolCounts {
    Mixed { a: usize, b: usize },
    SamePool(usize),
}

impl PoolCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        match self {
            Self::Mixed { a, b } => a + b,
            Self::SamePool(n) => *n,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Mixed { .. } => Mode::Mixed,
            Self::SamePool(_) => Mode::SamePool,
        }
    }
}

impl fmt::Display for PoolCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed { a, b } => write!(f, "{a} + {b}"),
            Self::SamePool(n) => write!(f, "{n}"),
        }
    }
}

/// The names taking part in one scheduling run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Roster {
    Mixed {
        pool_a: Vec<String>,
        pool_b: Vec<String>,
    },
    SamePool(Vec<String>),
}

impl Roster {
    #[must_use]
    pub fn counts(&self) -> PoolCounts {
        match self {
            Self::Mixed { pool_a, pool_b } => PoolCounts::Mixed {
                a: pool_a.len(),
                b: pool_b.len(),
            },
            Self::SamePool(names) => PoolCounts::SamePool(names.len()),
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.counts().mode()
    }

    /// Pool A first, then pool B; the position is the [`ParticipantId`].
    #[must_use]
    pub fn participants(&self) -> Vec<Participant> {
        let tag = |pool: Pool| {
            move |name: &String| Participant {
                name: name.trim().to_string(),
                pool,
            }
        };

        match self {
            Self::Mixed { pool_a, pool_b } => pool_a
                .iter()
                .map(tag(Pool::A))
                .chain(pool_b.iter().map(tag(Pool::B)))
                .collect(),
            Self::SamePool(names) => names.iter().map(tag(Pool::Single)).collect(),
        }
    }

    /// # Errors
    ///
    /// If a name is empty or appears twice.
    pub fn check_names(&self) -> Result<(), InvalidInput> {
        let mut seen = FxHashSet::default();

        for participant in self.participants() {
            if participant.name.is_empty() {
                return Err(InvalidInput::EmptyName);
            }

            if !seen.insert(participant.name.to_lowercase()) {
                return Err(InvalidInput::DuplicateName(participant.name));
            }
        }

        Ok(())
    }
}

impl TryFrom<Vec<Participant>> for Roster {
    type Error = InvalidInput;

    /// Anyone tagged `A` or `B` makes the roster mixed, and then everyone
    /// needs one of those two pools.
    fn try_from(participants: Vec<Participant>) -> Result<Self, Self::Error> {
        let mixed = participants
            .iter()
            .any(|participant| participant.pool != Pool::Single);

        if !mixed {
            return Ok(Self::SamePool(participants.into_iter().map(|p| p.name).collect()));
        }

        if let Some(single) = participants
            .iter()
            .find(|participant| participant.pool == Pool::Single)
        {
            return Err(InvalidInput::MixedPools(single.name.clone()));
        }

        let names = |pool| {
            participants
                .iter()
                .filter(|participant| participant.pool == pool)
                .map(|participant| participant.name.clone())
                .collect()
        };

        Ok(Self::Mixed {
            pool_a: names(Pool::A),
            pool_b: names(Pool::B),
        })
    }
}

/// Whether two participants may form a team.
#[must_use]
pub(crate) fn compatible(participants: &[Participant], x: ParticipantId, y: ParticipantId) -> bool {
    x != y
        && match (participants[x].pool, participants[y].pool) {
            (Pool::A, Pool::B) | (Pool::B, Pool::A) | (Pool::Single, Pool::Single) => true,
            _ => false,
        }
}
