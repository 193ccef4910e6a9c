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

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::participant::{ParticipantId, Pool};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("infeasible: {games} games per participant: {reason}")]
    Infeasible { games: usize, reason: String },
    #[error("construction incomplete: built {built} of {required} teams")]
    ConstructionIncomplete { built: usize, required: usize },
    #[error("results: there is no match {index} in round {round}")]
    UnknownMatch { round: usize, index: usize },
}

impl SchedulerError {
    /// Whether retrying the same call with another random source may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConstructionIncomplete { .. })
    }
}

/// Problems with a roster or a loaded schedule, caught before any search
/// begins.
#[derive(Clone, Debug, Deserialize, Error, Eq, PartialEq, Serialize)]
pub enum InvalidInput {
    #[error("pool {pool} has {count} participants, the minimum is {min}")]
    TooFew { pool: Pool, count: usize, min: usize },
    #[error("pool {pool} has {count} participants, the maximum is {max}")]
    TooMany { pool: Pool, count: usize, max: usize },
    #[error("the pools differ by {skew} participants, the maximum is {max}")]
    Skew { skew: usize, max: usize },
    #[error("the participant '{0}' is listed more than once")]
    DuplicateName(String),
    #[error("a participant has an empty name")]
    EmptyName,
    #[error("the participant '{0}' has no pool in a mixed roster")]
    MixedPools(String),
    #[error("there is no participant {0}")]
    UnknownParticipant(ParticipantId),
    #[error("a team needs two different participants, got {0} twice")]
    TeamOfOne(ParticipantId),
}
