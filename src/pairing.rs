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

use serde::{Deserialize, Serialize};

use crate::{participant::ParticipantId, team::Team};

/// Who faces whom in one match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Pairing {
    /// The two teams share nobody.
    Disjoint(Team, Team),
    /// The two teams share a participant, used when nothing disjoint is left.
    Shared(Team, Team),
    /// A team without an opponent.
    Solo(Team),
}

impl Pairing {
    /// Tags the pair by its actual overlap.
    #[must_use]
    pub fn between(team_a: Team, team_b: Team) -> Self {
        if team_a.is_disjoint(&team_b) {
            Self::Disjoint(team_a, team_b)
        } else {
            Self::Shared(team_a, team_b)
        }
    }

    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Disjoint(..) => Tag::Disjoint,
            Self::Shared(..) => Tag::Shared,
            Self::Solo(_) => Tag::Solo,
        }
    }

    #[must_use]
    pub fn team_a(&self) -> Team {
        match self {
            Self::Disjoint(team, _) | Self::Shared(team, _) | Self::Solo(team) => *team,
        }
    }

    #[must_use]
    pub fn team_b(&self) -> Option<Team> {
        match self {
            Self::Disjoint(_, team) | Self::Shared(_, team) => Some(*team),
            Self::Solo(_) => None,
        }
    }

    #[must_use]
    pub fn teams(&self) -> Vec<Team> {
        let mut teams = vec![self.team_a()];
        teams.extend(self.team_b());
        teams
    }

    /// Every participant of the match, once each.
    #[must_use]
    pub fn participants(&self) -> Vec<ParticipantId> {
        let mut participants: Vec<_> = self.teams().iter().flat_map(Team::members).collect();
        participants.sort_unstable();
        participants.dedup();
        participants
    }

    /// Whether the round distributor may place it next to a conflicting match.
    #[must_use]
    pub fn is_relaxed(&self) -> bool {
        match self {
            Self::Disjoint(..) => false,
            Self::Shared(..) | Self::Solo(_) => true,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Tag {
    Disjoint,
    Shared,
    Solo,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Disjoint => write!(f, "disjoint"),
            Tag::Shared => write!(f, "shared"),
            Tag::Solo => write!(f, "solo"),
        }
    }
}

impl FromStr for Tag {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string {
            "disjoint" => Ok(Self::Disjoint),
            "shared" => Ok(Self::Shared),
            "solo" => Ok(Self::Solo),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Tag!"
            ))),
        }
    }
}
