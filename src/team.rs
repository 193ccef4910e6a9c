use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::InvalidInput,
    participant::{Participant, ParticipantId},
};

/// An unordered partnership. The smaller id is always stored first, so the
/// derived `Eq` and `Hash` ignore the order the pair was given in.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "(ParticipantId, ParticipantId)")]
pub struct Team(ParticipantId, ParticipantId);

impl Team {
    #[must_use]
    pub fn new(x: ParticipantId, y: ParticipantId) -> Self {
        debug_assert_ne!(x, y, "a team needs two different participants");

        if x <= y { Self(x, y) } else { Self(y, x) }
    }

    #[must_use]
    pub fn first(&self) -> ParticipantId {
        self.0
    }

    #[must_use]
    pub fn second(&self) -> ParticipantId {
        self.1
    }

    #[must_use]
    pub fn members(&self) -> [ParticipantId; 2] {
        [self.0, self.1]
    }

    #[must_use]
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.0 == participant || self.1 == participant
    }

    #[must_use]
    pub fn is_disjoint(&self, other: &Team) -> bool {
        !self.contains(other.0) && !self.contains(other.1)
    }

    #[must_use]
    pub fn display<'a>(&self, participants: &'a [Participant]) -> TeamNames<'a> {
        TeamNames {
            team: *self,
            participants,
        }
    }
}

impl TryFrom<(ParticipantId, ParticipantId)> for Team {
    type Error = InvalidInput;

    fn try_from((x, y): (ParticipantId, ParticipantId)) -> Result<Self, Self::Error> {
        if x == y {
            return Err(InvalidInput::TeamOfOne(x));
        }

        Ok(Self::new(x, y))
    }
}

pub struct TeamNames<'a> {
    team: Team,
    participants: &'a [Participant],
}

impl fmt::Display for TeamNames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |id: ParticipantId| {
            self.participants
                .get(id)
                .map_or_else(|| format!("#{id}"), ToString::to_string)
        };

        write!(f, "{} & {}", name(self.team.0), name(self.team.1))
    }
}
