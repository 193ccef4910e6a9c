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

use std::{
    cmp::{Ordering, Reverse},
    collections::BTreeMap,
    fmt,
};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::SchedulerError,
    pairing::Pairing,
    participant::Pool,
    schedule::{MatchResult, Schedule},
    team::Team,
};

/// Results keyed by (round number, match index within the round).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Results(pub FxHashMap<(usize, usize), MatchResult>);

impl Results {
    pub fn insert(&mut self, round: usize, index: usize, result: MatchResult) {
        self.0.insert((round, index), result);
    }
}

impl From<&Schedule> for Results {
    fn from(schedule: &Schedule) -> Self {
        let mut results = Self::default();

        for round in &schedule.rounds {
            for (index, game) in round.matches.iter().enumerate() {
                if let Some(result) = game.result {
                    results.insert(round.number, index, result);
                }
            }
        }

        results
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Standing {
    pub name: String,
    pub pool: Pool,
    pub wins: u64,
    pub losses: u64,
    pub games_for: u64,
    pub games_against: u64,
    pub games_played: u64,
    pub game_differential: i64,
    /// Rounded to one decimal place.
    pub win_percentage: f64,
}

impl Standing {
    fn record(&mut self, games_for: u32, games_against: u32) {
        self.games_played += 1;
        self.games_for += u64::from(games_for);
        self.games_against += u64::from(games_against);

        match games_for.cmp(&games_against) {
            Ordering::Greater => self.wins += 1,
            Ordering::Less => self.losses += 1,
            Ordering::Equal => {}
        }
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub(crate) fn derive(&mut self) {
        self.game_differential = self.games_for as i64 - self.games_against as i64;
        self.win_percentage = if self.games_played == 0 {
            0.0
        } else {
            (self.wins as f64 / self.games_played as f64 * 1_000.0).round() / 10.0
        };
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} {:+} ({}:{}) {:.1}%",
            self.name,
            self.wins,
            self.losses,
            self.game_differential,
            self.games_for,
            self.games_against,
            self.win_percentage
        )
    }
}

/// One standing per participant of `schedule`, best first.
///
/// # Errors
///
/// If `results` has a key that names no match of `schedule`, or `schedule`
/// names a participant it doesn't have.
pub fn compute_standings(
    schedule: &Schedule,
    results: &Results,
) -> Result<Vec<Standing>, SchedulerError> {
    schedule.check_participants()?;

    let mut standings: Vec<Standing> = schedule
        .participants
        .iter()
        .map(|participant| Standing {
            name: participant.name.clone(),
            pool: participant.pool,
            ..Standing::default()
        })
        .collect();

    let mut keys: Vec<_> = results.0.keys().copied().collect();
    keys.sort_unstable();

    for (round, index) in keys {
        let game = schedule
            .get(round, index)
            .ok_or(SchedulerError::UnknownMatch { round, index })?;
        let result = results.0[&(round, index)];

        if !result.finalized {
            continue;
        }

        let (team_a, team_b) = match game.pairing {
            Pairing::Disjoint(team_a, team_b) | Pairing::Shared(team_a, team_b) => {
                (team_a, team_b)
            }
            Pairing::Solo(_) => continue,
        };

        let mut credit = |team: Team, games_for, games_against| {
            for member in team.members() {
                standings[member].record(games_for, games_against);
            }
        };

        credit(team_a, result.games_a, result.games_b);
        credit(team_b, result.games_b, result.games_a);
    }

    for standing in &mut standings {
        standing.derive();
    }

    standings.sort_by_key(|standing| {
        (
            Reverse(standing.wins),
            Reverse(standing.game_differential),
            Reverse(standing.games_for),
            standing.games_against,
        )
    });

    Ok(standings)
}

/// Splits ordered standings by pool, keeping the order inside each pool.
#[must_use]
pub fn standings_by_pool(standings: &[Standing]) -> BTreeMap<Pool, Vec<Standing>> {
    let mut pools: BTreeMap<Pool, Vec<Standing>> = BTreeMap::new();

    for standing in standings {
        pools
            .entry(standing.pool)
            .or_default()
            .push(standing.clone());
    }

    pools
}
