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

//! Builds the multiset of teams every participant plays in.

use std::{cmp::Reverse, fmt};

use log::{debug, trace, warn};
use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    config::SchedulerConfig,
    error::SchedulerError,
    participant::{Participant, ParticipantId, Pool, compatible},
    team::Team,
};

/// Attempts handed to the thread pool at once. Fixed so that the outcome
/// doesn't depend on the number of threads.
const ATTEMPT_BATCH: usize = 32;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Construction {
    /// Circular round-robin over two pools of equal size.
    Exact,
    /// Randomized search that reached every required team.
    Searched,
    /// Randomized search above the completeness floor but short of `required`.
    Partial { teams: usize, required: usize },
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Searched => write!(f, "searched"),
            Self::Partial { teams, required } => write!(f, "partial {teams}/{required}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TeamSet {
    pub teams: Vec<Team>,
    pub required: usize,
    pub construction: Construction,
}

/// # Errors
///
/// If the search can't reach the completeness floor, or leaves somebody
/// further than the tolerance from `games`.
pub fn generate_teams<R: Rng + ?Sized>(
    participants: &[Participant],
    games: usize,
    required: usize,
    forbidden: &FxHashSet<Team>,
    config: &SchedulerConfig,
    rng: &mut R,
) -> Result<TeamSet, SchedulerError> {
    if let Some(teams) = round_robin(participants, games, forbidden, rng) {
        debug!("teams: round-robin built {} teams", teams.len());

        return Ok(TeamSet {
            teams,
            required,
            construction: Construction::Exact,
        });
    }

    let budget = &config.budget;
    let mut best: Option<Attempt> = None;
    let mut left = budget.team_attempts.max(1);

    while left > 0 {
        let batch = left.min(ATTEMPT_BATCH);
        left -= batch;

        let attempts = budget.run(batch, rng, |rng| {
            Attempt::search(participants, games, required, forbidden, rng)
        });

        for attempt in attempts {
            if best
                .as_ref()
                .is_none_or(|best| attempt.key(required) < best.key(required))
            {
                best = Some(attempt);
            }
        }

        if best
            .as_ref()
            .is_some_and(|best| best.key(required) == (0, 0))
        {
            break;
        }
    }

    let mut best = best.ok_or(SchedulerError::ConstructionIncomplete { built: 0, required })?;

    trace!(
        "teams: best attempt has {} of {required} teams after {} attempts",
        best.teams.len(),
        budget.team_attempts.max(1) - left
    );

    best.complete(participants, required, forbidden, budget.repair_passes);

    let built = best.teams.len();
    let shortfall = best.remaining.iter().copied().max().unwrap_or_default();
    #[allow(clippy::cast_precision_loss)]
    let completeness = built as f64 / required as f64;

    if completeness < config.completeness_floor || shortfall > config.shortfall_tolerance {
        debug!(
            "teams: built {built} of {required}, someone is {shortfall} games short, giving up"
        );

        return Err(SchedulerError::ConstructionIncomplete { built, required });
    }

    let construction = if built == required {
        Construction::Searched
    } else {
        warn!(
            "teams: accepting {built} of {required} teams ({:.1}%)",
            completeness * 100.0
        );

        Construction::Partial {
            teams: built,
            required,
        }
    };

    Ok(TeamSet {
        teams: best.teams,
        required,
        construction,
    })
}

/// Pairs `A[i]` with `B[(i + r) mod n]` for `games` rotation offsets `r`.
/// Every offset is a perfect matching between the pools and distinct offsets
/// never repeat a team. Returns `None` unless both pools have the same size
/// and enough offsets avoid the forbidden teams.
fn round_robin<R: Rng + ?Sized>(
    participants: &[Participant],
    games: usize,
    forbidden: &FxHashSet<Team>,
    rng: &mut R,
) -> Option<Vec<Team>> {
    let pool = |tag: Pool| -> Vec<ParticipantId> {
        (0..participants.len())
            .filter(|id| participants[*id].pool == tag)
            .collect()
    };

    let mut pool_a = pool(Pool::A);
    let mut pool_b = pool(Pool::B);
    let n = pool_a.len();

    if n == 0 || n != pool_b.len() || games > n {
        return None;
    }

    pool_a.shuffle(rng);
    pool_b.shuffle(rng);

    let (pool_a, pool_b) = (&pool_a, &pool_b);
    let rotation =
        |offset: usize| (0..n).map(move |i| Team::new(pool_a[i], pool_b[(i + offset) % n]));

    let offsets: Vec<usize> = (0..n)
        .filter(|offset| rotation(*offset).all(|team| !forbidden.contains(&team)))
        .take(games)
        .collect();

    if offsets.len() < games {
        debug!(
            "teams: only {} clean rotations for {games} games, searching instead",
            offsets.len()
        );
        return None;
    }

    Some(offsets.into_iter().flat_map(rotation).collect())
}

fn taken(team: &Team, used: &FxHashSet<Team>, forbidden: &FxHashSet<Team>) -> bool {
    used.contains(team) || forbidden.contains(team)
}

/// A new team between two open participants.
fn direct(
    participants: &[Participant],
    open: &[ParticipantId],
    used: &FxHashSet<Team>,
    forbidden: &FxHashSet<Team>,
) -> Option<Team> {
    open.iter().enumerate().find_map(|(i, &u)| {
        open[i + 1..].iter().find_map(|&v| {
            let team = Team::new(u, v);
            (compatible(participants, u, v) && !taken(&team, used, forbidden)).then_some(team)
        })
    })
}

#[derive(Clone, Debug)]
struct Attempt {
    teams: Vec<Team>,
    remaining: Vec<usize>,
}

impl Attempt {
    /// Fewer missing teams first, then the smaller worst shortfall.
    fn key(&self, required: usize) -> (usize, usize) {
        (
            required.saturating_sub(self.teams.len()),
            self.remaining.iter().copied().max().unwrap_or_default(),
        )
    }

    /// Greedily pairs the participants with the most remaining slots.
    fn search<R: Rng + ?Sized>(
        participants: &[Participant],
        games: usize,
        required: usize,
        forbidden: &FxHashSet<Team>,
        rng: &mut R,
    ) -> Self {
        let mut attempt = Self {
            teams: Vec::with_capacity(required),
            remaining: vec![games; participants.len()],
        };
        let mut used = FxHashSet::default();
        let mut order: Vec<ParticipantId> = (0..participants.len()).collect();

        while attempt.teams.len() < required {
            order.shuffle(rng);
            order.sort_by_key(|id| Reverse(attempt.remaining[*id]));

            let mut formed = None;
            'outer: for (i, &x) in order.iter().enumerate() {
                if attempt.remaining[x] == 0 {
                    break;
                }

                for &y in &order[i + 1..] {
                    if attempt.remaining[y] == 0 {
                        break;
                    }

                    let team = Team::new(x, y);
                    if compatible(participants, x, y) && !taken(&team, &used, forbidden) {
                        formed = Some(team);
                        break 'outer;
                    }
                }
            }

            let Some(team) = formed else {
                break;
            };

            used.insert(team);
            attempt.add(team);
        }

        attempt
    }

    fn add(&mut self, team: Team) {
        for member in team.members() {
            self.remaining[member] -= 1;
        }
        self.teams.push(team);
    }

    /// Closes the gap left by the greedy search, first with teams between open
    /// participants, then by splitting an existing team `(x, y)` into
    /// `(u, x)` and `(v, y)` for open participants `u` and `v`.
    fn complete(
        &mut self,
        participants: &[Participant],
        required: usize,
        forbidden: &FxHashSet<Team>,
        passes: usize,
    ) {
        let mut used: FxHashSet<Team> = self.teams.iter().copied().collect();

        for _ in 0..passes {
            if self.teams.len() >= required {
                return;
            }

            let open: Vec<ParticipantId> = (0..participants.len())
                .filter(|id| self.remaining[*id] > 0)
                .collect();

            if let Some(team) = direct(participants, &open, &used, forbidden) {
                trace!("teams: completion adds {team:?}");
                used.insert(team);
                self.add(team);
                continue;
            }

            let Some((index, first, second)) = self.swap(participants, &open, &used, forbidden)
            else {
                return;
            };

            trace!(
                "teams: completion splits {:?} into {first:?} and {second:?}",
                self.teams[index]
            );

            used.remove(&self.teams[index]);
            used.insert(first);
            used.insert(second);

            // The split team's members keep their counts, each open
            // participant gains one team.
            for member in self.teams[index].members() {
                self.remaining[member] += 1;
            }
            self.teams.swap_remove(index);
            self.add(first);
            self.add(second);
        }
    }

    fn swap(
        &self,
        participants: &[Participant],
        open: &[ParticipantId],
        used: &FxHashSet<Team>,
        forbidden: &FxHashSet<Team>,
    ) -> Option<(usize, Team, Team)> {
        for (i, &u) in open.iter().enumerate() {
            for &v in &open[i..] {
                if u == v && self.remaining[u] < 2 {
                    continue;
                }

                for (index, team) in self.teams.iter().enumerate() {
                    let [first, second] = team.members();

                    for (x, y) in [(first, second), (second, first)] {
                        if [x, y].iter().any(|member| *member == u || *member == v) {
                            continue;
                        }

                        if !compatible(participants, u, x) || !compatible(participants, v, y) {
                            continue;
                        }

                        let (new_1, new_2) = (Team::new(u, x), Team::new(v, y));
                        if !taken(&new_1, used, forbidden) && !taken(&new_2, used, forbidden) {
                            return Some((index, new_1, new_2));
                        }
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::{Attempt, Team};
    use crate::participant::{Participant, Roster};

    fn same_pool(n: usize) -> Vec<Participant> {
        Roster::SamePool((0..n).map(|i| format!("p{i}")).collect()).participants()
    }

    #[test]
    fn completion_splits_a_team() {
        let participants = same_pool(6);

        // p4 and p5 still need a game, but may not play together, so the only
        // way forward is to break up p0 & p1.
        let forbidden: FxHashSet<_> = [Team::new(4, 5)].into_iter().collect();
        let mut attempt = Attempt {
            teams: vec![Team::new(0, 1)],
            remaining: vec![0, 0, 0, 0, 1, 1],
        };

        attempt.complete(&participants, 2, &forbidden, 10);

        let mut teams = attempt.teams.clone();
        teams.sort();
        assert_eq!(teams, [Team::new(0, 4), Team::new(1, 5)]);
        assert!(attempt.remaining.iter().all(|remaining| *remaining == 0));
    }

    #[test]
    fn completion_gives_up_without_moves() {
        let participants = same_pool(4);

        let forbidden: FxHashSet<_> = [Team::new(2, 3)].into_iter().collect();
        let mut attempt = Attempt {
            teams: Vec::new(),
            remaining: vec![0, 0, 1, 1],
        };

        attempt.complete(&participants, 1, &forbidden, 10);

        assert!(attempt.teams.is_empty());
        assert_eq!(attempt.key(1), (1, 1));
    }
}
