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

use log::{debug, warn};
use rand::{Rng, seq::SliceRandom};

use crate::{config::SearchBudget, pairing::Pairing, team::Team};

/// Turns every team into exactly one match: disjoint pairs where possible,
/// then shared pairs, then at most one solo team.
#[must_use]
pub fn compose_matches<R: Rng + ?Sized>(
    teams: &[Team],
    budget: &SearchBudget,
    rng: &mut R,
) -> Vec<Pairing> {
    let parity = teams.len() % 2;
    let mut best: Option<(Vec<(Team, Team)>, Vec<Team>)> = None;

    for _ in 0..budget.compose_attempts.max(1) {
        let (pairs, leftovers) = pair_disjoint(teams, rng);

        if best
            .as_ref()
            .is_none_or(|(_, best)| leftovers.len() < best.len())
        {
            best = Some((pairs, leftovers));
        }

        if best
            .as_ref()
            .is_some_and(|(_, leftovers)| leftovers.len() <= parity)
        {
            break;
        }
    }

    let (pairs, leftovers) = best.unwrap_or_default();
    let mut matches: Vec<_> = pairs
        .into_iter()
        .map(|(team_a, team_b)| Pairing::Disjoint(team_a, team_b))
        .collect();

    if leftovers.len() > parity {
        debug!(
            "compose: {} teams have no disjoint opponent left",
            leftovers.len()
        );
    }

    let mut leftovers = leftovers.chunks_exact(2);
    for pair in leftovers.by_ref() {
        matches.push(Pairing::between(pair[0], pair[1]));
    }

    if let [team] = leftovers.remainder() {
        warn!("compose: {team:?} has no opponent and plays solo");
        matches.push(Pairing::Solo(*team));
    }

    matches
}

fn pair_disjoint<R: Rng + ?Sized>(teams: &[Team], rng: &mut R) -> (Vec<(Team, Team)>, Vec<Team>) {
    let mut unmatched = teams.to_vec();
    unmatched.shuffle(rng);

    let mut pairs = Vec::with_capacity(teams.len() / 2);
    let mut leftovers = Vec::new();

    while let Some(team) = unmatched.pop() {
        if let Some(index) = unmatched.iter().position(|other| team.is_disjoint(other)) {
            pairs.push((team, unmatched.swap_remove(index)));
        } else {
            leftovers.push(team);
        }
    }

    (pairs, leftovers)
}
