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

//! Spreads matches over rounds so nobody plays twice in a round and play and
//! rest alternate as evenly as possible.

use std::cmp::Reverse;

use log::{debug, trace};
use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashMap;

use crate::{config::SearchBudget, pairing::Pairing, participant::ParticipantId, team::Team};

/// Places every pairing in a round. Starts from `start_rounds` and adds a
/// round whenever no attempt places every disjoint match, up to
/// `round_retries` times. Past that, attempts open a new round for any
/// disjoint match that fits nowhere, so the result always holds every
/// pairing.
#[must_use]
pub fn distribute<R: Rng + ?Sized>(
    pairings: &[Pairing],
    participants: usize,
    start_rounds: usize,
    budget: &SearchBudget,
    rng: &mut R,
) -> Vec<Vec<Pairing>> {
    if pairings.is_empty() {
        return Vec::new();
    }

    let start = start_rounds.max(1);
    let limits = (start..=start + budget.round_retries)
        .map(|rounds| (rounds, false))
        .chain([(start, true)]);

    for (rounds, grow) in limits {
        let best = budget
            .run(budget.distribution_attempts, rng, |rng| {
                Distribution::attempt(pairings, participants, rounds, grow, rng)
            })
            .into_iter()
            .flatten()
            .min_by_key(|distribution| (distribution.slots.len(), distribution.penalty));

        let Some(best) = best else {
            debug!("rounds: no distribution over {rounds} rounds, adding a round");
            continue;
        };

        debug!(
            "rounds: {} matches over {} rounds, penalty {}",
            pairings.len(),
            best.slots.len(),
            best.penalty
        );

        let mut schedule: Vec<Vec<Pairing>> = best
            .slots
            .into_iter()
            .map(|slot| slot.into_iter().map(|index| pairings[index]).collect())
            .collect();

        order_lanes(&mut schedule, budget, rng);
        return schedule;
    }

    pairings.iter().map(|pairing| vec![*pairing]).collect()
}

/// One round per rotation of the exact construction. `teams` holds the
/// rotations one after another, `round_size` teams each. Every rotation is a
/// perfect matching between the pools, so any two of its teams make a
/// disjoint match and the rotation fills a round with nobody resting.
/// Returns `None` when a rotation can't be split into matches evenly.
#[must_use]
pub fn rotation_rounds<R: Rng + ?Sized>(
    teams: &[Team],
    round_size: usize,
    budget: &SearchBudget,
    rng: &mut R,
) -> Option<Vec<Vec<Pairing>>> {
    if round_size == 0
        || !round_size.is_multiple_of(2)
        || !teams.len().is_multiple_of(round_size)
    {
        return None;
    }

    let mut rounds: Vec<Vec<Pairing>> = teams
        .chunks_exact(round_size)
        .map(|rotation| {
            let mut rotation = rotation.to_vec();
            rotation.shuffle(rng);

            rotation
                .chunks_exact(2)
                .map(|pair| Pairing::Disjoint(pair[0], pair[1]))
                .collect()
        })
        .collect();
    rounds.shuffle(rng);

    debug!("rounds: {} rotations, one round each", rounds.len());

    order_lanes(&mut rounds, budget, rng);
    Some(rounds)
}

/// How an attempt chooses among the rounds a match fits in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Fill {
    /// The least loaded round first, spreading matches out.
    Spread,
    /// The most loaded round first, packing matches into fewer rounds.
    Pack,
}

impl Fill {
    fn weight(self, load: usize) -> usize {
        match self {
            Self::Spread => load,
            Self::Pack => usize::MAX - load,
        }
    }
}

#[derive(Clone, Debug)]
struct Distribution {
    /// Indexes into the pairings, per non-empty round.
    slots: Vec<Vec<usize>>,
    penalty: u64,
}

impl Distribution {
    /// Places every match or returns how many were placed before one of the
    /// disjoint matches found no free round. With `grow` such a match opens a
    /// new round instead.
    fn attempt<R: Rng + ?Sized>(
        pairings: &[Pairing],
        participants: usize,
        rounds: usize,
        grow: bool,
        rng: &mut R,
    ) -> Result<Self, usize> {
        let fill = if rng.random() { Fill::Pack } else { Fill::Spread };

        let mut order: Vec<usize> = (0..pairings.len()).collect();
        order.shuffle(rng);
        order.sort_by_key(|index| pairings[*index].is_relaxed());

        let mut busy = vec![vec![false; participants]; rounds];
        let mut load = vec![0_usize; rounds];
        let mut slots = vec![Vec::new(); rounds];
        let mut played: Vec<Vec<usize>> = vec![Vec::new(); participants];

        for (placed, index) in order.into_iter().enumerate() {
            let pairing = &pairings[index];
            let people = pairing.participants();
            let open = busy.len();

            let conflicts =
                |round: usize| people.iter().filter(|person| busy[round][**person]).count();
            let spacing = |round: usize| {
                people
                    .iter()
                    .flat_map(|person| played[*person].iter())
                    .map(|other| other.abs_diff(round))
                    .min()
                    .unwrap_or(open)
            };

            let chosen = (0..open)
                .filter(|round| conflicts(*round) == 0)
                .min_by_key(|round| {
                    (
                        fill.weight(load[*round]),
                        Reverse(spacing(*round)),
                        rng.random::<u32>(),
                    )
                });

            let round = match chosen {
                Some(round) => round,
                None if pairing.is_relaxed() => (0..open)
                    .min_by_key(|round| (conflicts(*round), load[*round]))
                    .unwrap_or_default(),
                None if grow => {
                    busy.push(vec![false; participants]);
                    load.push(0);
                    slots.push(Vec::new());
                    open
                }
                None => return Err(placed),
            };

            for person in people {
                busy[round][person] = true;
                played[person].push(round);
                load[round] += 1;
            }
            slots[round].push(index);
        }

        slots.retain(|slot| !slot.is_empty());
        let penalty = penalty(pairings, &slots, participants);
        Ok(Self { slots, penalty })
    }
}

/// The sum over participants of the squared longest run of consecutive
/// played rounds plus the squared longest run of consecutive resting rounds.
#[must_use]
pub(crate) fn penalty(pairings: &[Pairing], slots: &[Vec<usize>], participants: usize) -> u64 {
    let mut plays = vec![vec![false; slots.len()]; participants];

    for (round, slot) in slots.iter().enumerate() {
        for index in slot {
            for person in pairings[*index].participants() {
                plays[person][round] = true;
            }
        }
    }

    plays
        .iter()
        .map(|row| {
            let (played, rested) = longest_streaks(row);
            (played * played + rested * rested) as u64
        })
        .sum()
}

/// The longest run of `true` and the longest run of `false`.
#[must_use]
pub(crate) fn longest_streaks(row: &[bool]) -> (usize, usize) {
    let mut longest = [0, 0];
    let mut current = 0;
    let mut previous = None;

    for &value in row {
        current = if previous == Some(value) { current + 1 } else { 1 };
        previous = Some(value);

        let slot = usize::from(!value);
        longest[slot] = longest[slot].max(current);
    }

    (longest[0], longest[1])
}

/// Reorders the matches inside each round so the same participant isn't
/// listed back to back across the flattened sequence of lanes.
fn order_lanes<R: Rng + ?Sized>(rounds: &mut [Vec<Pairing>], budget: &SearchBudget, rng: &mut R) {
    let width = rounds.iter().map(Vec::len).max().unwrap_or_default();
    let mut last_seen: FxHashMap<ParticipantId, usize> = FxHashMap::default();
    let mut position = 0;

    for (number, round) in rounds.iter_mut().enumerate() {
        if round.len() > 1 {
            let mut best_cost = adjacency_cost(round, &last_seen, position, width);

            for _ in 0..budget.ordering_attempts {
                if best_cost == 0 {
                    break;
                }

                let mut candidate = round.clone();
                candidate.shuffle(rng);

                let cost = adjacency_cost(&candidate, &last_seen, position, width);
                if cost < best_cost {
                    *round = candidate;
                    best_cost = cost;
                }
            }

            trace!("rounds: round {} lane order cost {best_cost}", number + 1);
        }

        for (offset, pairing) in round.iter().enumerate() {
            for person in pairing.participants() {
                last_seen.insert(person, position + offset);
            }
        }
        position += round.len();
    }
}

fn adjacency_cost(
    order: &[Pairing],
    last_seen: &FxHashMap<ParticipantId, usize>,
    start: usize,
    width: usize,
) -> usize {
    let mut seen = last_seen.clone();
    let mut cost = 0;

    for (offset, pairing) in order.iter().enumerate() {
        let here = start + offset;

        for person in pairing.participants() {
            if let Some(previous) = seen.insert(person, here) {
                let gap = here - previous;
                if gap <= width {
                    cost += (width + 1 - gap).pow(2);
                }
            }
        }
    }

    cost
}
