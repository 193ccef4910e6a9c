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

//! Which games-per-participant targets a pool can support.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{Bounds, COMPLETENESS_FLOOR},
    error::{InvalidInput, SchedulerError},
    participant::{Pool, PoolCounts},
};

pub const GAMES_RANGE: RangeInclusive<usize> = 3..=10;
pub const PREFERRED_GAMES: usize = 5;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GamesOption {
    pub games: usize,
    pub total_appearances: usize,
    pub teams_needed: usize,
    pub matches: usize,
    pub min_rounds: usize,
    /// Participant-rounds spent resting over `min_rounds` rounds.
    pub rest_slots: usize,
    /// The share of `teams_needed` the pools can structurally supply.
    pub completeness: f64,
}

#[derive(Clone, Debug, Deserialize, Error, Eq, PartialEq, Serialize)]
pub enum Rejection {
    #[error("{participants} participants times {games} games is odd")]
    OddAppearances { participants: usize, games: usize },
    #[error("{teams} teams can't be split into matches of two")]
    OddTeams { teams: usize },
    #[error("{needed} teams are needed but only {max} distinct teams exist")]
    TooManyTeams { needed: usize, max: usize },
    #[error("only {reachable} of {needed} teams can be formed from the pools")]
    Unreachable { reachable: usize, needed: usize },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Feasibility {
    pub feasible: bool,
    pub options: Vec<GamesOption>,
    pub rejected: Vec<(usize, Rejection)>,
    pub suggestion: Option<usize>,
    pub reason: Option<String>,
}

impl Feasibility {
    #[must_use]
    pub fn analyze(counts: PoolCounts, bounds: &Bounds, floor: f64) -> Self {
        if let Err(invalid) = check_bounds(counts, bounds) {
            return Self {
                feasible: false,
                options: Vec::new(),
                rejected: Vec::new(),
                suggestion: None,
                reason: Some(invalid.to_string()),
            };
        }

        let mut options = Vec::new();
        let mut rejected = Vec::new();

        for games in GAMES_RANGE {
            match evaluate(counts, games, floor) {
                Ok(option) => options.push(option),
                Err(rejection) => rejected.push((games, rejection)),
            }
        }

        let suggestion = if options.iter().any(|option| option.games == PREFERRED_GAMES) {
            Some(PREFERRED_GAMES)
        } else {
            options.first().map(|option| option.games)
        };

        let reason = if options.is_empty() {
            Some(format!(
                "no value of games per participant in {}..={} works for {counts} participants",
                GAMES_RANGE.start(),
                GAMES_RANGE.end()
            ))
        } else {
            None
        };

        Self {
            feasible: !options.is_empty(),
            options,
            rejected,
            suggestion,
            reason,
        }
    }

    /// # Errors
    ///
    /// If `games` isn't one of the feasible options.
    pub fn option(&self, games: usize) -> Result<&GamesOption, SchedulerError> {
        if let Some(option) = self.options.iter().find(|option| option.games == games) {
            return Ok(option);
        }

        let reason = if let Some((_, rejection)) = self.rejected.iter().find(|(k, _)| *k == games)
        {
            rejection.to_string()
        } else if let Some(reason) = &self.reason {
            reason.clone()
        } else {
            format!(
                "games per participant must be in {}..={}",
                GAMES_RANGE.start(),
                GAMES_RANGE.end()
            )
        };

        Err(SchedulerError::Infeasible { games, reason })
    }
}

/// Analyzes with the default bounds and completeness floor.
#[must_use]
pub fn analyze_feasibility(counts: PoolCounts) -> Feasibility {
    Feasibility::analyze(counts, &Bounds::default(), COMPLETENESS_FLOOR)
}

/// # Errors
///
/// If a pool is too small, too large, or the pools are too far apart.
pub fn check_bounds(counts: PoolCounts, bounds: &Bounds) -> Result<(), InvalidInput> {
    let pools = match counts {
        PoolCounts::Mixed { a, b } => vec![
            (Pool::A, a, bounds.min_mixed_pool),
            (Pool::B, b, bounds.min_mixed_pool),
        ],
        PoolCounts::SamePool(n) => vec![(Pool::Single, n, bounds.min_same_pool)],
    };

    for (pool, count, min) in pools {
        if count < min {
            return Err(InvalidInput::TooFew { pool, count, min });
        }

        if count > bounds.max_pool {
            return Err(InvalidInput::TooMany {
                pool,
                count,
                max: bounds.max_pool,
            });
        }
    }

    if let PoolCounts::Mixed { a, b } = counts {
        let skew = a.abs_diff(b);
        if skew > bounds.max_skew {
            return Err(InvalidInput::Skew {
                skew,
                max: bounds.max_skew,
            });
        }
    }

    Ok(())
}

/// # Errors
///
/// If `games` breaks a parity, combination or reachability rule.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(counts: PoolCounts, games: usize, floor: f64) -> Result<GamesOption, Rejection> {
    let participants = counts.total();
    let total_appearances = participants * games;

    if !total_appearances.is_multiple_of(2) {
        return Err(Rejection::OddAppearances {
            participants,
            games,
        });
    }

    let teams_needed = total_appearances / 2;
    if !teams_needed.is_multiple_of(2) {
        return Err(Rejection::OddTeams {
            teams: teams_needed,
        });
    }

    let (max, reachable, capacity) = match counts {
        PoolCounts::Mixed { a, b } => (
            a * b,
            (a * games.min(b)).min(b * games.min(a)),
            a.min(b) / 2,
        ),
        PoolCounts::SamePool(n) => (n * n.saturating_sub(1) / 2, teams_needed, n / 4),
    };

    if teams_needed > max {
        return Err(Rejection::TooManyTeams {
            needed: teams_needed,
            max,
        });
    }

    let reachable = reachable.min(teams_needed);
    let completeness = reachable as f64 / teams_needed as f64;
    if completeness < floor {
        return Err(Rejection::Unreachable {
            reachable,
            needed: teams_needed,
        });
    }

    let matches = teams_needed.div_ceil(2);
    let min_rounds = games.max(matches.div_ceil(capacity.max(1)));

    Ok(GamesOption {
        games,
        total_appearances,
        teams_needed,
        matches,
        min_rounds,
        rest_slots: (min_rounds * participants).saturating_sub(reachable * 2),
        completeness,
    })
}
