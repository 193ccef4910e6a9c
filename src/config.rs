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

use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

pub const MIN_MIXED_POOL: usize = 3;
pub const MIN_SAME_POOL: usize = 4;
pub const MAX_POOL: usize = 20;
pub const MAX_SKEW: usize = 6;
pub const COMPLETENESS_FLOOR: f64 = 0.95;
pub const SHORTFALL_TOLERANCE: usize = 1;

/// How hard every randomized search may try before giving up.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SearchBudget {
    /// Restarts of the randomized team search.
    pub team_attempts: usize,
    /// Direct additions or swaps tried by the team completion pass.
    pub repair_passes: usize,
    /// Shuffled disjoint-pairing attempts of the match composer.
    pub compose_attempts: usize,
    /// Candidate distributions tried per round count.
    pub distribution_attempts: usize,
    /// How many times the round count may grow by one before a disjoint
    /// match that fits nowhere opens a round of its own.
    pub round_retries: usize,
    /// Shuffles tried when ordering the lanes of a round.
    pub ordering_attempts: usize,
    /// Run the restarts on one thread.
    pub sequential: bool,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            team_attempts: 1_000,
            repair_passes: 500,
            compose_attempts: 500,
            distribution_attempts: 1_000,
            round_retries: 6,
            ordering_attempts: 100,
            sequential: false,
        }
    }
}

impl SearchBudget {
    /// A small budget for tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            team_attempts: 64,
            repair_passes: 200,
            compose_attempts: 100,
            distribution_attempts: 128,
            round_retries: 8,
            ordering_attempts: 16,
            sequential: false,
        }
    }

    /// Runs `attempt` once per seed drawn from `rng`, in parallel unless the
    /// budget is sequential. Results keep the order of the seeds, so the
    /// outcome only depends on `rng`.
    pub(crate) fn run<R, T, F>(&self, attempts: usize, rng: &mut R, attempt: F) -> Vec<T>
    where
        R: Rng + ?Sized,
        T: Send,
        F: Fn(&mut StdRng) -> T + Sync + Send,
    {
        let seeds: Vec<u64> = (0..attempts.max(1)).map(|_| rng.random()).collect();
        let run_one = |seed: u64| attempt(&mut StdRng::seed_from_u64(seed));

        if self.sequential {
            seeds.into_iter().map(run_one).collect()
        } else {
            seeds.into_par_iter().map(run_one).collect()
        }
    }
}

/// Size limits checked before any search begins.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Bounds {
    pub min_mixed_pool: usize,
    pub min_same_pool: usize,
    pub max_pool: usize,
    pub max_skew: usize,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_mixed_pool: MIN_MIXED_POOL,
            min_same_pool: MIN_SAME_POOL,
            max_pool: MAX_POOL,
            max_skew: MAX_SKEW,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum SoloPolicy {
    /// A solo match is a played game for its two participants.
    #[default]
    CountsAsPlayed,
    /// A solo match leaves its two participants one game short.
    NotCounted,
}

impl fmt::Display for SoloPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountsAsPlayed => write!(f, "counts_as_played"),
            Self::NotCounted => write!(f, "not_counted"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub budget: SearchBudget,
    pub bounds: Bounds,
    /// The share of required teams below which a construction is an error.
    pub completeness_floor: f64,
    /// How many games short of the target anyone may end up.
    pub shortfall_tolerance: usize,
    pub solo_policy: SoloPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            budget: SearchBudget::default(),
            bounds: Bounds::default(),
            completeness_floor: COMPLETENESS_FLOOR,
            shortfall_tolerance: SHORTFALL_TOLERANCE,
            solo_policy: SoloPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn quick() -> Self {
        Self {
            budget: SearchBudget::quick(),
            ..Self::default()
        }
    }
}

impl FromStr for SchedulerConfig {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(string)?;

        if !(0.0..=1.0).contains(&config.completeness_floor) {
            return Err(anyhow::Error::msg(format!(
                "completeness_floor must be between 0 and 1, got {}",
                config.completeness_floor
            )));
        }

        Ok(config)
    }
}
