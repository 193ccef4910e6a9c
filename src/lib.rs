//! A fair doubles-pairing scheduler.
//!
//! Given a roster, either two pools for mixed doubles or a single pool, the
//! crate builds a multi-round schedule of two-team matches where everybody
//! plays the same number of games, nobody partners the same person twice,
//! nobody plays twice in a round, and rest is spread out.
//!
//! The pipeline runs in order:
//!
//! * [`feasibility`] - which games-per-participant targets a roster supports
//! * [`teams`] - the partnerships, exact for equal pools, searched otherwise
//! * [`compose`] - pairs teams into matches
//! * [`rounds`] - spreads matches over rounds
//! * [`standings`] - ranks participants from match results
//!
//! The three entry points are [`analyze_feasibility`], [`generate_schedule`]
//! and [`compute_standings`]. [`Scheduler`] keeps a seeded random source and
//! the partnerships already used across several calls.

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

#![deny(clippy::panic)]

pub mod compose;
pub mod config;
pub mod error;
pub mod feasibility;
pub mod pairing;
pub mod participant;
pub mod rounds;
pub mod schedule;
pub mod standings;
pub mod team;
pub mod teams;
pub mod utils;

pub use config::{SchedulerConfig, SearchBudget, SoloPolicy};
pub use error::{InvalidInput, SchedulerError};
pub use feasibility::{Feasibility, GamesOption, analyze_feasibility};
pub use pairing::{Pairing, Tag};
pub use participant::{Participant, ParticipantId, Pool, PoolCounts, Roster};
pub use schedule::{Match, MatchResult, Round, Schedule, Scheduler, generate_schedule};
pub use standings::{Results, Standing, compute_standings, standings_by_pool};
pub use team::Team;

pub const COPYRIGHT: &str = r".SH COPYRIGHT
Copyright (C) 2025-2026 David Lawrence Campbell

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
";

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "
Copyright (c) 2025 David Lawrence Campbell
Licensed under the AGPLv3"
);
