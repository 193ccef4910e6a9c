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

use log::{info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::{
    compose::compose_matches,
    config::{SchedulerConfig, SoloPolicy},
    error::{InvalidInput, SchedulerError},
    feasibility::{Feasibility, check_bounds},
    pairing::{Pairing, Tag},
    participant::{Mode, Participant, ParticipantId, Roster, compatible},
    rounds::{distribute, rotation_rounds},
    team::Team,
    teams::{Construction, generate_teams},
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchResult {
    pub games_a: u32,
    pub games_b: u32,
    pub finalized: bool,
}

impl MatchResult {
    #[must_use]
    pub fn finalized(games_a: u32, games_b: u32) -> Self {
        Self {
            games_a,
            games_b,
            finalized: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Match {
    /// 1-based position inside the round.
    pub lane: usize,
    pub pairing: Pairing,
    #[serde(default)]
    pub result: Option<MatchResult>,
}

impl Match {
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.pairing.tag()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Round {
    /// 1-based.
    pub number: usize,
    pub matches: Vec<Match>,
    pub resting: Vec<ParticipantId>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Schedule {
    pub mode: Mode,
    pub participants: Vec<Participant>,
    pub games: usize,
    pub construction: Construction,
    pub solo_policy: SoloPolicy,
    pub rounds: Vec<Round>,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} schedule, {} games each, {} construction",
            self.mode, self.games, self.construction
        )?;

        for round in &self.rounds {
            writeln!(f, "round {}:", round.number)?;

            for game in &round.matches {
                let names = |team: Team| team.display(&self.participants).to_string();
                match game.pairing.team_b() {
                    Some(team_b) => writeln!(
                        f,
                        "  lane {}: {} vs {} ({})",
                        game.lane,
                        names(game.pairing.team_a()),
                        names(team_b),
                        game.tag()
                    )?,
                    None => writeln!(
                        f,
                        "  lane {}: {} (solo)",
                        game.lane,
                        names(game.pairing.team_a())
                    )?,
                }
            }

            if !round.resting.is_empty() {
                let resting: Vec<_> = round
                    .resting
                    .iter()
                    .map(|id| {
                        self.participants
                            .get(*id)
                            .map_or_else(|| format!("#{id}"), ToString::to_string)
                    })
                    .collect();
                writeln!(f, "  resting: {}", resting.join(", "))?;
            }
        }

        Ok(())
    }
}

impl FromStr for Schedule {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let schedule: Self = ron::from_str(string)?;
        schedule.check_participants()?;

        Ok(schedule)
    }
}

/// Something a schedule should never contain.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Violation {
    UnknownParticipant(ParticipantId),
    RepeatedTeam(Team),
    IncompatibleTeam(Team),
    GamesPlayed {
        participant: ParticipantId,
        played: usize,
        expected: usize,
    },
    InRoundConflict {
        round: usize,
        participant: ParticipantId,
    },
    RestingMismatch {
        round: usize,
    },
}

impl Schedule {
    /// Numbers the rounds and lanes from 1 and works out who rests.
    #[must_use]
    pub fn new(
        mode: Mode,
        participants: Vec<Participant>,
        games: usize,
        construction: Construction,
        solo_policy: SoloPolicy,
        rounds: Vec<Vec<Pairing>>,
    ) -> Self {
        let count = participants.len();
        let rounds = rounds
            .into_iter()
            .enumerate()
            .map(|(number, pairings)| {
                let mut present = vec![false; count];
                for person in pairings.iter().flat_map(Pairing::participants) {
                    if let Some(present) = present.get_mut(person) {
                        *present = true;
                    }
                }

                Round {
                    number: number + 1,
                    matches: pairings
                        .into_iter()
                        .enumerate()
                        .map(|(lane, pairing)| Match {
                            lane: lane + 1,
                            pairing,
                            result: None,
                        })
                        .collect(),
                    resting: (0..count).filter(|id| !present[*id]).collect(),
                }
            })
            .collect();

        Self {
            mode,
            participants,
            games,
            construction,
            solo_policy,
            rounds,
        }
    }

    /// # Errors
    ///
    /// If a team or a resting list names a participant the schedule doesn't
    /// have.
    pub fn check_participants(&self) -> Result<(), InvalidInput> {
        let count = self.participants.len();
        let ids = self
            .teams()
            .flat_map(|team| team.members())
            .chain(self.rounds.iter().flat_map(|round| round.resting.iter().copied()));

        for id in ids {
            if id >= count {
                return Err(InvalidInput::UnknownParticipant(id));
            }
        }

        Ok(())
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|round| round.matches.iter())
    }

    pub fn teams(&self) -> impl Iterator<Item = Team> + '_ {
        self.matches().flat_map(|game| game.pairing.teams())
    }

    /// Matches each participant appears in, honoring the solo policy.
    #[must_use]
    pub fn games_played(&self) -> Vec<usize> {
        let mut played = vec![0; self.participants.len()];

        for game in self.matches() {
            if game.tag() == Tag::Solo && self.solo_policy == SoloPolicy::NotCounted {
                continue;
            }

            for member in game.pairing.teams().iter().flat_map(Team::members) {
                if let Some(played) = played.get_mut(member) {
                    *played += 1;
                }
            }
        }

        played
    }

    #[must_use]
    pub fn get(&self, round: usize, index: usize) -> Option<&Match> {
        self.rounds
            .get(round.checked_sub(1)?)
            .and_then(|round| round.matches.get(index))
    }

    /// Sets the result of match `index` (0-based) of round `round` (1-based).
    ///
    /// # Errors
    ///
    /// If there is no such match.
    pub fn record_result(
        &mut self,
        round: usize,
        index: usize,
        result: MatchResult,
    ) -> Result<(), SchedulerError> {
        let game = round
            .checked_sub(1)
            .and_then(|position| self.rounds.get_mut(position))
            .and_then(|found| found.matches.get_mut(index))
            .ok_or(SchedulerError::UnknownMatch { round, index })?;

        game.result = Some(result);
        Ok(())
    }

    /// Checks the invariants every generated schedule keeps. `tolerance` is
    /// how many games short of the target a participant may be.
    #[must_use]
    pub fn validate(&self, tolerance: usize) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen = FxHashSet::default();

        if let Err(InvalidInput::UnknownParticipant(id)) = self.check_participants() {
            violations.push(Violation::UnknownParticipant(id));
            return violations;
        }

        for team in self.teams() {
            if !seen.insert(team) {
                violations.push(Violation::RepeatedTeam(team));
            }
            if !compatible(&self.participants, team.first(), team.second()) {
                violations.push(Violation::IncompatibleTeam(team));
            }
        }

        for (participant, played) in self.games_played().into_iter().enumerate() {
            if played > self.games || played + tolerance < self.games {
                violations.push(Violation::GamesPlayed {
                    participant,
                    played,
                    expected: self.games,
                });
            }
        }

        for round in &self.rounds {
            let mut busy = FxHashSet::default();
            let mut present = FxHashSet::default();

            for game in &round.matches {
                let people = game.pairing.participants();
                present.extend(people.iter().copied());

                if game.tag() != Tag::Disjoint {
                    continue;
                }

                for participant in people {
                    if !busy.insert(participant) {
                        violations.push(Violation::InRoundConflict {
                            round: round.number,
                            participant,
                        });
                    }
                }
            }

            let everyone = round.resting.len() + present.len() == self.participants.len();
            if !everyone || round.resting.iter().any(|id| present.contains(id)) {
                violations.push(Violation::RestingMismatch {
                    round: round.number,
                });
            }
        }

        violations
    }
}

/// Runs the whole pipeline: feasibility, teams, matches, rounds.
///
/// # Errors
///
/// If the roster is invalid, `games` is infeasible for it, or the randomized
/// search falls short within its budget.
pub fn generate_schedule<R: Rng + ?Sized>(
    roster: &Roster,
    games: usize,
    config: &SchedulerConfig,
    rng: &mut R,
) -> Result<Schedule, SchedulerError> {
    generate_schedule_avoiding(roster, games, config, &FxHashSet::default(), rng)
}

fn generate_schedule_avoiding<R: Rng + ?Sized>(
    roster: &Roster,
    games: usize,
    config: &SchedulerConfig,
    forbidden: &FxHashSet<Team>,
    rng: &mut R,
) -> Result<Schedule, SchedulerError> {
    roster.check_names()?;

    let counts = roster.counts();
    check_bounds(counts, &config.bounds)?;

    let feasibility = Feasibility::analyze(counts, &config.bounds, config.completeness_floor);
    let option = feasibility.option(games)?;

    let participants = roster.participants();
    let team_set = generate_teams(
        &participants,
        games,
        option.teams_needed,
        forbidden,
        config,
        rng,
    )?;

    let rotations = if team_set.construction == Construction::Exact {
        rotation_rounds(&team_set.teams, participants.len() / 2, &config.budget, rng)
    } else {
        None
    };

    let (rounds, solos) = if let Some(rounds) = rotations {
        (rounds, 0)
    } else {
        let pairings = compose_matches(&team_set.teams, &config.budget, rng);
        let solos = pairings
            .iter()
            .filter(|pairing| pairing.tag() == Tag::Solo)
            .count();

        let rounds = distribute(
            &pairings,
            participants.len(),
            option.min_rounds,
            &config.budget,
            rng,
        );
        (rounds, solos)
    };

    let mut construction = team_set.construction;
    if solos > 0 && config.solo_policy == SoloPolicy::NotCounted {
        warn!("schedule: a solo match leaves two participants a game short");

        if construction != Construction::Exact {
            construction = Construction::Partial {
                teams: team_set.teams.len() - solos,
                required: team_set.required,
            };
        }
    }

    let matches: usize = rounds.iter().map(Vec::len).sum();
    info!(
        "schedule: {counts} participants, {games} games each, {} teams, {matches} matches, {} rounds",
        team_set.teams.len(),
        rounds.len()
    );

    Ok(Schedule::new(
        roster.mode(),
        participants,
        games,
        construction,
        config.solo_policy,
        rounds,
    ))
}

/// Generates several schedules in one run without ever repeating a
/// partnership, and replays deterministically from a seed.
#[derive(Clone, Debug)]
pub struct Scheduler {
    pub config: SchedulerConfig,
    rng: StdRng,
    /// Partnerships already used, by lowercase name.
    partnerships: FxHashSet<(String, String)>,
}

impl Scheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
            partnerships: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn seeded(config: SchedulerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            partnerships: FxHashSet::default(),
        }
    }

    /// Like [`generate_schedule`], also avoiding every partnership formed by
    /// earlier calls and remembering the new ones.
    ///
    /// # Errors
    ///
    /// See [`generate_schedule`].
    pub fn generate_schedule(
        &mut self,
        roster: &Roster,
        games: usize,
    ) -> Result<Schedule, SchedulerError> {
        let participants = roster.participants();
        let ids: FxHashMap<String, ParticipantId> = participants
            .iter()
            .enumerate()
            .map(|(id, participant)| (participant.name.to_lowercase(), id))
            .collect();

        let forbidden = self
            .partnerships
            .iter()
            .filter_map(|(x, y)| Some(Team::new(*ids.get(x)?, *ids.get(y)?)))
            .collect();

        let schedule =
            generate_schedule_avoiding(roster, games, &self.config, &forbidden, &mut self.rng)?;

        self.forbid_teams_from(&schedule);
        Ok(schedule)
    }

    /// Never pair the teammates of `schedule` again.
    pub fn forbid_teams_from(&mut self, schedule: &Schedule) {
        for team in schedule.teams() {
            let mut names = [team.first(), team.second()]
                .map(|id| schedule.participants[id].name.to_lowercase());
            names.sort();
            let [x, y] = names;
            self.partnerships.insert((x, y));
        }
    }

    #[must_use]
    pub fn partnerships(&self) -> usize {
        self.partnerships.len()
    }
}
