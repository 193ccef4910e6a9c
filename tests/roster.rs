use std::{io::Cursor, str::FromStr};

use rand::{Rng, SeedableRng, rngs::StdRng};

use doubles_draw::{
    InvalidInput, MatchResult, Participant, Pool, Results, Roster, Schedule, SchedulerConfig, Tag,
    analyze_feasibility, compute_standings, generate_schedule, standings_by_pool,
    teams::Construction,
};

#[derive(Debug, serde::Deserialize)]
struct Record {
    name: String,
    pool: String,
}

/// # Errors
///
/// If the roster fixture is invalid.
pub fn setup_roster() -> anyhow::Result<Vec<Participant>> {
    let roster_csv = include_str!("roster.csv");
    participants_from_csv(roster_csv)
}

/// # Errors
///
/// If a row is malformed or names an unknown pool.
pub fn participants_from_csv(string: &str) -> anyhow::Result<Vec<Participant>> {
    let cursor = Cursor::new(string);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(cursor);

    let mut participants = Vec::new();
    for result in rdr.deserialize() {
        let record: Record = result?;
        participants.push(Participant {
            name: record.name,
            pool: Pool::from_str(&record.pool)?,
        });
    }

    Ok(participants)
}

fn play_out(schedule: &mut Schedule, rng: &mut StdRng) -> anyhow::Result<()> {
    let positions: Vec<_> = schedule
        .rounds
        .iter()
        .flat_map(|round| (0..round.matches.len()).map(move |index| (round.number, index)))
        .collect();

    for (round, index) in positions {
        let winner = rng.random_range(0..2);
        let loser_games = rng.random_range(0..6);
        let result = if winner == 0 {
            MatchResult::finalized(6, loser_games)
        } else {
            MatchResult::finalized(loser_games, 6)
        };

        schedule.record_result(round, index, result)?;
    }

    Ok(())
}

#[test]
fn mixed_roster_from_csv() -> anyhow::Result<()> {
    let roster = Roster::try_from(setup_roster()?)?;
    let counts = roster.counts();

    let feasibility = analyze_feasibility(counts);
    assert_eq!(feasibility.suggestion, Some(5));

    let mut rng = StdRng::seed_from_u64(20);
    let mut schedule = generate_schedule(&roster, 5, &SchedulerConfig::quick(), &mut rng)?;

    assert_eq!(schedule.construction, Construction::Exact);
    assert!(schedule.validate(0).is_empty());
    assert_eq!(schedule.matches().count(), 25);
    assert_eq!(schedule.rounds.len(), 5);
    assert!(schedule.matches().all(|game| game.tag() == Tag::Disjoint));

    play_out(&mut schedule, &mut rng)?;

    let standings = compute_standings(&schedule, &Results::from(&schedule))?;
    assert_eq!(standings.len(), 20);
    assert!(standings.iter().all(|standing| standing.games_played == 5));

    let wins: u64 = standings.iter().map(|standing| standing.wins).sum();
    let losses: u64 = standings.iter().map(|standing| standing.losses).sum();
    assert_eq!(wins, 50);
    assert_eq!(losses, 50);

    let pools = standings_by_pool(&standings);
    assert_eq!(pools[&Pool::A].len(), 10);
    assert_eq!(pools[&Pool::B].len(), 10);

    Ok(())
}

#[test]
fn same_pool_roster_from_csv() -> anyhow::Result<()> {
    let names: Vec<_> = setup_roster()?
        .into_iter()
        .filter(|participant| participant.pool == Pool::A)
        .map(|participant| participant.name)
        .collect();
    let roster = Roster::SamePool(names);

    let feasibility = analyze_feasibility(roster.counts());
    let Some(games) = feasibility.suggestion else {
        panic!("ten players always have a feasible number of games");
    };
    assert_eq!(games, 4);

    let mut rng = StdRng::seed_from_u64(21);
    let schedule = generate_schedule(&roster, games, &SchedulerConfig::quick(), &mut rng)?;

    assert!(schedule.validate(0).is_empty());
    assert_eq!(schedule.teams().count(), 20);

    let standings = compute_standings(&schedule, &Results::default())?;
    assert_eq!(standings_by_pool(&standings)[&Pool::Single].len(), 10);

    Ok(())
}

#[test]
fn csv_row_without_a_pool_in_a_mixed_roster() -> anyhow::Result<()> {
    let participants = participants_from_csv("name,pool\nAna,A\nBruno,B\nCaio,single\n")?;

    assert_eq!(
        Roster::try_from(participants),
        Err(InvalidInput::MixedPools("Caio".to_string()))
    );

    Ok(())
}
