use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use doubles_draw::{
    COPYRIGHT, LONG_VERSION, Feasibility, Results, Roster, Schedule, Scheduler, SchedulerConfig,
    compute_standings, standings_by_pool, utils,
};
use log::{debug, info};
use ron::ser::PrettyConfig;

/// Fair Doubles Draw
///
/// Builds a schedule of doubles matches where everybody plays the same
/// number of games and never partners the same person twice.
#[derive(Parser, Debug)]
#[command(long_version = LONG_VERSION, about = "Fair Doubles Draw")]
struct Args {
    /// A RON file holding the roster
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Games per participant
    ///
    /// [default: the suggested number of games]
    #[arg(long)]
    games: Option<usize>,

    /// Print which numbers of games the roster supports and exit
    #[arg(long)]
    analyze: bool,

    /// Print the standings of a RON schedule holding results and exit
    #[arg(long)]
    standings: Option<PathBuf>,

    /// A RON file holding the scheduler configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed the random number generator, for a reproducible schedule
    #[arg(long)]
    seed: Option<u64>,

    /// Print the schedule as RON
    #[arg(long)]
    ron: bool,

    /// Run the searches sequentially
    #[arg(long)]
    sequential: bool,

    /// Whether to log on the debug level
    #[arg(long)]
    debug: bool,

    /// Build the manpage
    #[arg(long)]
    man: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_logger(args.debug);

    if args.man {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Args::command().name("doubles-draw").long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2026-10-19");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        fs::write("doubles-draw.1", buffer)?;
        return Ok(());
    }

    if let Some(path) = &args.standings {
        let schedule = Schedule::from_str(&read(path)?)?;
        let standings = compute_standings(&schedule, &Results::from(&schedule))?;

        for (pool, standings) in standings_by_pool(&standings) {
            println!("pool {pool}:");
            for (place, standing) in standings.iter().enumerate() {
                println!("{:>3}. {standing}", place + 1);
            }
        }

        return Ok(());
    }

    let Some(path) = &args.roster else {
        return Err(anyhow::Error::msg("either --roster or --standings is required"));
    };
    let roster: Roster = ron::from_str(&read(path)?)?;

    let mut config = match &args.config {
        Some(path) => SchedulerConfig::from_str(&read(path)?)?,
        None => SchedulerConfig::default(),
    };
    if args.sequential {
        config.budget.sequential = true;
    }
    debug!("{config:?}");

    let feasibility = Feasibility::analyze(
        roster.counts(),
        &config.bounds,
        config.completeness_floor,
    );

    if args.analyze {
        println!("{}", ron::ser::to_string_pretty(&feasibility, PrettyConfig::default())?);
        return Ok(());
    }

    let games = match (args.games, feasibility.suggestion) {
        (Some(games), _) | (None, Some(games)) => games,
        (None, None) => {
            return Err(anyhow::Error::msg(
                feasibility
                    .reason
                    .unwrap_or_else(|| "no number of games is feasible".to_string()),
            ));
        }
    };
    info!("{} participants, {games} games each", roster.counts());

    let mut scheduler = match args.seed {
        Some(seed) => Scheduler::seeded(config, seed),
        None => Scheduler::new(config),
    };
    let schedule = scheduler.generate_schedule(&roster, games)?;

    if args.ron {
        println!("{}", ron::ser::to_string_pretty(&schedule, PrettyConfig::default())?);
    } else {
        print!("{schedule}");
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
