const USAGE: &'static str = "
Racer

Usage:
  racer --race [--laps=<n>] [--car=<type>] [--realtime] [--gamepad] [--name=<name>] [--deadzone=<d>] [--settings=<path>] [--ghost=<path>]
  racer --scenario=<name>
  racer --list-scenarios
  racer --highscores [--settings=<path>]
  racer (-h | --help)
  racer --version

Options:
  -h --help            Show this screen.
  --version            Show version.
  --race               Drive a race on the oval, autopilot unless --gamepad is given.
  --laps=<n>           Laps until the race is over [default: 3].
  --car=<type>         standard or speedy [default: standard].
  --realtime           Pace frames to the wall clock instead of running flat out.
  --gamepad            Drive with a gamepad (needs the gamepad feature).
  --name=<name>        Player name for the highscore table.
  --deadzone=<d>       Stick deadzone in [0, 1), kept in the settings.
  --settings=<path>    Settings file [default: data/settings.bincode.gz].
  --ghost=<path>       Replay csv to race against, a lap that beats it is saved back to it.
  --scenario=<name>    Run the first scenario whose name contains <name>.
  --list-scenarios     List the scenarios.
  --highscores         Print the highscore table.
";

extern crate nalgebra as na;
#[macro_use]
extern crate serde_derive;

mod autopilot;
mod course;
mod flow;
mod race;
mod scenarios;
mod settings;
mod simulation;

use anyhow::{anyhow, Context, Result};
use docopt::Docopt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::flow::{FlowEvent, GameFlow, Screen};
use crate::race::{run_race, CarType, RaceOptions};
use crate::settings::{FileSettings, PlayerOptions};
use state::SettingsStore;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn print_highscores(settings: &FileSettings) {
    println!("Highscores");
    for (rank, entry) in settings.data.highscores.entries().iter().enumerate() {
        println!("{:>2}. {:<12} {:>3}.{:03}s", rank + 1, entry.name, entry.time_ms / 1000, entry.time_ms % 1000);
    }
    if let Some(best) = settings.best_time() {
        println!("your best lap: {}.{:03}s", best / 1000, best % 1000);
    }
}

fn run_scenario(query: &str) -> Result<()> {
    let scenario = scenarios::find(query).ok_or_else(|| anyhow!("no scenario matches '{}'", query))?;
    info!(name = scenario.name, "running scenario");
    (scenario.run)().with_context(|| format!("scenario {} failed", scenario.name))?;
    info!(name = scenario.name, "scenario passed");
    Ok(())
}

/// Walk the screens from the main menu: optionally through the options to set the player
/// name and deadzone, a race, then the highscore table.
fn run_session(
    first: FlowEvent,
    options: &RaceOptions,
    settings: &mut FileSettings,
    player: &PlayerOptions,
) -> Result<()> {
    let mut flow = GameFlow::default();
    flow.handle(if player.is_empty() { first } else { FlowEvent::ShowOptions });

    while !flow.is_done() {
        match flow.current() {
            Screen::Options => {
                player.apply(&mut settings.data)?;
                flow.handle(FlowEvent::Back);
                flow.handle(first);
            }
            Screen::InGame => {
                let options = RaceOptions {
                    input: settings.data.input,
                    ..options.clone()
                };
                let summary = run_race(&options, settings)?;
                if let Some(best) = summary.best_lap_ms() {
                    let player = settings.player_name();
                    if let Some(rank) = settings.data.highscores.submit(&player, best) {
                        info!(rank = rank + 1, best, "made the highscore table");
                    }
                }
                if let (Some(path), Some(replay)) = (&options.ghost, &summary.best_lap) {
                    replay
                        .save(path)
                        .with_context(|| format!("saving ghost to {}", path.display()))?;
                    info!(path = %path.display(), seconds = replay.duration(), "new ghost saved");
                }
                flow.handle(FlowEvent::RaceFinished);
            }
            Screen::Highscores => {
                print_highscores(settings);
                flow.handle(FlowEvent::Quit);
            }
            Screen::MainMenu | Screen::Exit => {
                flow.handle(FlowEvent::Quit);
            }
        }
    }

    settings.save()
}

fn main() -> Result<()> {
    let args = Docopt::new(USAGE)
        .and_then(|dopt| dopt.version(Some(env!("CARGO_PKG_VERSION").to_owned())).parse())
        .unwrap_or_else(|e| e.exit());
    init_logging();

    if args.get_bool("--list-scenarios") {
        for scenario in scenarios::SCENARIOS {
            println!("{:<28} {}", scenario.name, scenario.description);
        }
        return Ok(());
    }

    let scenario = args.get_str("--scenario");
    if !scenario.is_empty() {
        return run_scenario(scenario);
    }

    let settings_path = Path::new(args.get_str("--settings"));
    let mut settings = FileSettings::load(settings_path);

    if args.get_bool("--highscores") {
        return run_session(
            FlowEvent::ShowHighscores,
            &RaceOptions::default(),
            &mut settings,
            &PlayerOptions::default(),
        );
    }

    if args.get_bool("--race") {
        let laps = args
            .get_str("--laps")
            .parse::<u32>()
            .context("--laps must be a whole number")?;
        if laps == 0 {
            warn!("zero laps requested, driving one");
        }
        let car = args.get_str("--car");
        let car = CarType::parse(car)
            .ok_or_else(|| anyhow!("unknown car '{}', pick one of {:?}", car, CarType::NAMES))?;
        let ghost = args.get_str("--ghost");
        let options = RaceOptions {
            laps: laps.max(1),
            car,
            realtime: args.get_bool("--realtime"),
            gamepad: args.get_bool("--gamepad"),
            ghost: if ghost.is_empty() { None } else { Some(PathBuf::from(ghost)) },
            ..RaceOptions::default()
        };
        let name = args.get_str("--name");
        let deadzone = args.get_str("--deadzone");
        let player = PlayerOptions {
            name: if name.is_empty() { None } else { Some(name.to_owned()) },
            deadzone: if deadzone.is_empty() {
                None
            } else {
                Some(deadzone.parse::<f32>().context("--deadzone must be a number")?)
            },
        };
        return run_session(FlowEvent::StartRace, &options, &mut settings, &player);
    }

    Ok(())
}
