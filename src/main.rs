// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use beatlane::beat::BeatExtractor;
use beatlane::chart::{self, DEFAULT_LANES};
use beatlane::clock::{ManualTime, PlaybackClock};
use beatlane::config::{self, ConfigError};
use beatlane::controller::{keyboard, Controller};
use beatlane::game::{Game, LogPresenter};
use beatlane::generate::generate;
use beatlane::lanes::LaneStrategy;
use beatlane::play::{Autoplay, Session};
use clap::{crate_version, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A lane-based rhythm game that builds its charts from audio."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates a chart from an audio file.
    Generate {
        /// The audio file to track beats in.
        audio_path: PathBuf,
        /// Where to write the chart.
        chart_path: PathBuf,
        /// A game config to take the lanes, seed and lane strategy from.
        #[arg[short, long]]
        config: Option<PathBuf>,
        /// The number of lanes. Overrides the config.
        #[arg[short, long]]
        lanes: Option<usize>,
        /// Seed for lane assignment, for reproducible charts. Overrides the config.
        #[arg[short, long]]
        seed: Option<u64>,
        /// How lanes are picked: random or no-repeat. Overrides the config.
        #[arg[long]]
        strategy: Option<LaneStrategy>,
    },
    /// Verifies a chart and prints a summary of it.
    Chart {
        /// The chart to verify.
        chart_path: PathBuf,
        /// The number of lanes the chart is played with.
        #[arg[short, long, default_value_t = DEFAULT_LANES]]
        lanes: usize,
    },
    /// Lists and verifies the songs in a game config.
    Songs {
        /// The path to the game config.
        config_path: PathBuf,
    },
    /// Plays the game using the keyboard.
    Play {
        /// The path to the game config.
        config_path: PathBuf,
        /// Start this song right away instead of showing the menu.
        song: Option<String>,
    },
    /// Plays a song perfectly without input or a display and prints the score.
    Simulate {
        /// The path to the game config.
        config_path: PathBuf,
        /// The song to play.
        song: String,
    },
    /// Prints the default game config.
    Defaults {},
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beatlane=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            audio_path,
            chart_path,
            config: config_path,
            lanes,
            seed,
            strategy,
        } => {
            let mut game_config = match config_path {
                Some(config_path) => config::load(&config_path)?,
                None => config::Game::default(),
            };
            game_config.override_generation(lanes, strategy, seed);
            let generated = generate(
                &audio_path,
                &chart_path,
                &BeatExtractor::default(),
                &game_config.lane_assigner()?,
                &mut game_config.generation_rng(),
            )?;

            println!("Tempo: {:.1} BPM", generated.tempo);
            println!(
                "Wrote {} notes to {}",
                generated.chart.len(),
                chart_path.display()
            );
        }
        Commands::Chart { chart_path, lanes } => {
            let chart = chart::load_from_path(&chart_path, lanes)?;
            print!("{}", chart);
        }
        Commands::Songs { config_path } => {
            let game = config::load(&config_path)?;
            let catalog = game.catalog();

            if catalog.is_empty() {
                println!("No songs found in {}.", config_path.display());
                return Ok(());
            }

            println!("Songs (count: {}):", catalog.len());
            for song in catalog.songs() {
                match song.load_chart(game.lanes()) {
                    Ok(chart) => println!("- {} ({} notes)", song.title(), chart.len()),
                    Err(e) => println!("- {} (unable to load chart: {})", song.title(), e),
                }
            }
        }
        Commands::Play { config_path, song } => {
            let game_config = config::load(&config_path)?;
            let mut game = Game::new(
                game_config.play_settings()?,
                game_config.catalog(),
                PlaybackClock::system(),
            );

            if let Some(title) = song {
                if game.catalog_mut().find(&title).is_none() {
                    return Err(ConfigError::UnknownSong(title).into());
                }
                game.select()?;
            }

            let driver = Arc::new(keyboard::Driver::new(game_config.keys()?));
            let mut controller = Controller::new(driver);
            game.run(
                &mut controller,
                &mut LogPresenter::new(),
                game_config.frame_rate(),
            );
        }
        Commands::Simulate { config_path, song } => {
            let game_config = config::load(&config_path)?;
            let settings = game_config.play_settings()?;
            let mut catalog = game_config.catalog();
            let Some(song) = catalog.find(&song) else {
                return Err(ConfigError::UnknownSong(song).into());
            };
            let chart = song.load_chart(settings.lanes)?;

            let time = ManualTime::new();
            let clock = PlaybackClock::new(Box::new(time.clone()));
            let frame = Duration::from_secs(1).div_f64(f64::from(game_config.frame_rate()));
            let autoplay = Autoplay::new(&settings);
            let mut session = Session::new(settings);

            session.start(&chart, clock.now());
            while !session.is_finished() {
                time.advance(frame);
                let presses = autoplay.presses(session.notes());
                session.frame(&presses, clock.now());
            }

            println!("{}: {}", song.title(), session.score());
        }
        Commands::Defaults {} => {
            print!("{}", config::Game::defaults().to_yaml()?);
        }
    }

    Ok(())
}
