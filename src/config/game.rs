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
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use duration_string::DurationString;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::song::Song;
use crate::catalog::Catalog;
use crate::chart::{ChartError, DEFAULT_LANES};
use crate::lanes::{LaneAssigner, LaneStrategy};
use crate::play::{
    PlaySettings, ReleaseMode, DEFAULT_BPM, DEFAULT_HIT_WINDOW, DEFAULT_NOTE_HEIGHT,
    DEFAULT_NOTE_SPEED, DEFAULT_PLAYFIELD_HEIGHT,
};

pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const DEFAULT_KEYS: &str = "asdf";
const DEFAULT_FLASH_DURATION: &str = "100ms";
const DEFAULT_COLLECTOR_FLASH_DURATION: &str = "200ms";
const DEFAULT_FEEDBACK_DURATION: &str = "500ms";

/// A YAML representation of the game configuration. Every field is optional.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Game {
    /// Tempo used for the beat interval between note releases.
    bpm: Option<f64>,
    /// Number of lanes.
    lanes: Option<usize>,
    playfield_height: Option<f64>,
    note_height: Option<f64>,
    /// Note fall speed in units per second.
    note_speed: Option<f64>,
    /// Tolerance above the target area, in units.
    hit_window: Option<f64>,
    flash_duration: Option<String>,
    collector_flash_duration: Option<String>,
    feedback_duration: Option<String>,
    frame_rate: Option<u32>,
    release_mode: Option<ReleaseMode>,
    /// Charge a miss for notes that scroll off unhit.
    expiry_penalty: Option<bool>,
    /// One key per lane, left to right.
    keys: Option<String>,
    lane_strategy: Option<LaneStrategy>,
    /// Seed for lane assignment. Random when unset.
    seed: Option<u64>,
    #[serde(default)]
    songs: Vec<Song>,

    /// Directory the song paths are relative to.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Game {
    /// Deserializes a file from the path into a game configuration.
    pub fn deserialize(path: &Path) -> Result<Game, ConfigError> {
        let mut game = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Game>()?;
        game.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(game)
    }

    /// A configuration with every field filled in with its default.
    pub fn defaults() -> Game {
        Game {
            bpm: Some(DEFAULT_BPM),
            lanes: Some(DEFAULT_LANES),
            playfield_height: Some(DEFAULT_PLAYFIELD_HEIGHT),
            note_height: Some(DEFAULT_NOTE_HEIGHT),
            note_speed: Some(DEFAULT_NOTE_SPEED),
            hit_window: Some(DEFAULT_HIT_WINDOW),
            flash_duration: Some(DEFAULT_FLASH_DURATION.to_string()),
            collector_flash_duration: Some(DEFAULT_COLLECTOR_FLASH_DURATION.to_string()),
            feedback_duration: Some(DEFAULT_FEEDBACK_DURATION.to_string()),
            frame_rate: Some(DEFAULT_FRAME_RATE),
            release_mode: Some(ReleaseMode::default()),
            expiry_penalty: Some(false),
            keys: Some(DEFAULT_KEYS.to_string()),
            lane_strategy: Some(LaneStrategy::default()),
            seed: None,
            songs: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    pub fn lanes(&self) -> usize {
        self.lanes.unwrap_or(DEFAULT_LANES)
    }

    /// Frames per second for the game loop.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE)
    }

    pub fn lane_strategy(&self) -> LaneStrategy {
        self.lane_strategy.unwrap_or_default()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Replaces the chart generation settings with any that are given.
    pub fn override_generation(
        &mut self,
        lanes: Option<usize>,
        lane_strategy: Option<LaneStrategy>,
        seed: Option<u64>,
    ) {
        self.lanes = lanes.or(self.lanes);
        self.lane_strategy = lane_strategy.or(self.lane_strategy);
        self.seed = seed.or(self.seed);
    }

    /// The lane assigner used when generating charts.
    pub fn lane_assigner(&self) -> Result<LaneAssigner, ChartError> {
        LaneAssigner::new(self.lanes(), self.lane_strategy())
    }

    /// The random source for chart generation. Seeded if a seed is configured.
    pub fn generation_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// The lane keys, one character per lane.
    pub fn keys(&self) -> Result<Vec<char>, ConfigError> {
        let keys: Vec<char> = self
            .keys
            .as_deref()
            .unwrap_or(DEFAULT_KEYS)
            .to_lowercase()
            .chars()
            .collect();
        if keys.len() != self.lanes() {
            return Err(ConfigError::Invalid {
                field: "keys",
                reason: format!("{} keys for {} lanes", keys.len(), self.lanes()),
            });
        }
        if keys.iter().collect::<HashSet<_>>().len() != keys.len() {
            return Err(ConfigError::Invalid {
                field: "keys",
                reason: "keys must be distinct".to_string(),
            });
        }
        Ok(keys)
    }

    /// Builds the catalog of songs, with paths resolved against the config's directory.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.songs
                .iter()
                .map(|song| song.to_song(&self.base_dir))
                .collect(),
        )
    }

    /// Validates the configuration and converts it into play settings.
    pub fn play_settings(&self) -> Result<PlaySettings, ConfigError> {
        let lanes = self.lanes();
        if lanes == 0 {
            return Err(ConfigError::Invalid {
                field: "lanes",
                reason: "there must be at least one lane".to_string(),
            });
        }
        if self.frame_rate() == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_rate",
                reason: "must be at least 1".to_string(),
            });
        }

        let settings = PlaySettings {
            lanes,
            bpm: positive("bpm", self.bpm.unwrap_or(DEFAULT_BPM))?,
            playfield_height: positive(
                "playfield_height",
                self.playfield_height.unwrap_or(DEFAULT_PLAYFIELD_HEIGHT),
            )?,
            note_height: positive("note_height", self.note_height.unwrap_or(DEFAULT_NOTE_HEIGHT))?,
            note_speed: positive("note_speed", self.note_speed.unwrap_or(DEFAULT_NOTE_SPEED))?,
            hit_window: non_negative("hit_window", self.hit_window.unwrap_or(DEFAULT_HIT_WINDOW))?,
            flash_duration: duration(
                "flash_duration",
                &self.flash_duration,
                DEFAULT_FLASH_DURATION,
            )?,
            collector_flash_duration: duration(
                "collector_flash_duration",
                &self.collector_flash_duration,
                DEFAULT_COLLECTOR_FLASH_DURATION,
            )?,
            feedback_duration: duration(
                "feedback_duration",
                &self.feedback_duration,
                DEFAULT_FEEDBACK_DURATION,
            )?,
            release_mode: self.release_mode.unwrap_or_default(),
            expiry_penalty: self.expiry_penalty.unwrap_or(false),
        };

        if settings.note_height >= settings.playfield_height {
            return Err(ConfigError::Invalid {
                field: "note_height",
                reason: "notes must be shorter than the playfield".to_string(),
            });
        }
        if Duration::try_from_secs_f64(60.0 / settings.bpm).is_err() {
            return Err(ConfigError::Invalid {
                field: "bpm",
                reason: format!("{} is too slow to schedule", settings.bpm),
            });
        }
        if Duration::try_from_secs_f64(settings.target_line() / settings.note_speed).is_err() {
            return Err(ConfigError::Invalid {
                field: "note_speed",
                reason: format!("{} is too slow to schedule", settings.note_speed),
            });
        }
        Ok(settings)
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{} must be a positive number", value),
        });
    }
    Ok(value)
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{} must not be negative", value),
        });
    }
    Ok(value)
}

fn duration(
    field: &'static str,
    value: &Option<String>,
    default: &str,
) -> Result<Duration, ConfigError> {
    let value = value.as_deref().unwrap_or(default);
    DurationString::from_string(value.to_string())
        .map(Duration::from)
        .map_err(|e| ConfigError::Duration {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
